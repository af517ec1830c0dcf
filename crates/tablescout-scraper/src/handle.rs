//! Caller-supplied handle normalization.
//!
//! Social handles arrive as `name`, `@name`, or a full profile URL; websites
//! as a URL or bare domain. Anything that cannot be normalized is rejected
//! before a fetch is attempted.

use std::sync::LazyLock;

use regex::Regex;
use tablescout_core::SourceKind;

use crate::error::ScraperError;

static INSTAGRAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._]{1,30}$").expect("valid instagram handle regex")
});
static TIKTOK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._]{2,24}$").expect("valid tiktok handle regex"));
static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]{3,30}$").expect("valid youtube handle regex")
});
static CHANNEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UC[A-Za-z0-9_-]{22}$").expect("valid channel id regex"));

/// Instagram path segments that are not profiles.
const INSTAGRAM_RESERVED: &[&str] = &[
    "p", "reel", "reels", "explore", "stories", "accounts", "tv", "direct",
];

fn invalid(handle: &str, reason: impl Into<String>) -> ScraperError {
    ScraperError::InvalidHandle {
        handle: handle.to_owned(),
        reason: reason.into(),
    }
}

/// True for a canonical `YouTube` channel id (`UC` + 22 characters).
#[must_use]
pub fn is_channel_id(handle: &str) -> bool {
    CHANNEL_ID_RE.is_match(handle)
}

fn platform_host(source: SourceKind) -> Option<&'static str> {
    match source {
        SourceKind::Instagram => Some("instagram.com"),
        SourceKind::Tiktok => Some("tiktok.com"),
        SourceKind::Youtube => Some("youtube.com"),
        SourceKind::Listing | SourceKind::Website => None,
    }
}

fn looks_like_url(raw: &str) -> bool {
    raw.contains("://") || raw.starts_with("www.") || raw.contains(".com/")
}

/// Normalizes a social handle to its bare form (no `@`, no URL).
///
/// `YouTube` channel URLs (`/channel/UC…`) normalize to the channel id;
/// `/c/name` and `/user/name` URLs normalize to `name`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidHandle`] for blank input, a URL on another
/// host, a non-profile path, or characters the platform does not allow.
pub fn normalize_social_handle(source: SourceKind, raw: &str) -> Result<String, ScraperError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(raw, "empty handle"));
    }
    let Some(host) = platform_host(source) else {
        return Err(invalid(raw, format!("{source} is not a social source")));
    };

    let candidate = if looks_like_url(trimmed) {
        handle_from_url(source, host, trimmed)?
    } else {
        trimmed.trim_start_matches('@').to_owned()
    };

    let valid = match source {
        SourceKind::Instagram => INSTAGRAM_RE.is_match(&candidate),
        SourceKind::Tiktok => TIKTOK_RE.is_match(&candidate),
        SourceKind::Youtube => is_channel_id(&candidate) || YOUTUBE_RE.is_match(&candidate),
        SourceKind::Listing | SourceKind::Website => false,
    };
    if !valid {
        return Err(invalid(raw, format!("not a valid {source} handle")));
    }
    Ok(candidate)
}

fn handle_from_url(source: SourceKind, host: &str, raw: &str) -> Result<String, ScraperError> {
    let with_scheme = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };
    let url = reqwest::Url::parse(&with_scheme).map_err(|e| invalid(raw, e.to_string()))?;
    let url_host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if url_host != host && !url_host.ends_with(&format!(".{host}")) {
        return Err(invalid(raw, format!("not a {source} URL")));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    let first = *segments
        .first()
        .ok_or_else(|| invalid(raw, "URL has no profile path"))?;

    match source {
        SourceKind::Instagram => {
            if INSTAGRAM_RESERVED.contains(&first.to_ascii_lowercase().as_str()) {
                return Err(invalid(raw, "URL is not a profile"));
            }
            Ok(first.to_owned())
        }
        SourceKind::Tiktok => first
            .strip_prefix('@')
            .map(str::to_owned)
            .ok_or_else(|| invalid(raw, "URL is not a profile")),
        SourceKind::Youtube => {
            if let Some(handle) = first.strip_prefix('@') {
                return Ok(handle.to_owned());
            }
            match (first, segments.get(1)) {
                ("channel" | "c" | "user", Some(next)) => Ok((*next).to_owned()),
                _ => Err(invalid(raw, "URL is not a channel")),
            }
        }
        SourceKind::Listing | SourceKind::Website => {
            Err(invalid(raw, format!("{source} is not a social source")))
        }
    }
}

/// Normalizes a website handle to an absolute `http(s)` URL.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidHandle`] for blank input, unsupported
/// schemes, or hosts that are not domain-like.
pub fn normalize_website_url(raw: &str) -> Result<String, ScraperError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid(raw, "empty website"));
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };
    let url = reqwest::Url::parse(&with_scheme).map_err(|e| invalid(raw, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(raw, "unsupported scheme"));
    }
    let host = url.host_str().unwrap_or_default();
    if !(host.contains('.') || host == "localhost") {
        return Err(invalid(raw, "host is not a domain"));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_at_prefix_and_whitespace() {
        assert_eq!(
            normalize_social_handle(SourceKind::Instagram, "  @luigis.trattoria ").unwrap(),
            "luigis.trattoria"
        );
        assert_eq!(
            normalize_social_handle(SourceKind::Tiktok, "@luigis_pizza").unwrap(),
            "luigis_pizza"
        );
    }

    #[test]
    fn accepts_profile_urls() {
        assert_eq!(
            normalize_social_handle(
                SourceKind::Instagram,
                "https://www.instagram.com/luigis/?hl=en"
            )
            .unwrap(),
            "luigis"
        );
        assert_eq!(
            normalize_social_handle(SourceKind::Tiktok, "tiktok.com/@luigis").unwrap(),
            "luigis"
        );
        assert_eq!(
            normalize_social_handle(SourceKind::Youtube, "https://m.youtube.com/@LuigisKitchen")
                .unwrap(),
            "LuigisKitchen"
        );
    }

    #[test]
    fn youtube_channel_urls_yield_channel_id() {
        let id = "UCabcdefghijklmnopqrstuv";
        let got = normalize_social_handle(
            SourceKind::Youtube,
            &format!("https://www.youtube.com/channel/{id}/videos"),
        )
        .unwrap();
        assert_eq!(got, id);
        assert!(is_channel_id(&got));
    }

    #[test]
    fn rejects_foreign_hosts_and_non_profile_paths() {
        assert!(
            normalize_social_handle(SourceKind::Instagram, "https://facebook.com/luigis").is_err()
        );
        assert!(normalize_social_handle(
            SourceKind::Instagram,
            "https://www.instagram.com/p/Cxyz123/"
        )
        .is_err());
        assert!(
            normalize_social_handle(SourceKind::Tiktok, "https://www.tiktok.com/discover").is_err()
        );
    }

    #[test]
    fn rejects_blank_and_illegal_characters() {
        assert!(normalize_social_handle(SourceKind::Instagram, "   ").is_err());
        assert!(normalize_social_handle(SourceKind::Instagram, "luigi's pizza").is_err());
        assert!(normalize_social_handle(SourceKind::Tiktok, "x").is_err());
    }

    #[test]
    fn non_social_sources_are_rejected() {
        let err = normalize_social_handle(SourceKind::Website, "luigis").unwrap_err();
        assert!(matches!(err, ScraperError::InvalidHandle { .. }));
    }

    #[test]
    fn website_bare_domain_gets_https() {
        assert_eq!(
            normalize_website_url("luigis.com").unwrap(),
            "https://luigis.com/"
        );
        assert_eq!(
            normalize_website_url("http://127.0.0.1:8080/home").unwrap(),
            "http://127.0.0.1:8080/home"
        );
    }

    #[test]
    fn website_rejects_garbage() {
        assert!(normalize_website_url("").is_err());
        assert!(normalize_website_url("ftp://luigis.com").is_err());
        assert!(normalize_website_url("not a site").is_err());
    }
}
