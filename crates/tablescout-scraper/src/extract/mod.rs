//! Per-source extractors.
//!
//! Every extractor fetches exactly one profile page, runs its ranked
//! strategies over it, and never fails: transport errors, parse misses, and
//! invalid handles all end in the source's baseline record.

pub mod instagram;
pub mod listing;
pub mod tiktok;
pub mod website;
pub mod youtube;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use tablescout_core::{parse_compact_count, ContentItem, SocialProfile, SourceKind};

use crate::client::PageFetcher;
use crate::handle::normalize_social_handle;

pub use instagram::InstagramExtractor;
pub use listing::{ListingExtractor, ListingPhotoStage};
pub use tiktok::TiktokExtractor;
pub use website::WebsiteExtractor;
pub use youtube::YoutubeExtractor;

/// Upper bound on recent items kept per profile.
pub const MAX_RECENT_ITEMS: usize = 12;

static LEADING_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d[\d.,]*\s?[KkMm]?)\b").expect("valid leading count regex")
});

/// Builds a regex capturing the compact count written before `label`, as
/// in `"12.3K Followers"`.
pub(crate) fn count_label_re(label: &str) -> Regex {
    Regex::new(&format!(r"(?i)(\d[\d.,]*\s?[KM]?)\s+{label}\b")).expect("valid count label regex")
}

/// First count matched by `re` in `text`, or `0`.
pub(crate) fn captured_count(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map_or(0, |m| parse_compact_count(m.as_str()))
}

/// Count at the start of a label such as `"1,204 views"`.
pub(crate) fn leading_count(text: &str) -> u64 {
    captured_count(&LEADING_COUNT_RE, text)
}

/// The part of an `og:title` before ` (@handle)`, e.g. `"Luigi's (@luigis) • Instagram"`.
pub(crate) fn name_before_handle(title: &str) -> Option<String> {
    let name = title
        .split_once(" (@")
        .map_or(title, |(name, _)| name)
        .trim();
    Some(name.to_owned()).filter(|n| !n.is_empty())
}

pub(crate) fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let secs = match value? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    DateTime::from_timestamp(secs, 0).filter(|_| secs > 0)
}

/// Applies the shared post-processing every social record gets: item cap,
/// candidate images from item thumbnails, and the optional engagement rate.
pub(crate) fn finish_social(mut profile: SocialProfile, with_engagement: bool) -> SocialProfile {
    profile.recent_items.truncate(MAX_RECENT_ITEMS);
    if profile.image_urls.is_empty() {
        profile.image_urls = profile
            .recent_items
            .iter()
            .map(|i| i.thumbnail_url.clone())
            .filter(|u| !u.is_empty())
            .collect();
    }
    profile.engagement_rate = if with_engagement {
        SocialProfile::engagement_from_items(profile.followers, &profile.recent_items)
    } else {
        None
    };
    profile
}

/// Shared flow for the social extractors: normalize, fetch once, parse.
pub(crate) async fn extract_social(
    fetcher: &dyn PageFetcher,
    source: SourceKind,
    raw_handle: &str,
    profile_url_for: impl Fn(&str) -> String,
    parse: fn(&str, &str, &str) -> SocialProfile,
) -> SocialProfile {
    let handle = match normalize_social_handle(source, raw_handle) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(source = %source, handle = raw_handle, error = %e, "invalid handle, returning baseline");
            return SocialProfile::baseline(source, raw_handle.trim(), "");
        }
    };
    let profile_url = profile_url_for(&handle);

    let page = match fetcher.fetch_page(&profile_url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(source = %source, handle, error = %e, "profile fetch failed, returning baseline");
            return SocialProfile::baseline(source, &handle, &profile_url);
        }
    };

    let profile = parse(&page, &handle, &profile_url);
    tracing::info!(
        source = %source,
        handle,
        strategy = profile.strategy.as_str(),
        followers = profile.followers,
        items = profile.recent_items.len(),
        "profile extracted"
    );
    profile
}

/// A recent item with only the fields every platform exposes.
pub(crate) fn content_item(id: String, url: String) -> ContentItem {
    ContentItem {
        id,
        url,
        ..ContentItem::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_label_handles_compact_and_grouped() {
        let re = count_label_re("Followers");
        assert_eq!(captured_count(&re, "12.3K Followers, 56 Following"), 12_300);
        assert_eq!(captured_count(&re, "1,204 followers"), 1_204);
        assert_eq!(captured_count(&re, "no numbers here"), 0);
    }

    #[test]
    fn count_label_requires_word_boundary() {
        let re = count_label_re("Follow");
        assert_eq!(captured_count(&re, "10 Followers"), 0);
    }

    #[test]
    fn leading_count_reads_prefix() {
        assert_eq!(leading_count("1,234 views"), 1_234);
        assert_eq!(leading_count("1.2M subscribers"), 1_200_000);
        assert_eq!(leading_count("No views"), 0);
    }

    #[test]
    fn name_before_handle_strips_suffix() {
        assert_eq!(
            name_before_handle("Luigi's Trattoria (@luigis) • Instagram photos and videos")
                .as_deref(),
            Some("Luigi's Trattoria")
        );
        assert_eq!(name_before_handle("Plain").as_deref(), Some("Plain"));
        assert!(name_before_handle("  (@x)").is_none());
    }

    #[test]
    fn timestamp_accepts_numbers_and_strings() {
        let t = timestamp(Some(&serde_json::json!(1_700_000_000))).unwrap();
        assert_eq!(t.timestamp(), 1_700_000_000);
        assert!(timestamp(Some(&serde_json::json!("1700000000"))).is_some());
        assert!(timestamp(Some(&serde_json::json!(0))).is_none());
        assert!(timestamp(None).is_none());
    }

    #[test]
    fn finish_social_caps_items_and_computes_engagement() {
        let mut p = SocialProfile::baseline(SourceKind::Instagram, "luigis", "");
        p.followers = 1_000;
        p.recent_items = (0..20)
            .map(|i| ContentItem {
                likes: 40,
                comments: 10,
                thumbnail_url: format!("https://cdn.example.com/{i}.jpg"),
                ..ContentItem::default()
            })
            .collect();
        let p = finish_social(p, true);
        assert_eq!(p.recent_items.len(), MAX_RECENT_ITEMS);
        assert_eq!(p.image_urls.len(), MAX_RECENT_ITEMS);
        assert_eq!(p.engagement_rate, Some(5.0));
    }

    #[test]
    fn finish_social_without_engagement() {
        let mut p = SocialProfile::baseline(SourceKind::Youtube, "luigis", "");
        p.followers = 10;
        p.recent_items = vec![ContentItem {
            likes: 5,
            ..ContentItem::default()
        }];
        assert!(finish_social(p, false).engagement_rate.is_none());
    }
}
