//! Candidate URL cleanup: resolution upgrade and deduplication.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Google user-content size suffix, e.g. `=w408-h306-k-no` or `=s120-c`.
static GOOGLE_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)=[swh]\d+(?:-[a-z0-9]+)*$").expect("valid google size regex")
});

/// Edge length requested when upgrading a Google user-content URL.
const GOOGLE_MAX_EDGE: u32 = 1600;

/// Rewrites a photo URL to the largest variant its host serves.
///
/// Only hosts with a known resolution parameter are touched; all other URLs
/// are returned unchanged.
#[must_use]
pub fn prefer_highest_resolution(url: &str) -> String {
    let is_google_content = reqwest::Url::parse(url).ok().is_some_and(|u| {
        u.host_str().is_some_and(|h| {
            h.ends_with("googleusercontent.com") || h.ends_with("ggpht.com")
        })
    });

    if is_google_content {
        if GOOGLE_SIZE_RE.is_match(url) {
            return GOOGLE_SIZE_RE
                .replace(url, format!("=s{GOOGLE_MAX_EDGE}").as_str())
                .into_owned();
        }
        if !url.contains('=') {
            return format!("{url}=s{GOOGLE_MAX_EDGE}");
        }
    }

    url.to_string()
}

/// Upgrades every URL and drops blanks, non-HTTP schemes, and duplicates,
/// keeping first-seen order.
#[must_use]
pub fn dedup_candidates(urls: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    urls.iter()
        .map(|u| u.trim())
        .filter(|u| u.starts_with("https://") || u.starts_with("http://"))
        .map(prefer_highest_resolution)
        .filter(|u| seen.insert(u.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrades_google_width_height_suffix() {
        let url = "https://lh5.googleusercontent.com/p/AF1QipN=w408-h306-k-no";
        assert_eq!(
            prefer_highest_resolution(url),
            "https://lh5.googleusercontent.com/p/AF1QipN=s1600"
        );
    }

    #[test]
    fn upgrades_google_square_suffix() {
        let url = "https://lh3.googleusercontent.com/abc=s120-c";
        assert_eq!(
            prefer_highest_resolution(url),
            "https://lh3.googleusercontent.com/abc=s1600"
        );
    }

    #[test]
    fn appends_size_to_bare_google_url() {
        let url = "https://lh3.googleusercontent.com/p/xyz";
        assert_eq!(
            prefer_highest_resolution(url),
            "https://lh3.googleusercontent.com/p/xyz=s1600"
        );
    }

    #[test]
    fn leaves_other_hosts_untouched() {
        let url = "https://cdn.example.com/photo.jpg?w=300";
        assert_eq!(prefer_highest_resolution(url), url);
    }

    #[test]
    fn dedup_collapses_size_variants() {
        let urls = vec![
            "https://lh5.googleusercontent.com/p/A=w100-h100".to_string(),
            "https://lh5.googleusercontent.com/p/A=w800-h600-k-no".to_string(),
            "https://cdn.example.com/b.jpg".to_string(),
            " https://cdn.example.com/b.jpg ".to_string(),
            "data:image/png;base64,AAAA".to_string(),
            String::new(),
        ];
        assert_eq!(
            dedup_candidates(&urls),
            vec![
                "https://lh5.googleusercontent.com/p/A=s1600".to_string(),
                "https://cdn.example.com/b.jpg".to_string(),
            ]
        );
    }
}
