//! `YouTube` channel extractor.
//!
//! `YouTube` exposes no per-video likes or comments on the channel page, so
//! records from this source never carry an engagement rate.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tablescout_core::{ContentItem, ExtractionStrategy, SocialProfile, SourceKind};

use super::{captured_count, content_item, count_label_re, finish_social, leading_count};
use crate::client::{extract_origin, PageFetcher};
use crate::error::ScraperError;
use crate::handle::is_channel_id;
use crate::html::{assigned_json, meta_content};
use crate::json::{collect_key, find_key, str_at, text_of};
use crate::strategy::{run_strategies, StrategyFn};

static SUBSCRIBERS_RE: LazyLock<Regex> = LazyLock::new(|| count_label_re("subscribers"));
static VIDEOS_RE: LazyLock<Regex> = LazyLock::new(|| count_label_re("videos"));

pub struct YoutubeExtractor {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl YoutubeExtractor {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.youtube.com";

    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `/channel/<id>` for canonical channel ids, `/@<handle>` otherwise.
    #[must_use]
    pub fn profile_url(&self, handle: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if is_channel_id(handle) {
            format!("{base}/channel/{handle}")
        } else {
            format!("{base}/@{handle}")
        }
    }

    pub async fn extract(&self, raw_handle: &str) -> SocialProfile {
        super::extract_social(
            self.fetcher.as_ref(),
            SourceKind::Youtube,
            raw_handle,
            |h| self.profile_url(h),
            parse_profile,
        )
        .await
    }
}

#[must_use]
pub fn parse_profile(page: &str, handle: &str, profile_url: &str) -> SocialProfile {
    let seed = SocialProfile::baseline(SourceKind::Youtube, handle, profile_url);

    let tabbed = |p: &str| from_tabbed_header(p, &seed);
    let view_model = |p: &str| from_page_header_view_model(p, &seed);
    let meta = |p: &str| from_meta_tags(p, &seed);
    let strategies: [(ExtractionStrategy, StrategyFn<'_, SocialProfile>); 3] = [
        (ExtractionStrategy::EmbeddedState, &tabbed),
        (ExtractionStrategy::AlternateEmbedded, &view_model),
        (ExtractionStrategy::MetaTags, &meta),
    ];

    match run_strategies(SourceKind::Youtube, handle, page, &strategies, |p| {
        p.followers > 0
    }) {
        Some((mut profile, strategy)) => {
            profile.strategy = strategy;
            finish_social(profile, false)
        }
        None => seed,
    }
}

fn initial_data(page: &str) -> Result<Value, ScraperError> {
    let raw =
        assigned_json(page, "ytInitialData").ok_or_else(|| ScraperError::missing("ytInitialData"))?;
    serde_json::from_str(raw).map_err(|e| ScraperError::deserialize("ytInitialData", e))
}

/// Strategy 1: `c4TabbedHeaderRenderer` + `channelMetadataRenderer`.
fn from_tabbed_header(page: &str, seed: &SocialProfile) -> Result<SocialProfile, ScraperError> {
    let data = initial_data(page)?;
    let header = find_key(&data, "c4TabbedHeaderRenderer")
        .ok_or_else(|| ScraperError::missing("c4TabbedHeaderRenderer"))?;
    let metadata = find_key(&data, "channelMetadataRenderer").unwrap_or(&Value::Null);

    let mut profile = seed.clone();
    profile.display_name = str_at(header, "/title")
        .or_else(|| str_at(metadata, "/title"))
        .unwrap_or_default();
    profile.bio = str_at(metadata, "/description").unwrap_or_default();
    profile.avatar_url = last_thumbnail(header.pointer("/avatar/thumbnails"))
        .or_else(|| last_thumbnail(metadata.pointer("/avatar/thumbnails")))
        .unwrap_or_default();
    profile.verified = header
        .get("badges")
        .and_then(Value::as_array)
        .is_some_and(|badges| {
            badges.iter().any(|b| {
                str_at(b, "/metadataBadgeRenderer/style")
                    .is_some_and(|s| s.contains("VERIFIED"))
            })
        });
    profile.followers = header
        .get("subscriberCountText")
        .and_then(text_of)
        .map_or(0, |t| leading_count(&t));
    profile.content_count = header
        .get("videosCountText")
        .and_then(text_of)
        .map_or(0, |t| leading_count(&t));
    profile.recent_items = videos(&data, &extract_origin(&seed.profile_url));
    Ok(profile)
}

/// Strategy 2: the newer `pageHeaderViewModel` with metadata rows such as
/// `["@luigis", "12.3K subscribers", "245 videos"]`.
fn from_page_header_view_model(
    page: &str,
    seed: &SocialProfile,
) -> Result<SocialProfile, ScraperError> {
    let data = initial_data(page)?;
    let header = find_key(&data, "pageHeaderViewModel")
        .ok_or_else(|| ScraperError::missing("pageHeaderViewModel"))?;
    let metadata = find_key(&data, "channelMetadataRenderer").unwrap_or(&Value::Null);

    let mut profile = seed.clone();
    profile.display_name = str_at(header, "/title/dynamicTextViewModel/text/content")
        .or_else(|| str_at(metadata, "/title"))
        .unwrap_or_default();
    profile.bio = str_at(
        header,
        "/description/descriptionPreviewViewModel/description/content",
    )
    .or_else(|| str_at(metadata, "/description"))
    .unwrap_or_default();
    profile.avatar_url = str_at(
        header,
        "/image/decoratedAvatarViewModel/avatar/avatarViewModel/image/sources/0/url",
    )
    .unwrap_or_default();

    let parts: Vec<String> = header
        .pointer("/metadata/contentMetadataViewModel/metadataRows")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|row| row.get("metadataParts").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| part.get("text").and_then(text_of))
        .collect();
    for part in &parts {
        let lower = part.to_ascii_lowercase();
        if lower.contains("subscriber") {
            profile.followers = leading_count(part);
        } else if lower.contains("video") {
            profile.content_count = leading_count(part);
        }
    }

    profile.recent_items = videos(&data, &extract_origin(&seed.profile_url));
    Ok(profile)
}

/// Strategy 3: Open Graph tags plus any `"N subscribers"` text on the page.
fn from_meta_tags(page: &str, seed: &SocialProfile) -> Result<SocialProfile, ScraperError> {
    let title =
        meta_content(page, "og:title").ok_or_else(|| ScraperError::missing("og:title"))?;

    let mut profile = seed.clone();
    profile.display_name = title;
    profile.bio = meta_content(page, "og:description").unwrap_or_default();
    profile.avatar_url = meta_content(page, "og:image").unwrap_or_default();
    profile.followers = captured_count(&SUBSCRIBERS_RE, page);
    profile.content_count = captured_count(&VIDEOS_RE, page);
    Ok(profile)
}

fn last_thumbnail(thumbnails: Option<&Value>) -> Option<String> {
    thumbnails?
        .as_array()?
        .iter()
        .rev()
        .find_map(|t| str_at(t, "/url"))
}

fn videos(data: &Value, origin: &str) -> Vec<ContentItem> {
    let mut renderers = collect_key(data, "videoRenderer", super::MAX_RECENT_ITEMS);
    if renderers.is_empty() {
        renderers = collect_key(data, "gridVideoRenderer", super::MAX_RECENT_ITEMS);
    }
    renderers
        .into_iter()
        .filter_map(|r| {
            let id = str_at(r, "/videoId")?;
            let url = format!("{origin}/watch?v={id}");
            let mut item = content_item(id, url);
            item.caption = r.get("title").and_then(text_of).unwrap_or_default();
            item.views = r
                .get("viewCountText")
                .and_then(text_of)
                .map_or(0, |t| leading_count(&t));
            item.thumbnail_url = last_thumbnail(r.pointer("/thumbnail/thumbnails")).unwrap_or_default();
            Some(item)
        })
        .collect()
}

#[cfg(test)]
#[path = "youtube_test.rs"]
mod tests;
