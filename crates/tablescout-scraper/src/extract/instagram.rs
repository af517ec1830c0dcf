//! Instagram profile extractor.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tablescout_core::{ContentItem, ExtractionStrategy, SocialProfile, SourceKind};

use super::{captured_count, content_item, count_label_re, finish_social, name_before_handle};
use crate::client::{extract_origin, PageFetcher};
use crate::error::ScraperError;
use crate::html::{assigned_json, meta_content, scripts_of_type};
use crate::json::{count_at, find_object, str_at};
use crate::strategy::{run_strategies, StrategyFn};

static FOLLOWERS_RE: LazyLock<Regex> = LazyLock::new(|| count_label_re("Followers"));
static FOLLOWING_RE: LazyLock<Regex> = LazyLock::new(|| count_label_re("Following"));
static POSTS_RE: LazyLock<Regex> = LazyLock::new(|| count_label_re("Posts"));
static BIO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)on Instagram:\s*"(.*)"\s*$"#).expect("valid instagram bio regex")
});

pub struct InstagramExtractor {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl InstagramExtractor {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.instagram.com";

    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Points the extractor at another host; used by tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn profile_url(&self, handle: &str) -> String {
        format!("{}/{handle}/", self.base_url.trim_end_matches('/'))
    }

    /// Extracts one profile. Never fails; see the module docs of
    /// [`crate::extract`].
    pub async fn extract(&self, raw_handle: &str) -> SocialProfile {
        super::extract_social(
            self.fetcher.as_ref(),
            SourceKind::Instagram,
            raw_handle,
            |h| self.profile_url(h),
            parse_profile,
        )
        .await
    }
}

/// Runs the strategy ladder over a fetched profile page.
#[must_use]
pub fn parse_profile(page: &str, handle: &str, profile_url: &str) -> SocialProfile {
    let seed = SocialProfile::baseline(SourceKind::Instagram, handle, profile_url);

    let json_scripts = |p: &str| from_json_scripts(p, &seed);
    let shared_data = |p: &str| from_shared_data(p, &seed);
    let meta = |p: &str| from_meta_tags(p, &seed);
    let strategies: [(ExtractionStrategy, StrategyFn<'_, SocialProfile>); 3] = [
        (ExtractionStrategy::EmbeddedState, &json_scripts),
        (ExtractionStrategy::AlternateEmbedded, &shared_data),
        (ExtractionStrategy::MetaTags, &meta),
    ];

    match run_strategies(SourceKind::Instagram, handle, page, &strategies, |p| {
        p.followers > 0 || p.content_count > 0
    }) {
        Some((mut profile, strategy)) => {
            profile.strategy = strategy;
            finish_social(profile, true)
        }
        None => seed,
    }
}

/// Strategy 1: `application/json` script blobs carrying a graph user.
fn from_json_scripts(page: &str, seed: &SocialProfile) -> Result<SocialProfile, ScraperError> {
    for raw in scripts_of_type(page, "application/json") {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            continue;
        };
        if let Some(user) = find_object(&value, &|o| o.get("edge_followed_by").is_some()) {
            return Ok(from_graph_user(user, seed));
        }
    }
    Err(ScraperError::missing("user with edge_followed_by"))
}

/// Strategy 2: legacy `window._sharedData`.
fn from_shared_data(page: &str, seed: &SocialProfile) -> Result<SocialProfile, ScraperError> {
    let raw = assigned_json(page, "window._sharedData")
        .ok_or_else(|| ScraperError::missing("window._sharedData"))?;
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ScraperError::deserialize("window._sharedData", e))?;
    let user = value
        .pointer("/entry_data/ProfilePage/0/graphql/user")
        .ok_or_else(|| ScraperError::missing("entry_data.ProfilePage[0].graphql.user"))?;
    Ok(from_graph_user(user, seed))
}

/// Strategy 3: Open Graph text such as
/// `"1,234 Followers, 56 Following, 78 Posts - See Instagram photos…"`.
fn from_meta_tags(page: &str, seed: &SocialProfile) -> Result<SocialProfile, ScraperError> {
    let description = meta_content(page, "og:description")
        .or_else(|| meta_content(page, "description"))
        .ok_or_else(|| ScraperError::missing("og:description"))?;

    let mut profile = seed.clone();
    profile.followers = captured_count(&FOLLOWERS_RE, &description);
    profile.following = captured_count(&FOLLOWING_RE, &description);
    profile.content_count = captured_count(&POSTS_RE, &description);
    profile.display_name = meta_content(page, "og:title")
        .as_deref()
        .and_then(name_before_handle)
        .unwrap_or_default();
    profile.avatar_url = meta_content(page, "og:image").unwrap_or_default();
    if let Some(bio) = meta_content(page, "description")
        .and_then(|d| BIO_RE.captures(&d).and_then(|c| c.get(1)).map(|m| m.as_str().trim().to_owned()))
    {
        profile.bio = bio;
    }
    Ok(profile)
}

fn from_graph_user(user: &Value, seed: &SocialProfile) -> SocialProfile {
    let origin = extract_origin(&seed.profile_url);
    let mut profile = seed.clone();

    profile.display_name = str_at(user, "/full_name").unwrap_or_default();
    profile.bio = str_at(user, "/biography").unwrap_or_default();
    profile.category = str_at(user, "/category_name")
        .or_else(|| str_at(user, "/business_category_name"))
        .unwrap_or_default();
    profile.avatar_url = str_at(user, "/profile_pic_url_hd")
        .or_else(|| str_at(user, "/profile_pic_url"))
        .unwrap_or_default();
    profile.verified = user
        .get("is_verified")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    profile.followers = count_at(user, "/edge_followed_by/count");
    profile.following = count_at(user, "/edge_follow/count");
    profile.content_count = count_at(user, "/edge_owner_to_timeline_media/count");
    profile.recent_items = user
        .pointer("/edge_owner_to_timeline_media/edges")
        .and_then(Value::as_array)
        .map(|edges| {
            edges
                .iter()
                .filter_map(|e| e.get("node"))
                .take(super::MAX_RECENT_ITEMS)
                .map(|node| post_item(node, &origin))
                .collect()
        })
        .unwrap_or_default();
    profile
}

fn post_item(node: &Value, origin: &str) -> ContentItem {
    let shortcode = str_at(node, "/shortcode").unwrap_or_default();
    let id = str_at(node, "/id").unwrap_or_else(|| shortcode.clone());
    let url = if shortcode.is_empty() {
        String::new()
    } else {
        format!("{origin}/p/{shortcode}/")
    };

    let mut item = content_item(id, url);
    item.caption = str_at(node, "/edge_media_to_caption/edges/0/node/text").unwrap_or_default();
    item.thumbnail_url = str_at(node, "/thumbnail_src")
        .or_else(|| str_at(node, "/display_url"))
        .unwrap_or_default();
    item.likes = count_at(node, "/edge_liked_by/count")
        .max(count_at(node, "/edge_media_preview_like/count"));
    item.comments = count_at(node, "/edge_media_to_comment/count");
    item.views = count_at(node, "/video_view_count");
    item.published_at = super::timestamp(node.get("taken_at_timestamp"));
    item
}

#[cfg(test)]
#[path = "instagram_test.rs"]
mod tests;
