//! TikTok profile extractor.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tablescout_core::{ContentItem, ExtractionStrategy, SocialProfile, SourceKind};

use super::{captured_count, content_item, count_label_re, finish_social, name_before_handle};
use crate::client::{extract_origin, PageFetcher};
use crate::error::ScraperError;
use crate::html::{assigned_json, meta_content, script_by_id, title_text};
use crate::json::{count_at, str_at};
use crate::strategy::{run_strategies, StrategyFn};

static LIKES_RE: LazyLock<Regex> = LazyLock::new(|| count_label_re("Likes"));
static FOLLOWERS_RE: LazyLock<Regex> = LazyLock::new(|| count_label_re("Followers"));
static FOLLOWING_RE: LazyLock<Regex> = LazyLock::new(|| count_label_re("Following"));
static BIO_AFTER_FOLLOWERS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Followers\.\s*(.+)$").expect("valid tiktok bio regex")
});

pub struct TiktokExtractor {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
}

impl TiktokExtractor {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.tiktok.com";

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

    #[must_use]
    pub fn profile_url(&self, handle: &str) -> String {
        format!("{}/@{handle}", self.base_url.trim_end_matches('/'))
    }

    pub async fn extract(&self, raw_handle: &str) -> SocialProfile {
        super::extract_social(
            self.fetcher.as_ref(),
            SourceKind::Tiktok,
            raw_handle,
            |h| self.profile_url(h),
            parse_profile,
        )
        .await
    }
}

#[must_use]
pub fn parse_profile(page: &str, handle: &str, profile_url: &str) -> SocialProfile {
    let seed = SocialProfile::baseline(SourceKind::Tiktok, handle, profile_url);

    let rehydration = |p: &str| from_rehydration(p, &seed);
    let sigi = |p: &str| from_sigi_state(p, &seed);
    let meta = |p: &str| from_meta_tags(p, &seed);
    let strategies: [(ExtractionStrategy, StrategyFn<'_, SocialProfile>); 3] = [
        (ExtractionStrategy::EmbeddedState, &rehydration),
        (ExtractionStrategy::AlternateEmbedded, &sigi),
        (ExtractionStrategy::MetaTags, &meta),
    ];

    match run_strategies(SourceKind::Tiktok, handle, page, &strategies, |p| {
        p.followers > 0 || p.total_likes > 0
    }) {
        Some((mut profile, strategy)) => {
            profile.strategy = strategy;
            finish_social(profile, true)
        }
        None => seed,
    }
}

/// Strategy 1: `__UNIVERSAL_DATA_FOR_REHYDRATION__` → `webapp.user-detail`.
fn from_rehydration(page: &str, seed: &SocialProfile) -> Result<SocialProfile, ScraperError> {
    let raw = script_by_id(page, "__UNIVERSAL_DATA_FOR_REHYDRATION__")
        .ok_or_else(|| ScraperError::missing("__UNIVERSAL_DATA_FOR_REHYDRATION__"))?;
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ScraperError::deserialize("__UNIVERSAL_DATA_FOR_REHYDRATION__", e))?;
    let detail = value
        .pointer("/__DEFAULT_SCOPE__/webapp.user-detail")
        .ok_or_else(|| ScraperError::missing("webapp.user-detail"))?;
    let info = detail
        .get("userInfo")
        .ok_or_else(|| ScraperError::missing("webapp.user-detail.userInfo"))?;

    let user = info.get("user").unwrap_or(&Value::Null);
    let stats = info
        .get("stats")
        .filter(|s| s.is_object())
        .or_else(|| info.get("statsV2"))
        .unwrap_or(&Value::Null);
    let mut profile = apply_user(seed, user, stats);

    let items = info
        .get("itemList")
        .or_else(|| detail.get("itemList"))
        .and_then(Value::as_array);
    if let Some(items) = items {
        let origin = extract_origin(&seed.profile_url);
        profile.recent_items = items
            .iter()
            .take(super::MAX_RECENT_ITEMS)
            .map(|item| video_item(item, &origin, &profile.handle))
            .collect();
    }
    Ok(profile)
}

/// Strategy 2: legacy `SIGI_STATE` with `UserModule` and `ItemModule`.
fn from_sigi_state(page: &str, seed: &SocialProfile) -> Result<SocialProfile, ScraperError> {
    let raw = script_by_id(page, "SIGI_STATE")
        .or_else(|| assigned_json(page, "SIGI_STATE"))
        .ok_or_else(|| ScraperError::missing("SIGI_STATE"))?;
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ScraperError::deserialize("SIGI_STATE", e))?;

    let users = value
        .pointer("/UserModule/users")
        .and_then(Value::as_object)
        .ok_or_else(|| ScraperError::missing("UserModule.users"))?;
    let (key, user) = users
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(&seed.handle))
        .or_else(|| users.iter().next())
        .ok_or_else(|| ScraperError::missing("UserModule user entry"))?;
    let stats = value
        .pointer("/UserModule/stats")
        .and_then(|s| s.get(key.as_str()))
        .unwrap_or(&Value::Null);
    let mut profile = apply_user(seed, user, stats);

    if let Some(items) = value.pointer("/ItemModule").and_then(Value::as_object) {
        let origin = extract_origin(&seed.profile_url);
        let mut videos: Vec<&Value> = items.values().collect();
        // Newest first; the module is keyed by id, not ordered.
        videos.sort_by_key(|v| std::cmp::Reverse(count_at(v, "/createTime")));
        profile.recent_items = videos
            .into_iter()
            .take(super::MAX_RECENT_ITEMS)
            .map(|item| video_item(item, &origin, &profile.handle))
            .collect();
    }
    Ok(profile)
}

/// Strategy 3: meta description such as
/// `"Luigi's (@luigis) on TikTok | 1.2M Likes. 45.6K Followers. Pizza daily."`.
fn from_meta_tags(page: &str, seed: &SocialProfile) -> Result<SocialProfile, ScraperError> {
    let description = meta_content(page, "description")
        .or_else(|| meta_content(page, "og:description"))
        .ok_or_else(|| ScraperError::missing("meta description"))?;

    let mut profile = seed.clone();
    profile.total_likes = captured_count(&LIKES_RE, &description);
    profile.followers = captured_count(&FOLLOWERS_RE, &description);
    profile.following = captured_count(&FOLLOWING_RE, &description);
    profile.display_name = meta_content(page, "og:title")
        .or_else(|| title_text(page))
        .as_deref()
        .and_then(name_before_handle)
        .unwrap_or_default();
    profile.avatar_url = meta_content(page, "og:image").unwrap_or_default();
    profile.bio = BIO_AFTER_FOLLOWERS_RE
        .captures(&description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|b| !b.starts_with("Watch the latest video"))
        .unwrap_or_default();
    Ok(profile)
}

fn apply_user(seed: &SocialProfile, user: &Value, stats: &Value) -> SocialProfile {
    let mut profile = seed.clone();
    profile.display_name = str_at(user, "/nickname").unwrap_or_default();
    profile.bio = str_at(user, "/signature").unwrap_or_default();
    profile.avatar_url = str_at(user, "/avatarLarger")
        .or_else(|| str_at(user, "/avatarMedium"))
        .or_else(|| str_at(user, "/avatarThumb"))
        .unwrap_or_default();
    profile.verified = user
        .get("verified")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    profile.category = str_at(user, "/commerceUserInfo/category").unwrap_or_default();
    profile.followers = count_at(stats, "/followerCount");
    profile.following = count_at(stats, "/followingCount");
    profile.content_count = count_at(stats, "/videoCount");
    profile.total_likes = count_at(stats, "/heartCount").max(count_at(stats, "/heart"));
    profile
}

fn video_item(item: &Value, origin: &str, handle: &str) -> ContentItem {
    let id = str_at(item, "/id").unwrap_or_default();
    let url = if id.is_empty() {
        String::new()
    } else {
        format!("{origin}/@{handle}/video/{id}")
    };
    let stats = item
        .get("stats")
        .filter(|s| s.is_object())
        .or_else(|| item.get("statsV2"))
        .unwrap_or(&Value::Null);

    let mut video = content_item(id, url);
    video.caption = str_at(item, "/desc").unwrap_or_default();
    video.thumbnail_url = str_at(item, "/video/cover")
        .or_else(|| str_at(item, "/video/originCover"))
        .unwrap_or_default();
    video.likes = count_at(stats, "/diggCount");
    video.comments = count_at(stats, "/commentCount");
    video.views = count_at(stats, "/playCount");
    video.shares = count_at(stats, "/shareCount");
    video.published_at = super::timestamp(item.get("createTime"));
    video
}

#[cfg(test)]
#[path = "tiktok_test.rs"]
mod tests;
