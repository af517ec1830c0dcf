//! Normalized per-source records.
//!
//! Every record is fully populated: numbers default to `0`, text to `""`,
//! lists to empty. Zero means "unknown", never "confirmed absent".

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parse::to_slug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Listing,
    Instagram,
    Tiktok,
    Youtube,
    Website,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Listing => "listing",
            SourceKind::Instagram => "instagram",
            SourceKind::Tiktok => "tiktok",
            SourceKind::Youtube => "youtube",
            SourceKind::Website => "website",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rung of the fallback ladder produced a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    EmbeddedState,
    AlternateEmbedded,
    MetaTags,
    #[default]
    Baseline,
}

impl ExtractionStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionStrategy::EmbeddedState => "embedded_state",
            ExtractionStrategy::AlternateEmbedded => "alternate_embedded",
            ExtractionStrategy::MetaTags => "meta_tags",
            ExtractionStrategy::Baseline => "baseline",
        }
    }
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recent post, reel, or video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub url: String,
    pub caption: String,
    pub thumbnail_url: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub published_at: Option<DateTime<Utc>>,
}

/// Profile record shared by the Instagram, TikTok, and `YouTube` extractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub source: SourceKind,
    pub handle: String,
    /// Slug of the handle; stable across display-name changes.
    pub canonical_id: String,
    pub profile_url: String,
    pub display_name: String,
    pub bio: String,
    pub category: String,
    pub avatar_url: String,
    pub verified: bool,
    /// Followers, or subscribers on `YouTube`.
    pub followers: u64,
    pub following: u64,
    pub content_count: u64,
    pub total_likes: u64,
    pub recent_items: Vec<ContentItem>,
    pub image_urls: Vec<String>,
    /// Percent; `None` when the platform exposes no per-item engagement.
    pub engagement_rate: Option<f64>,
    pub strategy: ExtractionStrategy,
}

impl SocialProfile {
    /// The record returned when nothing could be extracted.
    #[must_use]
    pub fn baseline(source: SourceKind, handle: &str, profile_url: &str) -> Self {
        Self {
            source,
            handle: handle.to_string(),
            canonical_id: to_slug(handle),
            profile_url: profile_url.to_string(),
            display_name: String::new(),
            bio: String::new(),
            category: String::new(),
            avatar_url: String::new(),
            verified: false,
            followers: 0,
            following: 0,
            content_count: 0,
            total_likes: 0,
            recent_items: Vec::new(),
            image_urls: Vec::new(),
            engagement_rate: None,
            strategy: ExtractionStrategy::Baseline,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.followers > 0
    }

    /// Mean `(likes + comments) / followers` over recent items, as a percent
    /// rounded to two decimals.
    #[must_use]
    pub fn engagement_from_items(followers: u64, items: &[ContentItem]) -> Option<f64> {
        if followers == 0 || items.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let interactions: f64 = items
            .iter()
            .map(|i| i.likes.saturating_add(i.comments) as f64)
            .sum::<f64>()
            / items.len() as f64;
        #[allow(clippy::cast_precision_loss)]
        let rate = interactions / followers as f64 * 100.0;
        Some((rate * 100.0).round() / 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub rating: f64,
    pub text: String,
    pub relative_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSubject {
    Food,
    Ambiance,
    Exterior,
    People,
    Other,
}

impl PhotoSubject {
    /// Lenient label parsing; anything unrecognized is `Other`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "food" | "dish" | "drink" | "menu" => PhotoSubject::Food,
            "ambiance" | "ambience" | "interior" => PhotoSubject::Ambiance,
            "exterior" | "facade" | "storefront" => PhotoSubject::Exterior,
            "people" | "staff" | "team" => PhotoSubject::People,
            _ => PhotoSubject::Other,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoSubject::Food => "food",
            PhotoSubject::Ambiance => "ambiance",
            PhotoSubject::Exterior => "exterior",
            PhotoSubject::People => "people",
            PhotoSubject::Other => "other",
        }
    }
}

impl std::fmt::Display for PhotoSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A photo already downloaded to local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoFile {
    pub source_url: String,
    pub local_path: PathBuf,
    pub alt_text: String,
    pub subject: Option<PhotoSubject>,
    pub is_hero: bool,
}

/// Listing-source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantData {
    pub name: String,
    pub slug: String,
    pub query: String,
    pub category: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub rating: f64,
    pub review_count: u64,
    pub price_level: String,
    pub hours: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub maps_url: String,
    pub reviews: Vec<Review>,
    pub photo_urls: Vec<String>,
    pub photos: Vec<PhotoFile>,
    pub strategy: ExtractionStrategy,
}

impl RestaurantData {
    /// The record returned when nothing could be extracted; still nameable.
    #[must_use]
    pub fn baseline(name: &str, query: &str, maps_url: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            slug: to_slug(name),
            query: query.to_string(),
            category: String::new(),
            address: String::new(),
            phone: String::new(),
            website: String::new(),
            rating: 0.0,
            review_count: 0,
            price_level: String::new(),
            hours: Vec::new(),
            latitude: 0.0,
            longitude: 0.0,
            maps_url: maps_url.to_string(),
            reviews: Vec::new(),
            photo_urls: Vec::new(),
            photos: Vec::new(),
            strategy: ExtractionStrategy::Baseline,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.review_count > 0 || self.rating > 0.0
    }
}

/// A social profile link discovered on a website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: SourceKind,
    pub handle: String,
    pub url: String,
}

/// Website-source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteProfile {
    pub url: String,
    pub domain: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub phone: String,
    pub email: String,
    pub image_urls: Vec<String>,
    pub social_links: Vec<SocialLink>,
    pub strategy: ExtractionStrategy,
}

impl WebsiteProfile {
    #[must_use]
    pub fn baseline(url: &str, domain: &str) -> Self {
        Self {
            url: url.to_string(),
            domain: domain.to_string(),
            name: String::new(),
            description: String::new(),
            category: String::new(),
            phone: String::new(),
            email: String::new(),
            image_urls: Vec::new(),
            social_links: Vec::new(),
            strategy: ExtractionStrategy::Baseline,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.name.is_empty()
    }
}
