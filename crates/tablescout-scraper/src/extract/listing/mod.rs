//! Maps listing extractor.
//!
//! One search page yields the place record. When a strategy succeeds, the
//! reviews page and the photo stage run concurrently; both are best-effort
//! and leave their list empty on failure.

mod photos;
mod reviews;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tablescout_core::{
    parse_compact_count, ExtractionStrategy, ListingQuery, PhotoFile, RestaurantData, Review,
    SourceKind,
};

use crate::client::PageFetcher;
use crate::error::ScraperError;
use crate::html::{
    clean_text, decode_entities, extract_attr, json_ld_nodes, meta_content, node_has_type,
};
use crate::json::{count_at, f64_at, str_at};
use crate::strategy::{run_strategies, StrategyFn};

pub use photos::{photo_urls, ListingPhotoStage};
pub use reviews::{filter_reviews, parse_reviews, MAX_REVIEWS, MIN_REVIEW_CHARS, MIN_REVIEW_RATING};

const PLACE_TYPES: &[&str] = &[
    "Restaurant",
    "FoodEstablishment",
    "LocalBusiness",
    "CafeOrCoffeeShop",
    "BarOrPub",
    "Bakery",
];

static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1>").expect("valid h1 regex"));
static ARIA_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)aria-label\s*=\s*"([^"]*)""#).expect("valid aria-label regex")
});
static STARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d(?:[.,]\d)?)\s+stars?\b").expect("valid stars regex")
});
static REVIEWS_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d[\d.,]*\s?[KM]?)\s+reviews?\b").expect("valid reviews regex")
});
static ITEM_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<[a-z]+\b[^>]*\bdata-item-id\s*=\s*"[^"]*"[^>]*>"#)
        .expect("valid data-item-id regex")
});
static CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<button\b[^>]*jsaction\s*=\s*"[^"]*\.category"[^>]*>(.*?)</button>"#)
        .expect("valid category regex")
});
static COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!3d(-?\d{1,3}\.\d+)!4d(-?\d{1,3}\.\d+)").expect("valid coordinates regex")
});
static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("valid weekday regex")
});
static OG_RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d(?:[.,]\d)?)\s*(?:★|stars?\b)").expect("valid og rating regex")
});
static OG_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((\d[\d.,]*\s?[KM]?)\)|(\d[\d.,]*\s?[KM]?)\s+reviews?\b")
        .expect("valid og review count regex")
});

pub struct ListingExtractor {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    photos: Option<ListingPhotoStage>,
}

impl ListingExtractor {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.google.com";

    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            photos: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Enables photo selection and download for successful extractions.
    #[must_use]
    pub fn with_photos(mut self, stage: ListingPhotoStage) -> Self {
        self.photos = Some(stage);
        self
    }

    /// Search URL for the place, e.g.
    /// `https://www.google.com/maps/search/?api=1&query=Luigi%27s+Springfield&hl=en`.
    #[must_use]
    pub fn search_url(&self, search_text: &str) -> String {
        self.maps_url(search_text, false)
    }

    #[must_use]
    pub fn reviews_url(&self, search_text: &str) -> String {
        self.maps_url(search_text, true)
    }

    fn maps_url(&self, search_text: &str, reviews: bool) -> String {
        let raw = format!("{}/maps/search/", self.base_url.trim_end_matches('/'));
        let Ok(mut url) = reqwest::Url::parse(&raw) else {
            return raw;
        };
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("api", "1")
                .append_pair("query", search_text)
                .append_pair("hl", "en");
            if reviews {
                pairs.append_pair("tab", "reviews");
            }
        }
        url.to_string()
    }

    pub async fn extract(&self, query: &ListingQuery) -> RestaurantData {
        let search_text = query.search_text();
        let url = self.search_url(&search_text);
        if query.name.trim().is_empty() {
            tracing::warn!(source = %SourceKind::Listing, "empty business name, returning baseline");
            return RestaurantData::baseline(&query.name, &search_text, "");
        }

        let page = match self.fetcher.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(source = %SourceKind::Listing, query = %search_text, error = %e, "listing fetch failed, returning baseline");
                return RestaurantData::baseline(&query.name, &search_text, &url);
            }
        };

        let mut record = parse_listing(&page, query, &url);
        if record.strategy == ExtractionStrategy::Baseline {
            return record;
        }

        let (reviews, photos) = tokio::join!(
            self.fetch_reviews(&search_text),
            self.materialize_photos(&record)
        );
        if !reviews.is_empty() {
            record.reviews = reviews;
        }
        record.photos = photos;

        tracing::info!(
            source = %SourceKind::Listing,
            query = %search_text,
            strategy = record.strategy.as_str(),
            rating = record.rating,
            review_count = record.review_count,
            reviews = record.reviews.len(),
            photos = record.photos.len(),
            "listing extracted"
        );
        record
    }

    async fn fetch_reviews(&self, search_text: &str) -> Vec<Review> {
        let url = self.reviews_url(search_text);
        match self.fetcher.fetch_page(&url).await {
            Ok(page) => filter_reviews(parse_reviews(&page)),
            Err(e) => {
                tracing::warn!(source = %SourceKind::Listing, query = %search_text, error = %e, "reviews fetch failed");
                Vec::new()
            }
        }
    }

    async fn materialize_photos(&self, record: &RestaurantData) -> Vec<PhotoFile> {
        match &self.photos {
            Some(stage) => stage.run(&record.slug, &record.name, &record.photo_urls).await,
            None => Vec::new(),
        }
    }
}

/// Runs the listing strategies over a fetched search page.
///
/// The slug always derives from the requested name so repeated runs land on
/// the same identifier whatever the page calls the place.
#[must_use]
pub fn parse_listing(page: &str, query: &ListingQuery, maps_url: &str) -> RestaurantData {
    let seed = RestaurantData::baseline(&query.name, &query.search_text(), maps_url);
    let label = query.search_text();

    let json_ld = |p: &str| from_json_ld(p, &seed);
    let dom = |p: &str| from_place_panel(p, &seed);
    let meta = |p: &str| from_meta_tags(p, &seed);
    let strategies: [(ExtractionStrategy, StrategyFn<'_, RestaurantData>); 3] = [
        (ExtractionStrategy::EmbeddedState, &json_ld),
        (ExtractionStrategy::AlternateEmbedded, &dom),
        (ExtractionStrategy::MetaTags, &meta),
    ];

    match run_strategies(SourceKind::Listing, &label, page, &strategies, |r| {
        !r.name.is_empty() && (r.rating > 0.0 || r.review_count > 0 || !r.address.is_empty())
    }) {
        Some((mut record, strategy)) => {
            record.strategy = strategy;
            record.photo_urls = photo_urls(page);
            record
        }
        None => seed,
    }
}

/// Strategy 1: JSON-LD place node.
fn from_json_ld(page: &str, seed: &RestaurantData) -> Result<RestaurantData, ScraperError> {
    let nodes = json_ld_nodes(page);
    let node = nodes
        .iter()
        .find(|n| node_has_type(n, PLACE_TYPES))
        .ok_or_else(|| ScraperError::missing("JSON-LD place node"))?;

    let mut record = seed.clone();
    record.name = str_at(node, "/name").unwrap_or_default();
    record.address = postal_address(node.get("address"));
    record.phone = str_at(node, "/telephone").unwrap_or_default();
    record.website = str_at(node, "/url").unwrap_or_default();
    record.rating = f64_at(node, "/aggregateRating/ratingValue");
    record.review_count = match count_at(node, "/aggregateRating/reviewCount") {
        0 => count_at(node, "/aggregateRating/ratingCount"),
        n => n,
    };
    record.price_level = str_at(node, "/priceRange").unwrap_or_default();
    record.category = first_text(node.get("servesCuisine"))
        .or_else(|| {
            node.get("@type")
                .and_then(Value::as_str)
                .filter(|t| !matches!(*t, "LocalBusiness" | "FoodEstablishment"))
                .map(str::to_owned)
        })
        .unwrap_or_default();
    record.hours = opening_hours(node);
    if let (Some(lat), Some(lng)) = (
        signed_at(node, "/geo/latitude"),
        signed_at(node, "/geo/longitude"),
    ) {
        record.latitude = lat;
        record.longitude = lng;
    }
    record.reviews = filter_reviews(reviews::from_json_ld_node(node));
    Ok(record)
}

/// Strategy 2: rendered place panel.
fn from_place_panel(page: &str, seed: &RestaurantData) -> Result<RestaurantData, ScraperError> {
    let name = H1_RE
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ScraperError::missing("place panel <h1>"))?;

    let mut record = seed.clone();
    record.name = name;

    for label in ARIA_LABEL_RE
        .captures_iter(page)
        .filter_map(|c| c.get(1))
        .map(|m| decode_entities(m.as_str()))
    {
        if record.rating <= 0.0 {
            if let Some(c) = STARS_RE.captures(&label) {
                record.rating = parse_rating(&c[1]);
                continue;
            }
        }
        if record.review_count == 0 {
            if let Some(c) = REVIEWS_LABEL_RE.captures(&label) {
                record.review_count = parse_compact_count(&c[1]);
                continue;
            }
        }
        if record.price_level.is_empty() {
            if let Some(price) = label.strip_prefix("Price: ") {
                record.price_level = price.trim().to_owned();
                continue;
            }
        }
        if record.hours.is_empty() && WEEKDAY_RE.is_match(&label) && label.contains(';') {
            record.hours = label
                .split(';')
                .map(|day| day.split(". Hide").next().unwrap_or(day).trim().trim_end_matches('.'))
                .filter(|day| !day.is_empty())
                .map(str::to_owned)
                .collect();
        }
    }

    for tag in ITEM_TAG_RE.find_iter(page).map(|m| m.as_str()) {
        let Some(item_id) = extract_attr(tag, "data-item-id") else {
            continue;
        };
        let label = extract_attr(tag, "aria-label")
            .map(|l| decode_entities(&l))
            .unwrap_or_default();
        if item_id == "address" && record.address.is_empty() {
            record.address = strip_label(&label, "Address:");
        } else if let Some(number) = item_id.strip_prefix("phone:tel:") {
            if record.phone.is_empty() {
                record.phone = strip_label(&label, "Phone:");
                if record.phone.is_empty() {
                    record.phone = number.to_owned();
                }
            }
        } else if item_id == "authority" && record.website.is_empty() {
            record.website = extract_attr(tag, "href")
                .map(|h| decode_entities(&h))
                .unwrap_or_else(|| strip_label(&label, "Website:"));
        }
    }

    record.category = CATEGORY_RE
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .unwrap_or_default();
    if let Some((lat, lng)) = coordinates(page) {
        record.latitude = lat;
        record.longitude = lng;
    }
    Ok(record)
}

/// Strategy 3: `og:title` "Name · Address" and an `og:description` such as
/// `"4.6 ★★★★★ (1,234) · Italian restaurant"`.
fn from_meta_tags(page: &str, seed: &RestaurantData) -> Result<RestaurantData, ScraperError> {
    let title =
        meta_content(page, "og:title").ok_or_else(|| ScraperError::missing("og:title"))?;
    let description = meta_content(page, "og:description").unwrap_or_default();

    let mut record = seed.clone();
    match title.split_once(" · ") {
        Some((name, address)) => {
            record.name = name.trim().to_owned();
            record.address = address.trim().to_owned();
        }
        None => record.name = title.trim().to_owned(),
    }
    record.rating = OG_RATING_RE
        .captures(&description)
        .map_or(0.0, |c| parse_rating(&c[1]));
    record.review_count = OG_COUNT_RE
        .captures(&description)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map_or(0, |m| parse_compact_count(m.as_str()));
    record.category = description
        .split(" · ")
        .map(str::trim)
        .find(|part| !part.is_empty() && !part.chars().any(|c| c.is_ascii_digit() || c == '★'))
        .unwrap_or_default()
        .to_owned();
    if let Some((lat, lng)) = coordinates(page) {
        record.latitude = lat;
        record.longitude = lng;
    }
    Ok(record)
}

fn parse_rating(text: &str) -> f64 {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && (0.0..=5.0).contains(r))
        .unwrap_or(0.0)
}

fn strip_label(label: &str, prefix: &str) -> String {
    label
        .strip_prefix(prefix)
        .unwrap_or(label)
        .trim()
        .to_owned()
}

fn coordinates(page: &str) -> Option<(f64, f64)> {
    let c = COORDS_RE.captures(page)?;
    let lat = c[1].parse::<f64>().ok()?;
    let lng = c[2].parse::<f64>().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)).then_some((lat, lng))
}

/// Coordinates may be negative, so unlike `f64_at` this does not clamp.
fn signed_at(node: &Value, pointer: &str) -> Option<f64> {
    match node.pointer(pointer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn first_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Value::Array(items) => items.iter().find_map(|v| first_text(Some(v))),
        _ => None,
    }
}

/// Address as a single line, from a plain string or a `PostalAddress`.
fn postal_address(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(obj @ Value::Object(_)) => [
            "/streetAddress",
            "/addressLocality",
            "/addressRegion",
            "/postalCode",
        ]
        .iter()
        .filter_map(|p| str_at(obj, p))
        .collect::<Vec<_>>()
        .join(", "),
        _ => String::new(),
    }
}

/// `openingHours` strings, or `openingHoursSpecification` entries rendered as
/// `"Monday: 11:00-22:00"`.
fn opening_hours(node: &Value) -> Vec<String> {
    match node.get("openingHours") {
        Some(Value::String(s)) if !s.trim().is_empty() => return vec![s.trim().to_owned()],
        Some(Value::Array(items)) => {
            let hours: Vec<String> = items
                .iter()
                .filter_map(|v| first_text(Some(v)))
                .collect();
            if !hours.is_empty() {
                return hours;
            }
        }
        _ => {}
    }

    let specs = match node.get("openingHoursSpecification") {
        Some(Value::Array(items)) => items.iter().collect::<Vec<_>>(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => return Vec::new(),
    };
    let mut hours = Vec::new();
    for spec in specs {
        let opens = str_at(spec, "/opens").unwrap_or_default();
        let closes = str_at(spec, "/closes").unwrap_or_default();
        let days: Vec<String> = match spec.get("dayOfWeek") {
            Some(Value::String(d)) => vec![d.clone()],
            Some(Value::Array(ds)) => ds
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        };
        for day in days {
            let day = day.rsplit('/').next().unwrap_or(&day).to_owned();
            hours.push(format!("{day}: {opens}-{closes}"));
        }
    }
    hours
}

#[cfg(test)]
#[path = "../listing_test.rs"]
mod tests;
