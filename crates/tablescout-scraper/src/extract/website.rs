//! Business website extractor.
//!
//! Besides the ranked strategies, every fetched page is scanned for social
//! profile links, `mailto:` and `tel:` anchors, so even a baseline record
//! can point the caller at the business's other sources.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tablescout_core::{ExtractionStrategy, SocialLink, SourceKind, WebsiteProfile};

use crate::client::{extract_domain, PageFetcher};
use crate::error::ScraperError;
use crate::handle::{normalize_social_handle, normalize_website_url};
use crate::html::{
    absolutize_url, decode_entities, json_ld_nodes, meta_content, node_has_type, script_by_id,
    title_text,
};
use crate::json::{collect_key, find_key, str_at};
use crate::strategy::{run_strategies, StrategyFn};

const BUSINESS_TYPES: &[&str] = &[
    "Organization",
    "LocalBusiness",
    "Restaurant",
    "FoodEstablishment",
    "CafeOrCoffeeShop",
    "BarOrPub",
    "Bakery",
];

const SOCIAL_HOSTS: &[(SourceKind, &str)] = &[
    (SourceKind::Instagram, "instagram.com"),
    (SourceKind::Tiktok, "tiktok.com"),
    (SourceKind::Youtube, "youtube.com"),
];

const NAME_KEYS: &[&str] = &["siteName", "businessName", "restaurantName", "name", "title"];
const MAX_IMAGES: usize = 12;

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid href regex")
});
static TITLE_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[|–—-]\s+").expect("valid title separator regex"));

pub struct WebsiteExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl WebsiteExtractor {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn extract(&self, raw_url: &str) -> WebsiteProfile {
        let url = match normalize_website_url(raw_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(source = %SourceKind::Website, url = raw_url, error = %e, "invalid website, returning baseline");
                return WebsiteProfile::baseline(raw_url.trim(), "");
            }
        };

        let page = match self.fetcher.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(source = %SourceKind::Website, url, error = %e, "website fetch failed, returning baseline");
                return WebsiteProfile::baseline(&url, &extract_domain(&url));
            }
        };

        let profile = parse_website(&page, &url);
        tracing::info!(
            source = %SourceKind::Website,
            url,
            strategy = profile.strategy.as_str(),
            social_links = profile.social_links.len(),
            "website extracted"
        );
        profile
    }
}

#[must_use]
pub fn parse_website(page: &str, url: &str) -> WebsiteProfile {
    let seed = WebsiteProfile::baseline(url, &extract_domain(url));

    let json_ld = |p: &str| from_json_ld(p, &seed);
    let next_data = |p: &str| from_next_data(p, &seed);
    let meta = |p: &str| from_meta_tags(p, &seed);
    let strategies: [(ExtractionStrategy, StrategyFn<'_, WebsiteProfile>); 3] = [
        (ExtractionStrategy::EmbeddedState, &json_ld),
        (ExtractionStrategy::AlternateEmbedded, &next_data),
        (ExtractionStrategy::MetaTags, &meta),
    ];

    let mut profile = match run_strategies(SourceKind::Website, url, page, &strategies, |w| {
        !w.name.is_empty()
    }) {
        Some((mut profile, strategy)) => {
            profile.strategy = strategy;
            profile
        }
        None => seed,
    };

    profile.social_links = discover_social_links(page);
    if profile.email.is_empty() {
        profile.email = anchor_target(page, "mailto:").unwrap_or_default();
    }
    if profile.phone.is_empty() {
        profile.phone = anchor_target(page, "tel:").unwrap_or_default();
    }
    profile.image_urls = absolute_images(url, &profile.image_urls);
    profile
}

/// Strategy 1: JSON-LD business node.
fn from_json_ld(page: &str, seed: &WebsiteProfile) -> Result<WebsiteProfile, ScraperError> {
    let nodes = json_ld_nodes(page);
    let node = nodes
        .iter()
        .find(|n| node_has_type(n, BUSINESS_TYPES))
        .ok_or_else(|| ScraperError::missing("JSON-LD business node"))?;

    let mut profile = seed.clone();
    profile.name = str_at(node, "/name")
        .map(|n| decode_entities(&n))
        .unwrap_or_default();
    profile.description = str_at(node, "/description")
        .map(|d| decode_entities(&d))
        .unwrap_or_default();
    profile.phone = str_at(node, "/telephone").unwrap_or_default();
    profile.email = str_at(node, "/email")
        .map(|e| e.trim_start_matches("mailto:").to_owned())
        .unwrap_or_default();
    profile.category = match node.get("servesCuisine") {
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(Value::Array(items)) => items
            .iter()
            .find_map(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        _ => node
            .get("@type")
            .and_then(Value::as_str)
            .filter(|t| *t != "Organization")
            .unwrap_or_default()
            .to_owned(),
    };
    for key in ["image", "logo"] {
        collect_strings(node.get(key), &mut profile.image_urls);
    }
    Ok(profile)
}

/// Strategy 2: Next.js `__NEXT_DATA__` page props.
fn from_next_data(page: &str, seed: &WebsiteProfile) -> Result<WebsiteProfile, ScraperError> {
    let raw =
        script_by_id(page, "__NEXT_DATA__").ok_or_else(|| ScraperError::missing("__NEXT_DATA__"))?;
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ScraperError::deserialize("__NEXT_DATA__", e))?;
    let props = value
        .pointer("/props/pageProps")
        .ok_or_else(|| ScraperError::missing("__NEXT_DATA__ pageProps"))?;

    let mut profile = seed.clone();
    profile.name = first_string(props, NAME_KEYS).unwrap_or_default();
    profile.description = first_string(props, &["description", "tagline"]).unwrap_or_default();
    profile.phone = first_string(props, &["phone", "telephone", "phoneNumber"]).unwrap_or_default();
    profile.email = first_string(props, &["email"]).unwrap_or_default();
    for key in ["image", "imageUrl", "heroImage"] {
        for found in collect_key(props, key, MAX_IMAGES) {
            collect_strings(Some(found), &mut profile.image_urls);
        }
    }
    Ok(profile)
}

/// Strategy 3: `og:site_name`, else the first segment of `og:title` or
/// `<title>` (`"Luigi's | Wood-fired pizza"` → `"Luigi's"`).
fn from_meta_tags(page: &str, seed: &WebsiteProfile) -> Result<WebsiteProfile, ScraperError> {
    let name = meta_content(page, "og:site_name")
        .or_else(|| {
            meta_content(page, "og:title")
                .or_else(|| title_text(page))
                .and_then(|t| {
                    TITLE_SEPARATOR_RE
                        .split(&t)
                        .next()
                        .map(|s| s.trim().to_owned())
                })
        })
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ScraperError::missing("site name"))?;

    let mut profile = seed.clone();
    profile.name = name;
    profile.description = meta_content(page, "description")
        .or_else(|| meta_content(page, "og:description"))
        .unwrap_or_default();
    if let Some(image) = meta_content(page, "og:image") {
        profile.image_urls.push(image);
    }
    Ok(profile)
}

/// First Instagram, TikTok, and `YouTube` profile linked from the page, in
/// that order, from anchors and JSON-LD `sameAs`.
fn discover_social_links(page: &str) -> Vec<SocialLink> {
    let mut candidates: Vec<String> = HREF_RE
        .captures_iter(page)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| decode_entities(m.as_str()))
        .collect();
    for node in json_ld_nodes(page) {
        collect_strings(node.get("sameAs"), &mut candidates);
    }

    SOCIAL_HOSTS
        .iter()
        .filter_map(|(platform, host)| {
            candidates
                .iter()
                .filter(|c| c.to_ascii_lowercase().contains(host))
                .find_map(|c| {
                    normalize_social_handle(*platform, c)
                        .ok()
                        .map(|handle| SocialLink {
                            platform: *platform,
                            handle,
                            url: c.trim().to_owned(),
                        })
                })
        })
        .collect()
}

/// Target of the first `href="<scheme>..."` anchor, without query.
fn anchor_target(page: &str, scheme: &str) -> Option<String> {
    HREF_RE
        .captures_iter(page)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .find_map(|m| {
            let href = m.as_str().trim();
            let rest = href
                .get(..scheme.len())
                .filter(|p| p.eq_ignore_ascii_case(scheme))
                .map(|_| &href[scheme.len()..])?;
            let target = rest.split('?').next().unwrap_or(rest).trim();
            Some(decode_entities(target)).filter(|t| !t.is_empty())
        })
}

fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        find_key(value, key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    })
}

fn collect_strings(value: Option<&Value>, out: &mut Vec<String>) {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => out.push(s.trim().to_owned()),
        Some(Value::Array(items)) => {
            for item in items {
                collect_strings(Some(item), out);
            }
        }
        Some(obj @ Value::Object(_)) => {
            collect_strings(obj.get("url").or_else(|| obj.get("src")), out);
        }
        _ => {}
    }
}

fn absolute_images(base_url: &str, images: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for image in images {
        if let Some(abs) = absolutize_url(base_url, image) {
            if (abs.starts_with("https://") || abs.starts_with("http://")) && !out.contains(&abs) {
                out.push(abs);
            }
        }
        if out.len() >= MAX_IMAGES {
            break;
        }
    }
    out
}

#[cfg(test)]
#[path = "website_test.rs"]
mod tests;
