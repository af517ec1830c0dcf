//! Cross-source roll-ups, computed once every extraction has settled.

use tablescout_core::{RestaurantData, SocialProfile, SourceKind, WebsiteProfile};

use crate::types::AggregateResult;

/// Builds the aggregate from whatever each source returned.
///
/// Only active sources count towards the totals. A source that came back as
/// an all-zero baseline is kept in its field but contributes nothing.
#[must_use]
pub fn merge(
    listing: Option<RestaurantData>,
    instagram: Option<SocialProfile>,
    tiktok: Option<SocialProfile>,
    youtube: Option<SocialProfile>,
    website: Option<WebsiteProfile>,
) -> AggregateResult {
    let mut active_sources = Vec::new();
    if listing.as_ref().is_some_and(RestaurantData::is_active) {
        active_sources.push(SourceKind::Listing);
    }

    let active_social: Vec<&SocialProfile> = [&instagram, &tiktok, &youtube]
        .into_iter()
        .flatten()
        .filter(|p| p.is_active())
        .collect();
    active_sources.extend(active_social.iter().map(|p| p.source));

    if website.as_ref().is_some_and(WebsiteProfile::is_active) {
        active_sources.push(SourceKind::Website);
    }

    // Counts come from untrusted pages and may sit at u64::MAX.
    let total_followers = active_social
        .iter()
        .map(|p| p.followers)
        .fold(0u64, u64::saturating_add);
    let total_content = active_social
        .iter()
        .map(|p| p.content_count)
        .fold(0u64, u64::saturating_add);
    let rates: Vec<f64> = active_social
        .iter()
        .filter_map(|p| p.engagement_rate)
        .collect();

    AggregateResult {
        listing,
        instagram,
        tiktok,
        youtube,
        website,
        total_followers,
        active_sources,
        total_content,
        average_engagement: average(&rates),
        elapsed_ms: 0,
    }
}

/// Mean rounded to two decimals; `None` for an empty slice.
fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}
