use serde::{Deserialize, Serialize};
use tablescout_core::{RestaurantData, SocialProfile, SourceKind, WebsiteProfile};

/// The merged result of one aggregate run.
///
/// A source is `None` when it was not requested or its extractor panicked.
/// A requested source that found nothing is present as its baseline record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub listing: Option<RestaurantData>,
    pub instagram: Option<SocialProfile>,
    pub tiktok: Option<SocialProfile>,
    pub youtube: Option<SocialProfile>,
    pub website: Option<WebsiteProfile>,
    /// Sum of followers and subscribers over active social sources.
    pub total_followers: u64,
    /// Sources whose key metric is strictly positive, in declaration order.
    pub active_sources: Vec<SourceKind>,
    /// Sum of posts and videos over active social sources.
    pub total_content: u64,
    /// Mean engagement rate (percent, two decimals) over active sources that
    /// expose one.
    pub average_engagement: Option<f64>,
    pub elapsed_ms: u64,
}

impl AggregateResult {
    /// True when no source yielded usable data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active_sources.is_empty()
    }
}
