//! Page fetching and per-source profile extraction.
//!
//! Each extractor fetches one page through an injected [`PageFetcher`] and
//! runs a ranked list of pure parse strategies over it. Extractors never
//! fail; the worst outcome is the source's zero-valued baseline record.

pub mod client;
pub mod error;
pub mod extract;
pub mod handle;
pub mod html;
pub(crate) mod json;
pub(crate) mod rate_limit;
pub(crate) mod strategy;

pub use client::{fetcher_from_config, HttpFetcher, PageFetcher, RenderFetcher};
pub use error::ScraperError;
pub use extract::{
    InstagramExtractor, ListingExtractor, ListingPhotoStage, TiktokExtractor, WebsiteExtractor,
    YoutubeExtractor,
};
pub use handle::{normalize_social_handle, normalize_website_url};
