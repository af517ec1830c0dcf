//! Concurrent fan-out over every requested source.
//!
//! All requested extractions run together and the aggregator waits for each
//! one to settle. None is raced or cancelled. A panicking extractor is
//! caught here and its source recorded as absent.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tablescout_core::{AppConfig, ProfileRequest, SourceKind};
use tablescout_photos::{
    PhotoDownloader, PhotoPipeline, PipelineConfig, ScoringConfig, VisionAnalyzer,
};
use tablescout_scraper::{
    fetcher_from_config, InstagramExtractor, ListingExtractor, ListingPhotoStage, PageFetcher,
    TiktokExtractor, WebsiteExtractor, YoutubeExtractor,
};

use crate::error::ProfilerError;
use crate::merge::merge;
use crate::types::AggregateResult;

pub struct Aggregator {
    listing: ListingExtractor,
    instagram: InstagramExtractor,
    tiktok: TiktokExtractor,
    youtube: YoutubeExtractor,
    website: WebsiteExtractor,
}

impl Aggregator {
    /// Every extractor shares `fetcher`. `photos` enables photo selection and
    /// download on the listing source.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, photos: Option<ListingPhotoStage>) -> Self {
        let mut listing = ListingExtractor::new(Arc::clone(&fetcher));
        if let Some(stage) = photos {
            listing = listing.with_photos(stage);
        }
        Self {
            listing,
            instagram: InstagramExtractor::new(Arc::clone(&fetcher)),
            tiktok: TiktokExtractor::new(Arc::clone(&fetcher)),
            youtube: YoutubeExtractor::new(Arc::clone(&fetcher)),
            website: WebsiteExtractor::new(fetcher),
        }
    }

    /// Wires the fetcher, the photo downloader, and (when a vision API key is
    /// set) the photo pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError`] if an HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProfilerError> {
        let fetcher = fetcher_from_config(config)?;
        let downloader = PhotoDownloader::new(
            config.photo_dir.clone(),
            config.request_timeout_secs,
            &config.user_agent,
            config.photo_max_bytes,
        )?
        .with_max_edge(config.photo_max_edge);

        let pipeline = match config.vision_api_key.as_deref() {
            Some(api_key) => {
                let analyzer = VisionAnalyzer::new(
                    &config.vision_api_url,
                    api_key,
                    &config.vision_model,
                    config.request_timeout_secs,
                )?;
                let pipeline_config = PipelineConfig {
                    batch_size: config.photo_batch_size,
                    batch_pause: Duration::from_millis(config.photo_batch_pause_ms),
                    max_to_consider: config.photo_max_analyze,
                    scoring: ScoringConfig {
                        gallery_cap: config.photo_gallery_cap,
                        ..ScoringConfig::default()
                    },
                    ..PipelineConfig::default()
                };
                Some(Arc::new(PhotoPipeline::new(Arc::new(analyzer), pipeline_config)))
            }
            None => {
                tracing::info!("no vision API key configured, photos kept in page order");
                None
            }
        };

        let stage = ListingPhotoStage::new(
            pipeline,
            Arc::new(downloader),
            config.photo_max_analyze,
            config.photo_gallery_cap + 1,
        );
        Ok(Self::new(fetcher, Some(stage)))
    }

    /// Points a source's extractor at another host. The website source has
    /// no fixed host and ignores this.
    #[must_use]
    pub fn with_base_url(mut self, source: SourceKind, base_url: &str) -> Self {
        match source {
            SourceKind::Listing => self.listing = self.listing.with_base_url(base_url),
            SourceKind::Instagram => self.instagram = self.instagram.with_base_url(base_url),
            SourceKind::Tiktok => self.tiktok = self.tiktok.with_base_url(base_url),
            SourceKind::Youtube => self.youtube = self.youtube.with_base_url(base_url),
            SourceKind::Website => {}
        }
        self
    }

    /// Runs every requested source concurrently and merges the results.
    ///
    /// Never fails: with every source failing, the result simply has no
    /// active sources and zeroed roll-ups.
    pub async fn aggregate(&self, request: &ProfileRequest) -> AggregateResult {
        let started = Instant::now();

        let (listing, instagram, tiktok, youtube, website) = tokio::join!(
            settle(
                SourceKind::Listing,
                request.listing.as_ref().map(|q| self.listing.extract(q)),
            ),
            settle(
                SourceKind::Instagram,
                request.instagram.as_deref().map(|h| self.instagram.extract(h)),
            ),
            settle(
                SourceKind::Tiktok,
                request.tiktok.as_deref().map(|h| self.tiktok.extract(h)),
            ),
            settle(
                SourceKind::Youtube,
                request.youtube.as_deref().map(|h| self.youtube.extract(h)),
            ),
            settle(
                SourceKind::Website,
                request.website.as_deref().map(|u| self.website.extract(u)),
            ),
        );

        let mut result = merge(listing, instagram, tiktok, youtube, website);
        result.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let active: Vec<&str> = result.active_sources.iter().map(|s| s.as_str()).collect();
        tracing::info!(
            label = %request.label(),
            active_sources = ?active,
            total_followers = result.total_followers,
            total_content = result.total_content,
            elapsed_ms = result.elapsed_ms,
            "aggregate complete"
        );
        result
    }
}

/// Awaits one optional extraction, converting a panic into `None`.
async fn settle<T>(source: SourceKind, task: Option<impl Future<Output = T>>) -> Option<T> {
    let task = task?;
    match AssertUnwindSafe(task).catch_unwind().await {
        Ok(record) => Some(record),
        Err(panic) => {
            tracing::error!(
                source = %source,
                panic = panic_message(panic.as_ref()),
                "extractor panicked, source recorded as absent"
            );
            None
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod tests;
