use thiserror::Error;

/// Failures while wiring an [`crate::Aggregator`] from configuration.
///
/// Aggregation itself never fails.
#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("scraper setup error: {0}")]
    Scraper(#[from] tablescout_scraper::ScraperError),

    #[error("photo setup error: {0}")]
    Photos(#[from] tablescout_photos::PhotoError),
}
