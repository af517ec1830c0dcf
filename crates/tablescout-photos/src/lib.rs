//! Photo selection for business profiles.
//!
//! Candidate URLs are normalized to their highest-resolution variant,
//! analyzed in throttled batches, scored, and partitioned into one hero, a
//! bounded gallery, and everything skipped. Selected photos can then be
//! materialized to local files.

pub mod analyzer;
pub mod download;
pub mod error;
pub mod pipeline;
pub mod scoring;
pub mod types;
pub mod urls;

pub use analyzer::{PhotoAnalyzer, VisionAnalyzer};
pub use download::PhotoDownloader;
pub use error::PhotoError;
pub use pipeline::{PhotoPipeline, PipelineConfig};
pub use scoring::{combined_score, partition, ScoringConfig};
pub use tablescout_core::PhotoSubject;
pub use types::{PhotoAnalysis, PhotoCandidate, PhotoSelection, Recommendation};
pub use urls::{dedup_candidates, prefer_highest_resolution};
