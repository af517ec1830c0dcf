//! Multi-source business profiler: runs every requested extractor
//! concurrently and rolls the results up into one [`AggregateResult`].

pub mod aggregator;
pub mod error;
pub mod merge;
pub mod types;

pub use aggregator::Aggregator;
pub use error::ProfilerError;
pub use merge::merge;
pub use types::AggregateResult;
