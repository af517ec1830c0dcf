//! Ranked-fallback runner shared by every extractor.

use tablescout_core::{ExtractionStrategy, SourceKind};

use crate::error::ScraperError;

/// A pure parse of one fetched page.
pub(crate) type StrategyFn<'a, R> = &'a dyn Fn(&str) -> Result<R, ScraperError>;

/// Runs `strategies` in order against `page` and returns the first result
/// accepted by `usable`, tagged with the strategy that produced it.
///
/// A strategy that errors or yields unusable data is logged at debug level
/// and the next one is tried. `None` means every strategy missed and the
/// caller falls back to its baseline record.
pub(crate) fn run_strategies<R>(
    source: SourceKind,
    handle: &str,
    page: &str,
    strategies: &[(ExtractionStrategy, StrategyFn<'_, R>)],
    usable: impl Fn(&R) -> bool,
) -> Option<(R, ExtractionStrategy)> {
    for (kind, strategy) in strategies {
        match strategy(page) {
            Ok(record) if usable(&record) => {
                tracing::debug!(
                    source = %source,
                    handle,
                    strategy = kind.as_str(),
                    "strategy produced usable data"
                );
                return Some((record, *kind));
            }
            Ok(_) => {
                tracing::debug!(
                    source = %source,
                    handle,
                    strategy = kind.as_str(),
                    "strategy produced no usable data"
                );
            }
            Err(e) => {
                tracing::debug!(
                    source = %source,
                    handle,
                    strategy = kind.as_str(),
                    error = %e,
                    "strategy failed"
                );
            }
        }
    }
    tracing::debug!(source = %source, handle, "all strategies missed, using baseline");
    None
}
