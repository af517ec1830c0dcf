//! Batched analysis of candidate photos followed by scoring and partitioning.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::analyzer::PhotoAnalyzer;
use crate::scoring::{combined_score, partition, ScoringConfig};
use crate::types::{PhotoCandidate, PhotoSelection};
use crate::urls::dedup_candidates;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Analyses issued concurrently per batch.
    pub batch_size: usize,
    /// Pause between consecutive batches.
    pub batch_pause: Duration,
    /// Default upper bound on candidates analyzed per call.
    pub max_to_consider: usize,
    /// Candidates analyzed by [`PhotoPipeline::best_hero_only`].
    pub hero_only_candidates: usize,
    pub scoring: ScoringConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_pause: Duration::from_secs(1),
            max_to_consider: 8,
            hero_only_candidates: 4,
            scoring: ScoringConfig::default(),
        }
    }
}

/// Runs candidate URLs through an analyzer and ranks the results.
pub struct PhotoPipeline {
    analyzer: Arc<dyn PhotoAnalyzer>,
    config: PipelineConfig,
}

impl PhotoPipeline {
    #[must_use]
    pub fn new(analyzer: Arc<dyn PhotoAnalyzer>, config: PipelineConfig) -> Self {
        Self { analyzer, config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyzes up to `max_to_consider` deduplicated candidates and
    /// partitions the ones that analyzed successfully.
    ///
    /// Failed analyses are logged and dropped; they never appear in any
    /// partition. An empty input yields an empty selection without calling
    /// the analyzer.
    pub async fn select_photos(&self, urls: &[String], max_to_consider: usize) -> PhotoSelection {
        let mut candidates = dedup_candidates(urls);
        candidates.truncate(max_to_consider);
        if candidates.is_empty() {
            return PhotoSelection::default();
        }

        let batch_size = self.config.batch_size.max(1);
        let total_batches = candidates.len().div_ceil(batch_size);
        let mut analyzed: Vec<PhotoCandidate> = Vec::with_capacity(candidates.len());

        for (batch_idx, batch) in candidates.chunks(batch_size).enumerate() {
            if batch_idx > 0 && !self.config.batch_pause.is_zero() {
                tokio::time::sleep(self.config.batch_pause).await;
            }

            let results = join_all(batch.iter().map(|url| self.analyzer.analyze(url))).await;

            for (url, result) in batch.iter().zip(results) {
                match result {
                    Ok(analysis) => {
                        let score = combined_score(&analysis, &self.config.scoring);
                        analyzed.push(PhotoCandidate {
                            url: url.clone(),
                            analysis,
                            score,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "photo analysis failed; dropping candidate");
                    }
                }
            }

            tracing::debug!(
                batch = batch_idx + 1,
                total_batches,
                analyzed = analyzed.len(),
                "photo batch analyzed"
            );
        }

        let selection = partition(analyzed, &self.config.scoring);
        tracing::info!(
            considered = candidates.len(),
            analyzed = selection.analyzed_count(),
            gallery = selection.gallery.len(),
            has_hero = selection.hero.is_some(),
            "photo selection complete"
        );
        selection
    }

    /// Picks a hero from a small candidate set.
    ///
    /// Falls back to the first raw URL when nothing analyzes successfully;
    /// returns `None` only for an empty input.
    pub async fn best_hero_only(&self, urls: &[String]) -> Option<String> {
        let selection = self
            .select_photos(urls, self.config.hero_only_candidates)
            .await;
        selection
            .hero
            .map(|c| c.url)
            .or_else(|| urls.first().cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tablescout_core::PhotoSubject;

    use super::*;
    use crate::error::PhotoError;
    use crate::types::{PhotoAnalysis, Recommendation};

    struct FakeAnalyzer {
        answers: HashMap<String, PhotoAnalysis>,
        calls: AtomicUsize,
    }

    impl FakeAnalyzer {
        fn new(answers: Vec<(&str, PhotoAnalysis)>) -> Self {
            Self {
                answers: answers
                    .into_iter()
                    .map(|(u, a)| (u.to_string(), a))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PhotoAnalyzer for FakeAnalyzer {
        async fn analyze(&self, image_url: &str) -> Result<PhotoAnalysis, PhotoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .get(image_url)
                .cloned()
                .ok_or_else(|| PhotoError::InvalidResponse(format!("no answer for {image_url}")))
        }
    }

    fn analysis(
        subject: PhotoSubject,
        quality: f64,
        appeal: f64,
        recommendation: Recommendation,
    ) -> PhotoAnalysis {
        PhotoAnalysis {
            subject,
            quality,
            appeal,
            recommendation,
            description: String::new(),
        }
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            batch_pause: Duration::ZERO,
            ..PipelineConfig::default()
        }
    }

    fn url(name: &str) -> String {
        format!("https://cdn.example.com/{name}.jpg")
    }

    #[tokio::test]
    async fn failed_analysis_is_absent_from_every_partition() {
        let fake = Arc::new(FakeAnalyzer::new(vec![
            (
                "https://cdn.example.com/food.jpg",
                analysis(PhotoSubject::Food, 9.0, 9.0, Recommendation::Hero),
            ),
            (
                "https://cdn.example.com/room.jpg",
                analysis(PhotoSubject::Ambiance, 6.0, 6.0, Recommendation::Gallery),
            ),
        ]));
        let pipeline = PhotoPipeline::new(fake.clone(), fast_config());

        let selection = pipeline
            .select_photos(&[url("food"), url("broken"), url("room")], 8)
            .await;

        assert_eq!(fake.calls.load(Ordering::SeqCst), 3);
        assert_eq!(selection.analyzed_count(), 2);
        let all: Vec<&str> = selection
            .selected()
            .chain(selection.skipped.iter())
            .map(|c| c.url.as_str())
            .collect();
        assert!(!all.contains(&"https://cdn.example.com/broken.jpg"));
        assert_eq!(
            selection.hero.map(|c| c.url),
            Some("https://cdn.example.com/food.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn respects_max_to_consider_and_dedups() {
        let fake = Arc::new(FakeAnalyzer::new(vec![]));
        let pipeline = PhotoPipeline::new(fake.clone(), fast_config());
        let urls = vec![url("a"), url("a"), url("b"), url("c"), url("d")];

        let selection = pipeline.select_photos(&urls, 2).await;

        assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
        assert_eq!(selection, PhotoSelection::default());
    }

    #[tokio::test]
    async fn empty_input_never_calls_analyzer() {
        let fake = Arc::new(FakeAnalyzer::new(vec![]));
        let pipeline = PhotoPipeline::new(fake.clone(), fast_config());
        let selection = pipeline.select_photos(&[], 8).await;
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
        assert_eq!(selection, PhotoSelection::default());
    }

    #[tokio::test]
    async fn best_hero_only_returns_hero_url() {
        let fake = Arc::new(FakeAnalyzer::new(vec![
            (
                "https://cdn.example.com/outside.jpg",
                analysis(PhotoSubject::Exterior, 7.0, 7.0, Recommendation::Gallery),
            ),
            (
                "https://cdn.example.com/plate.jpg",
                analysis(PhotoSubject::Food, 7.0, 7.0, Recommendation::Gallery),
            ),
        ]));
        let pipeline = PhotoPipeline::new(fake, fast_config());
        let hero = pipeline
            .best_hero_only(&[url("outside"), url("plate")])
            .await;
        assert_eq!(hero.as_deref(), Some("https://cdn.example.com/plate.jpg"));
    }

    #[tokio::test]
    async fn best_hero_only_falls_back_to_first_raw_url() {
        let fake = Arc::new(FakeAnalyzer::new(vec![]));
        let pipeline = PhotoPipeline::new(fake, fast_config());
        let hero = pipeline.best_hero_only(&[url("x"), url("y")]).await;
        assert_eq!(hero.as_deref(), Some("https://cdn.example.com/x.jpg"));
        assert!(pipeline.best_hero_only(&[]).await.is_none());
    }

    #[tokio::test]
    async fn best_hero_only_limits_candidates() {
        let fake = Arc::new(FakeAnalyzer::new(vec![]));
        let pipeline = PhotoPipeline::new(fake.clone(), fast_config());
        let urls: Vec<String> = (0..10).map(|i| url(&format!("p{i}"))).collect();
        let _ = pipeline.best_hero_only(&urls).await;
        assert_eq!(fake.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn pauses_between_batches() {
        let fake = Arc::new(FakeAnalyzer::new(vec![]));
        let config = PipelineConfig {
            batch_size: 2,
            batch_pause: Duration::from_millis(40),
            ..PipelineConfig::default()
        };
        let pipeline = PhotoPipeline::new(fake, config);
        let urls: Vec<String> = (0..5).map(|i| url(&format!("p{i}"))).collect();

        let start = std::time::Instant::now();
        let _ = pipeline.select_photos(&urls, 8).await;
        // Three batches, two pauses.
        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
