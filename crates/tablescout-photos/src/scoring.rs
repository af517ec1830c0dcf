//! Combined scoring and hero/gallery/skip partitioning.
//!
//! Pure functions over already-analyzed candidates, so ranking is fully
//! deterministic for a fixed set of scores.

use tablescout_core::PhotoSubject;

use crate::types::{PhotoAnalysis, PhotoCandidate, PhotoSelection, Recommendation};

/// Multipliers and limits applied when ranking analyzed photos.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub food_multiplier: f64,
    pub ambiance_multiplier: f64,
    pub hero_multiplier: f64,
    pub skip_multiplier: f64,
    /// Minimum combined score for a gallery slot.
    pub gallery_floor: f64,
    pub gallery_cap: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            food_multiplier: 1.3,
            ambiance_multiplier: 1.1,
            hero_multiplier: 1.2,
            skip_multiplier: 0.3,
            gallery_floor: 4.0,
            gallery_cap: 5,
        }
    }
}

/// `mean(quality, appeal) × subject multiplier × recommendation multiplier`.
#[must_use]
pub fn combined_score(analysis: &PhotoAnalysis, config: &ScoringConfig) -> f64 {
    let base = (analysis.quality + analysis.appeal) / 2.0;

    let subject_multiplier = match analysis.subject {
        PhotoSubject::Food => config.food_multiplier,
        PhotoSubject::Ambiance => config.ambiance_multiplier,
        PhotoSubject::Exterior | PhotoSubject::People | PhotoSubject::Other => 1.0,
    };

    let recommendation_multiplier = match analysis.recommendation {
        Recommendation::Hero => config.hero_multiplier,
        Recommendation::Skip => config.skip_multiplier,
        Recommendation::Gallery => 1.0,
    };

    base * subject_multiplier * recommendation_multiplier
}

/// Splits scored candidates into hero, gallery, and skipped.
///
/// Candidates are ranked by descending score; equal scores keep their input
/// order. The hero is the best non-skip food photo, or failing that the best
/// non-skip photo of any subject. The gallery then takes remaining
/// candidates while they clear `gallery_floor` and the cap is not reached.
#[must_use]
pub fn partition(candidates: Vec<PhotoCandidate>, config: &ScoringConfig) -> PhotoSelection {
    let mut ranked = candidates;
    // Stable sort: ties keep input order.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let hero_idx = ranked
        .iter()
        .position(|c| {
            c.analysis.subject == PhotoSubject::Food
                && c.analysis.recommendation != Recommendation::Skip
        })
        .or_else(|| {
            ranked
                .iter()
                .position(|c| c.analysis.recommendation != Recommendation::Skip)
        });
    let hero = hero_idx.map(|idx| ranked.remove(idx));

    let mut gallery = Vec::new();
    let mut skipped = Vec::new();
    for candidate in ranked {
        if candidate.score >= config.gallery_floor && gallery.len() < config.gallery_cap {
            gallery.push(candidate);
        } else {
            skipped.push(candidate);
        }
    }

    PhotoSelection {
        hero,
        gallery,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(
        url: &str,
        subject: PhotoSubject,
        quality: f64,
        appeal: f64,
        recommendation: Recommendation,
    ) -> PhotoCandidate {
        let analysis = PhotoAnalysis {
            subject,
            quality,
            appeal,
            recommendation,
            description: String::new(),
        };
        let score = combined_score(&analysis, &ScoringConfig::default());
        PhotoCandidate {
            url: url.to_string(),
            analysis,
            score,
        }
    }

    fn urls(list: &[PhotoCandidate]) -> Vec<&str> {
        list.iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn food_and_hero_multipliers_compound() {
        let c = candidate("a", PhotoSubject::Food, 9.0, 9.0, Recommendation::Hero);
        assert!((c.score - 9.0 * 1.3 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn skip_multiplier_sinks_score() {
        let c = candidate("a", PhotoSubject::Other, 2.0, 2.0, Recommendation::Skip);
        assert!((c.score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn three_tier_scenario_partitions_as_expected() {
        let food = candidate("food", PhotoSubject::Food, 9.0, 9.0, Recommendation::Hero);
        let room = candidate(
            "room",
            PhotoSubject::Ambiance,
            6.0,
            6.0,
            Recommendation::Gallery,
        );
        let blur = candidate("blur", PhotoSubject::Other, 2.0, 2.0, Recommendation::Skip);

        let selection = partition(
            vec![blur.clone(), room.clone(), food.clone()],
            &ScoringConfig::default(),
        );

        assert_eq!(selection.hero.as_ref().map(|c| c.url.as_str()), Some("food"));
        assert_eq!(urls(&selection.gallery), vec!["room"]);
        assert_eq!(urls(&selection.skipped), vec!["blur"]);
        assert!(selection.skipped[0].score < selection.gallery[0].score);
    }

    #[test]
    fn hero_prefers_food_over_higher_scoring_exterior() {
        let exterior = candidate(
            "exterior",
            PhotoSubject::Exterior,
            10.0,
            10.0,
            Recommendation::Hero,
        );
        let food = candidate("food", PhotoSubject::Food, 6.0, 6.0, Recommendation::Gallery);
        let selection = partition(vec![exterior, food], &ScoringConfig::default());
        assert_eq!(selection.hero.as_ref().map(|c| c.url.as_str()), Some("food"));
        assert_eq!(urls(&selection.gallery), vec!["exterior"]);
    }

    #[test]
    fn excellent_non_food_outranks_mediocre_food_in_gallery() {
        let hero = candidate("hero", PhotoSubject::Food, 9.0, 9.0, Recommendation::Hero);
        let people = candidate(
            "people",
            PhotoSubject::People,
            9.0,
            9.0,
            Recommendation::Gallery,
        );
        let meh_food = candidate("meh", PhotoSubject::Food, 5.0, 5.0, Recommendation::Gallery);
        let selection = partition(vec![meh_food, people, hero], &ScoringConfig::default());
        assert_eq!(urls(&selection.gallery), vec!["people", "meh"]);
    }

    #[test]
    fn hero_falls_back_to_best_non_skip_when_no_food() {
        let a = candidate("a", PhotoSubject::Ambiance, 7.0, 7.0, Recommendation::Gallery);
        let b = candidate("b", PhotoSubject::Exterior, 8.0, 8.0, Recommendation::Gallery);
        let selection = partition(vec![a, b], &ScoringConfig::default());
        assert_eq!(selection.hero.as_ref().map(|c| c.url.as_str()), Some("b"));
    }

    #[test]
    fn skipped_food_is_never_hero() {
        let food = candidate("food", PhotoSubject::Food, 10.0, 10.0, Recommendation::Skip);
        let selection = partition(vec![food], &ScoringConfig::default());
        assert!(selection.hero.is_none());
        assert!(selection.gallery.is_empty());
        assert_eq!(urls(&selection.skipped), vec!["food"]);
    }

    #[test]
    fn gallery_never_exceeds_cap() {
        let config = ScoringConfig {
            gallery_cap: 3,
            ..ScoringConfig::default()
        };
        let many: Vec<_> = (0..10)
            .map(|i| {
                candidate(
                    &format!("p{i}"),
                    PhotoSubject::Ambiance,
                    8.0,
                    8.0,
                    Recommendation::Gallery,
                )
            })
            .collect();
        let selection = partition(many, &config);
        assert!(selection.hero.is_some());
        assert_eq!(selection.gallery.len(), 3);
        assert_eq!(selection.skipped.len(), 6);
        assert_eq!(selection.analyzed_count(), 10);
    }

    #[test]
    fn below_floor_candidates_are_skipped() {
        let hero = candidate("hero", PhotoSubject::Food, 8.0, 8.0, Recommendation::Hero);
        let low = candidate("low", PhotoSubject::Other, 3.0, 3.0, Recommendation::Gallery);
        let selection = partition(vec![hero, low], &ScoringConfig::default());
        assert!(selection.gallery.is_empty());
        assert_eq!(urls(&selection.skipped), vec!["low"]);
    }

    #[test]
    fn ties_keep_input_order_and_runs_are_identical() {
        let build = || {
            (0..6)
                .map(|i| {
                    candidate(
                        &format!("t{i}"),
                        PhotoSubject::Ambiance,
                        6.0,
                        6.0,
                        Recommendation::Gallery,
                    )
                })
                .collect::<Vec<_>>()
        };
        let first = partition(build(), &ScoringConfig::default());
        let second = partition(build(), &ScoringConfig::default());
        assert_eq!(first, second);
        assert_eq!(first.hero.as_ref().map(|c| c.url.as_str()), Some("t0"));
        assert_eq!(urls(&first.gallery), vec!["t1", "t2", "t3", "t4", "t5"]);
    }

    #[test]
    fn empty_input_yields_empty_selection() {
        let selection = partition(Vec::new(), &ScoringConfig::default());
        assert_eq!(selection, PhotoSelection::default());
    }
}
