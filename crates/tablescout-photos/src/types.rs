use serde::{Deserialize, Serialize};
use tablescout_core::PhotoSubject;

/// Tier assigned by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Hero,
    Gallery,
    Skip,
}

impl Recommendation {
    /// Lenient label parsing; anything unrecognized is `Gallery`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let lower = label.trim().to_ascii_lowercase();
        if lower.starts_with("hero") {
            Recommendation::Hero
        } else if lower.starts_with("skip") || lower == "reject" {
            Recommendation::Skip
        } else {
            Recommendation::Gallery
        }
    }
}

/// Per-image analysis result. Scores are on a 1–10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAnalysis {
    pub subject: PhotoSubject,
    pub quality: f64,
    pub appeal: f64,
    pub recommendation: Recommendation,
    /// Short description, used as alt text when non-empty.
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoCandidate {
    pub url: String,
    pub analysis: PhotoAnalysis,
    pub score: f64,
}

/// Partition of successfully analyzed candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoSelection {
    pub hero: Option<PhotoCandidate>,
    pub gallery: Vec<PhotoCandidate>,
    pub skipped: Vec<PhotoCandidate>,
}

impl PhotoSelection {
    /// Number of candidates that were analyzed successfully.
    #[must_use]
    pub fn analyzed_count(&self) -> usize {
        usize::from(self.hero.is_some()) + self.gallery.len() + self.skipped.len()
    }

    /// Hero first, then gallery in rank order.
    pub fn selected(&self) -> impl Iterator<Item = &PhotoCandidate> {
        self.hero.iter().chain(self.gallery.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_labels_are_lenient() {
        assert_eq!(Recommendation::from_label("hero-worthy"), Recommendation::Hero);
        assert_eq!(Recommendation::from_label(" SKIP "), Recommendation::Skip);
        assert_eq!(
            Recommendation::from_label("gallery-worthy"),
            Recommendation::Gallery
        );
        assert_eq!(Recommendation::from_label("maybe"), Recommendation::Gallery);
    }
}
