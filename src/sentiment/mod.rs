pub mod analyzer;
pub mod lexicon;

use serde::{Deserialize, Serialize};

/// Polarity breakdown of one text
/// `neg + neu + pos` is 1 up to rounding, `compound` is in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// Sentiment scoring service
///
/// Implementations are explicitly constructed, immutable and shared across the
/// scoring worker pool.
pub trait PolarityScorer: Send + Sync {
    fn polarity_scores(&self, text: &str) -> PolarityScores;

    /// Compound polarity in [-1, 1], 0.0 for empty text
    fn compound(&self, text: &str) -> f64 {
        self.polarity_scores(text).compound
    }
}
