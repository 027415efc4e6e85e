use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{AnnotateError, Result};

/// Pipeline configuration
/// Every field has a default, so a partial JSON document is enough.
///
/// # Examples
/// ```
/// use topic_sentiment::config::PipelineConfig;
/// let config = PipelineConfig::from_json_str(r#"{ "vocabulary": { "no_below": 2 } }"#).unwrap();
/// assert_eq!(config.vocabulary.no_below, 2);
/// assert_eq!(config.vocabulary.no_above, 0.5);
/// assert_eq!(config.collocation.min_count, 15);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tokenizer: TokenizerConfig,
    pub collocation: CollocationConfig,
    pub vocabulary: VocabularyConfig,
    pub lexicon: LexiconConfig,
    pub assignment: AssignmentConfig,
    pub comparison: ComparisonConfig,
    pub reduction: ReductionConfig,
    pub lda: LdaConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// lemmas shorter than this are dropped
    pub min_token_len: usize,
    /// added on top of the English stopword list
    pub extra_stopwords: Vec<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            extra_stopwords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollocationConfig {
    /// minimum joint occurrence count of an adjacent pair
    pub min_count: u64,
    /// optional phrase-score threshold, see `Phrases`
    pub threshold: Option<f64>,
    /// joins the two halves of a collocation
    pub delimiter: String,
}

impl Default for CollocationConfig {
    fn default() -> Self {
        Self {
            min_count: 15,
            threshold: None,
            delimiter: "_".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// minimum document frequency (absolute)
    pub no_below: u64,
    /// maximum document frequency (fraction of the corpus)
    pub no_above: f64,
    /// keep at most this many of the most frequent terms
    pub keep_n: Option<usize>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            no_below: 5,
            no_above: 0.5,
            keep_n: Some(100_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// target size of every expanded topic lexicon
    pub size: usize,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self { size: 500 }
    }
}

/// How tokens contribute to a topic score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// every lexicon hit counts 1
    #[default]
    Count,
    /// every lexicon hit counts its association weight
    Association,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// a topic is assigned when its score is strictly above this
    pub threshold: f64,
    pub weighting: Weighting,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            weighting: Weighting::Count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// significance level
    pub alpha: f64,
    /// Student's pooled test when true, Welch's test otherwise
    pub equal_var: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            equal_var: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    pub n_components: usize,
    /// standardize columns before PCA
    pub standardize: bool,
    /// power iterations of the randomized SVD
    pub n_iter: usize,
    /// seed of the random projection
    pub seed: u64,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            n_components: 2,
            standardize: false,
            n_iter: 10,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdaConfig {
    /// number of latent topics
    pub n_topics: usize,
    /// document-topic prior, `1 / n_topics` when unset
    pub alpha: Option<f64>,
    /// topic-term prior, `1 / n_topics` when unset
    pub eta: Option<f64>,
    /// Gibbs sweeps over the corpus
    pub n_iter: usize,
    /// seed of the topic initialization and sampling
    pub seed: u64,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            n_topics: 100,
            alpha: None,
            eta: None,
            n_iter: 200,
            seed: 0,
        }
    }
}

impl LdaConfig {
    /// Effective `(alpha, eta)` priors
    pub fn priors(&self) -> (f64, f64) {
        let symmetric = 1.0 / self.n_topics.max(1) as f64;
        (self.alpha.unwrap_or(symmetric), self.eta.unwrap_or(symmetric))
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_topics == 0 {
            return Err(invalid("lda.n_topics", "must be at least 1"));
        }
        let (alpha, eta) = self.priors();
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(invalid("lda.alpha", "must be positive"));
        }
        if !(eta.is_finite() && eta > 0.0) {
            return Err(invalid("lda.eta", "must be positive"));
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Parse a JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values outside their meaningful range
    pub fn validate(&self) -> Result<()> {
        if self.tokenizer.min_token_len == 0 {
            return Err(invalid("tokenizer.min_token_len", "must be at least 1"));
        }
        if self.collocation.min_count == 0 {
            return Err(invalid("collocation.min_count", "must be at least 1"));
        }
        if self.collocation.delimiter.is_empty() {
            return Err(invalid("collocation.delimiter", "must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.vocabulary.no_above) {
            return Err(invalid("vocabulary.no_above", "must be within [0, 1]"));
        }
        if self.lexicon.size == 0 {
            return Err(invalid("lexicon.size", "must be at least 1"));
        }
        if !self.assignment.threshold.is_finite() {
            return Err(invalid("assignment.threshold", "must be finite"));
        }
        if !(self.comparison.alpha > 0.0 && self.comparison.alpha < 1.0) {
            return Err(invalid("comparison.alpha", "must be within (0, 1)"));
        }
        if self.reduction.n_components == 0 {
            return Err(invalid("reduction.n_components", "must be at least 1"));
        }
        self.lda.validate()
    }
}

fn invalid(name: &'static str, reason: &str) -> AnnotateError {
    AnnotateError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.tokenizer.min_token_len, 3);
        assert_eq!(config.collocation.min_count, 15);
        assert_eq!(config.vocabulary.no_below, 5);
        assert_eq!(config.vocabulary.keep_n, Some(100_000));
        assert_eq!(config.lexicon.size, 500);
        assert_eq!(config.assignment.threshold, 0.0);
        assert_eq!(config.comparison.alpha, 0.05);
        assert_eq!(config.reduction.n_components, 2);
        assert_eq!(config.lda.n_topics, 100);
        assert_eq!(config.lda.priors(), (0.01, 0.01));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "assignment": { "weighting": "association" }, "reduction": { "standardize": true } }"#,
        )
        .unwrap();
        assert_eq!(config.assignment.weighting, Weighting::Association);
        assert_eq!(config.assignment.threshold, 0.0);
        assert!(config.reduction.standardize);
        assert_eq!(config.reduction.n_iter, 10);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = PipelineConfig::from_json_str(r#"{ "vocabulary": { "no_above": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, AnnotateError::InvalidParameter { name: "vocabulary.no_above", .. }));

        let err = PipelineConfig::from_json_str(r#"{ "comparison": { "alpha": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, AnnotateError::InvalidParameter { name: "comparison.alpha", .. }));

        let err = PipelineConfig::from_json_str(r#"{ "lda": { "eta": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, AnnotateError::InvalidParameter { name: "lda.eta", .. }));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = PipelineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, AnnotateError::Config(_)));
    }
}
