use std::collections::BTreeSet;

use crate::{
    config::{AssignmentConfig, Weighting},
    topic::lexicon::LexiconSet,
};

/// Assigns topics to a token sequence
///
/// The score of a topic is the sum over the tokens found in its lexicon of the
/// token weight (1 per occurrence with `Weighting::Count`, the association
/// weight with `Weighting::Association`). A topic is assigned when its score is
/// strictly above the threshold.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use topic_sentiment::{config::AssignmentConfig, EmbeddingModel, LexiconExpander, TopicAssigner, TopicCatalog};
///
/// let model = EmbeddingModel::from_vectors(vec![("tax", vec![1.0, 0.0]), ("coal", vec![0.0, 1.0])]).unwrap();
/// let catalog = TopicCatalog::new().with_topic("tax", ["tax"]).with_topic("coal", ["coal"]);
/// let lexicons = LexiconExpander::new(Arc::new(model), 1).expand_catalog(&catalog).unwrap();
///
/// let assigner = TopicAssigner::new(&lexicons, &AssignmentConfig::default());
/// let topics = assigner.assign(&["coal", "mine"]);
/// assert_eq!(topics.into_iter().collect::<Vec<_>>(), vec!["coal"]);
/// ```
#[derive(Debug, Clone)]
pub struct TopicAssigner<'a> {
    lexicons: &'a LexiconSet,
    threshold: f64,
    weighting: Weighting,
}

impl<'a> TopicAssigner<'a> {
    pub fn new(lexicons: &'a LexiconSet, config: &AssignmentConfig) -> Self {
        Self {
            lexicons,
            threshold: config.threshold,
            weighting: config.weighting,
        }
    }

    /// Score of every topic, in lexicon-set order
    pub fn scores<S>(&self, tokens: &[S]) -> Vec<(&'a str, f64)>
    where
        S: AsRef<str>,
    {
        self.lexicons
            .iter()
            .map(|lexicon| {
                let score = tokens
                    .iter()
                    .filter_map(|t| lexicon.weight(t.as_ref()))
                    .map(|w| match self.weighting {
                        Weighting::Count => 1.0,
                        Weighting::Association => w as f64,
                    })
                    .sum::<f64>();
                (lexicon.topic.as_str(), score)
            })
            .collect()
    }

    /// Topics whose score is above the threshold
    pub fn assign<S>(&self, tokens: &[S]) -> BTreeSet<String>
    where
        S: AsRef<str>,
    {
        self.scores(tokens)
            .into_iter()
            .filter(|&(_, score)| score > self.threshold)
            .map(|(topic, _)| topic.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::topic::{catalog::TopicCatalog, embedding::EmbeddingModel, lexicon::LexiconExpander};

    fn lexicons() -> LexiconSet {
        let model = EmbeddingModel::from_vectors(vec![
            ("border", vec![1.0, 0.0]),
            ("wall", vec![0.9, 0.1]),
            ("health", vec![0.0, 1.0]),
            ("insurance", vec![0.1, 0.9]),
        ])
        .unwrap();
        let catalog = TopicCatalog::new()
            .with_topic("immigration", ["border"])
            .with_topic("healthcare", ["health"]);
        LexiconExpander::new(Arc::new(model), 2).expand_catalog(&catalog).unwrap()
    }

    #[test]
    fn any_hit_assigns_by_default() {
        let lexicons = lexicons();
        let assigner = TopicAssigner::new(&lexicons, &AssignmentConfig::default());
        let topics = assigner.assign(&["need", "wall", "fund"]);
        assert_eq!(topics.into_iter().collect::<Vec<_>>(), vec!["immigration"]);
        assert!(assigner.assign(&["tax"]).is_empty());
        assert!(assigner.assign::<&str>(&[]).is_empty());
    }

    #[test]
    fn threshold_is_strict_and_tunable() {
        let lexicons = lexicons();
        let config = AssignmentConfig {
            threshold: 1.0,
            ..Default::default()
        };
        let assigner = TopicAssigner::new(&lexicons, &config);
        assert!(assigner.assign(&["wall"]).is_empty());
        assert_eq!(assigner.assign(&["wall", "border", "health"]).len(), 1);
    }

    #[test]
    fn association_weighting_uses_model_scores() {
        let lexicons = lexicons();
        let config = AssignmentConfig {
            threshold: 0.0,
            weighting: Weighting::Association,
        };
        let assigner = TopicAssigner::new(&lexicons, &config);
        let scores = assigner.scores(&["border", "wall"]);
        let wall = lexicons.get("immigration").unwrap().weight("wall").unwrap() as f64;
        assert_eq!(scores[0].0, "immigration");
        assert!((scores[0].1 - (1.0 + wall)).abs() < 1e-9);
        assert_eq!(scores[1].1, 0.0);
    }
}
