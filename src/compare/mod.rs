pub mod stats;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{aggregate::TopicScoreMatrix, config::ComparisonConfig};

pub use stats::{ttest_ind, TTest};

/// Result of comparing one topic column between two groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComparisonOutcome {
    Tested {
        statistic: f64,
        pvalue: f64,
        /// the groups' means cannot be told apart at the configured alpha
        indistinguishable: bool,
    },
    /// a group had fewer than 2 present values
    InsufficientSamples { a: usize, b: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicComparison {
    pub topic: String,
    pub outcome: ComparisonOutcome,
}

/// Per-topic comparison of two groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub group_a: String,
    pub group_b: String,
    pub alpha: f64,
    pub topics: Vec<TopicComparison>,
}

impl ComparisonReport {
    pub fn get(&self, topic: &str) -> Option<&ComparisonOutcome> {
        self.topics.iter().find(|t| t.topic == topic).map(|t| &t.outcome)
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .topics
            .iter()
            .map(|t| t.topic.len())
            .chain(std::iter::once("topic".len()))
            .max()
            .unwrap_or(5);
        writeln!(f, "{} vs {} (alpha = {})", self.group_a, self.group_b, self.alpha)?;
        writeln!(f, "{:<width$}  {:>12}  {:>10}  same opinion?", "topic", "t-statistic", "p-value")?;
        for t in &self.topics {
            match &t.outcome {
                ComparisonOutcome::Tested {
                    statistic,
                    pvalue,
                    indistinguishable,
                } => writeln!(
                    f,
                    "{:<width$}  {:>12.4}  {:>10.4}  {}",
                    t.topic,
                    statistic,
                    pvalue,
                    if *indistinguishable { "yes" } else { "no" }
                )?,
                ComparisonOutcome::InsufficientSamples { a, b } => writeln!(
                    f,
                    "{:<width$}  {:>12}  {:>10}  insufficient samples ({a}/{b})",
                    t.topic, "-", "-"
                )?,
            }
        }
        Ok(())
    }
}

/// Two-group hypothesis tester over a topic score matrix
#[derive(Debug, Clone, PartialEq)]
pub struct GroupComparator {
    alpha: f64,
    equal_var: bool,
}

impl Default for GroupComparator {
    fn default() -> Self {
        Self::from_config(&ComparisonConfig::default())
    }
}

impl GroupComparator {
    pub fn new(alpha: f64, equal_var: bool) -> Self {
        Self { alpha, equal_var }
    }

    pub fn from_config(config: &ComparisonConfig) -> Self {
        Self::new(config.alpha, config.equal_var)
    }

    /// Compare every topic column of `matrix` between two group labels
    ///
    /// Missing cells are dropped per group before testing.
    pub fn compare(&self, matrix: &TopicScoreMatrix, group_a: &str, group_b: &str) -> ComparisonReport {
        let topics = matrix
            .topics()
            .iter()
            .enumerate()
            .map(|(col, topic)| {
                let a = matrix.group_values(col, group_a);
                let b = matrix.group_values(col, group_b);
                let outcome = match ttest_ind(&a, &b, self.equal_var) {
                    Some(test) => ComparisonOutcome::Tested {
                        statistic: test.statistic,
                        pvalue: test.pvalue,
                        indistinguishable: test.pvalue > self.alpha,
                    },
                    None => ComparisonOutcome::InsufficientSamples { a: a.len(), b: b.len() },
                };
                debug!(topic = %topic, a = a.len(), b = b.len(), ?outcome, "topic compared");
                TopicComparison {
                    topic: topic.clone(),
                    outcome,
                }
            })
            .collect();
        info!(group_a, group_b, "groups compared");
        ComparisonReport {
            group_a: group_a.to_string(),
            group_b: group_b.to_string(),
            alpha: self.alpha,
            topics,
        }
    }
}
