use std::collections::HashMap;

use ahash::RandomState;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{config::CollocationConfig, utils::persist::Persist, TermFrequency};

type PairCounts = HashMap<(String, String), u64, RandomState>;

/// Two-word collocation detector
///
/// Fitted once over the whole token corpus (a barrier), then applied to any
/// token sequence, including documents that were not part of the fit.
///
/// A pair of adjacent tokens `(a, b)` is a collocation when it occurs at least
/// `min_count` times. With a `threshold` the pair must also satisfy
/// `(count_ab - min_count) / (count_a * count_b) * |vocab| > threshold`,
/// where `|vocab|` is the number of distinct unigrams and pairs.
///
/// # Examples
/// ```
/// use topic_sentiment::{config::CollocationConfig, vectorizer::collocation::Phrases};
/// let docs = vec![
///     vec!["new", "york", "city"],
///     vec!["new", "york", "state"],
///     vec!["new", "idea"],
/// ];
/// let config = CollocationConfig { min_count: 2, ..Default::default() };
/// let phrases = Phrases::fit(&docs, &config);
/// assert_eq!(phrases.augment(&["visit", "new", "york"]), vec!["visit", "new", "york", "new_york"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrases {
    /// joined phrase -> joint count, in dictionary order
    #[serde(with = "indexmap::map::serde_seq")]
    phrases: IndexMap<String, u64>,
    delimiter: String,
    min_count: u64,
    threshold: Option<f64>,
}

impl Persist for Phrases {}

impl Phrases {
    /// Count unigrams and adjacent pairs over the corpus and keep the collocations
    ///
    /// # Arguments
    /// * `docs` - token sequences
    /// * `config` - `min_count`, optional `threshold`, `delimiter`
    pub fn fit<D, S>(docs: &[D], config: &CollocationConfig) -> Self
    where
        D: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        let (unigrams, pairs) = docs
            .par_iter()
            .fold(
                || (TermFrequency::new(), PairCounts::default()),
                |(mut unigrams, mut pairs), doc| {
                    let doc = doc.as_ref();
                    unigrams.add_terms(doc);
                    for window in doc.windows(2) {
                        let key = (window[0].as_ref().to_string(), window[1].as_ref().to_string());
                        *pairs.entry(key).or_insert(0) += 1;
                    }
                    (unigrams, pairs)
                },
            )
            .reduce(
                || (TermFrequency::new(), PairCounts::default()),
                |(mut unigrams, mut pairs), (other_unigrams, other_pairs)| {
                    unigrams.add_terms_from_freq(&other_unigrams);
                    for (key, count) in other_pairs {
                        *pairs.entry(key).or_insert(0) += count;
                    }
                    (unigrams, pairs)
                },
            );

        let vocab_len = (unigrams.term_num() + pairs.len()) as f64;
        let mut phrases: IndexMap<String, u64> = pairs
            .into_iter()
            .filter(|((a, b), count)| {
                if *count < config.min_count {
                    return false;
                }
                match config.threshold {
                    None => true,
                    Some(threshold) => {
                        let denom = (unigrams.term_count(a) * unigrams.term_count(b)) as f64;
                        let score = (*count - config.min_count) as f64 / denom * vocab_len;
                        score > threshold
                    }
                }
            })
            .map(|((a, b), count)| (format!("{a}{}{b}", config.delimiter), count))
            .collect();
        phrases.sort_keys();

        info!(
            documents = docs.len(),
            unigrams = unigrams.term_num(),
            collocations = phrases.len(),
            "collocations fitted"
        );

        Self {
            phrases,
            delimiter: config.delimiter.clone(),
            min_count: config.min_count,
            threshold: config.threshold,
        }
    }

    /// Original tokens followed by the recognized collocations
    ///
    /// Pairs are matched left to right without overlap, so `a b c` with both
    /// `a_b` and `b_c` known yields only `a_b`.
    pub fn augment<S>(&self, tokens: &[S]) -> Vec<String>
    where
        S: AsRef<str>,
    {
        let mut out: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        let mut key = String::new();
        let mut i = 0;
        while i + 1 < tokens.len() {
            key.clear();
            key.push_str(tokens[i].as_ref());
            key.push_str(&self.delimiter);
            key.push_str(tokens[i + 1].as_ref());
            if self.phrases.contains_key(key.as_str()) {
                out.push(key.clone());
                i += 2;
            } else {
                i += 1;
            }
        }
        out
    }

    /// `augment` over a whole corpus, in parallel
    pub fn augment_corpus<D, S>(&self, docs: &[D]) -> Vec<Vec<String>>
    where
        D: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        docs.par_iter().map(|doc| self.augment(doc.as_ref())).collect()
    }

    pub fn contains(&self, first: &str, second: &str) -> bool {
        self.phrases
            .contains_key(format!("{first}{}{second}", self.delimiter).as_str())
    }

    /// Joint count of a known collocation
    pub fn count(&self, phrase: &str) -> Option<u64> {
        self.phrases.get(phrase).copied()
    }

    /// Known collocations in dictionary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.phrases.iter().map(|(p, &c)| (p.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn min_count(&self) -> u64 {
        self.min_count
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }
}
