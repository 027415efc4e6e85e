use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Vocabulary;

/// Sparse bag-of-words: `(term id, count)` pairs sorted by id, counts > 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagOfWords {
    pairs: Vec<(u32, u32)>,
}

impl BagOfWords {
    /// Count ids
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for id in ids {
            *counts.entry(id).or_insert(0) += 1;
        }
        Self {
            pairs: counts.into_iter().collect(),
        }
    }

    #[inline]
    pub fn pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    /// Count of one id, 0 if absent
    pub fn count(&self, id: u32) -> u32 {
        self.pairs
            .binary_search_by_key(&id, |&(i, _)| i)
            .map_or(0, |pos| self.pairs[pos].1)
    }

    /// Total number of encoded tokens
    pub fn total(&self) -> u64 {
        self.pairs.iter().map(|&(_, c)| c as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Decode back to the token multiset, in id order
    /// ids unknown to `vocab` are skipped
    pub fn expand(&self, vocab: &Vocabulary) -> Vec<String> {
        self.pairs
            .iter()
            .filter_map(|&(id, count)| vocab.term_of(id).map(|term| (term, count)))
            .flat_map(|(term, count)| std::iter::repeat(term.to_string()).take(count as usize))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VocabularyConfig;

    #[test]
    fn counts_are_sorted_by_id() {
        let bow = BagOfWords::from_ids([5, 1, 5, 3, 5]);
        assert_eq!(bow.pairs(), &[(1, 1), (3, 1), (5, 3)]);
        assert_eq!(bow.count(5), 3);
        assert_eq!(bow.count(2), 0);
        assert_eq!(bow.len(), 3);
    }

    #[test]
    fn expand_restores_in_vocabulary_multiset() {
        let docs = vec![vec!["tax", "coal", "tax"], vec!["coal"]];
        let config = VocabularyConfig {
            no_below: 1,
            no_above: 1.0,
            keep_n: None,
        };
        let vocab = Vocabulary::build(&docs, &config);

        let tokens = ["tax", "unknown", "coal", "tax"];
        let mut expanded = vocab.doc2bow(&tokens).expand(&vocab);
        expanded.sort();
        assert_eq!(expanded, vec!["coal", "tax", "tax"]);
    }
}
