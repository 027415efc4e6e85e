use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::text::StopWords;

/// TermFrequency struct
/// Manages the frequency of term occurrences in a group of documents.
///
/// # Examples
/// ```
/// use topic_sentiment::TermFrequency;
/// let mut term_freq = TermFrequency::new();
/// term_freq.add_terms(&["wall", "border", "wall"]);
///
/// assert_eq!(term_freq.term_count("wall"), 2);
/// assert_eq!(term_freq.term_sum(), 3);
/// assert_eq!(term_freq.most_frequent(1), vec![("wall".to_string(), 2)]);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    term_count: HashMap<String, u64, RandomState>,
    total_term_count: u64,
}

/// Implementation for adding and removing terms
impl TermFrequency {
    /// Create a new TermFrequency
    pub fn new() -> Self {
        TermFrequency {
            term_count: HashMap::with_hasher(RandomState::new()),
            total_term_count: 0,
        }
    }

    /// Add a term
    ///
    /// # Arguments
    /// * `term` - term to add
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        match self.term_count.get_mut(term) {
            Some(count) => *count += 1,
            None => {
                self.term_count.insert(term.to_string(), 1);
            }
        }
        self.total_term_count += 1;
        self
    }

    /// Add multiple terms
    ///
    /// # Arguments
    /// * `terms` - Slice of terms to add
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    /// Set the occurrence count for a term
    /// a count of 0 removes the term
    ///
    /// # Arguments
    /// * `term` - term
    /// * `count` - Occurrence count
    pub fn set_term_count(&mut self, term: &str, count: u64) -> &mut Self {
        let previous = if count == 0 {
            self.term_count.remove(term).unwrap_or(0)
        } else {
            self.term_count.insert(term.to_string(), count).unwrap_or(0)
        };
        self.total_term_count = self.total_term_count - previous + count;
        self
    }

    /// Merge with another TermFrequency
    ///
    /// # Arguments
    /// * `other` - Another TermFrequency to merge with
    pub fn add_terms_from_freq(&mut self, other: &TermFrequency) -> &mut Self {
        for (term, &count) in &other.term_count {
            *self.term_count.entry(term.clone()).or_insert(0) += count;
            self.total_term_count += count;
        }
        self
    }

    /// Remove stop terms
    ///
    /// # Arguments
    /// * `stop_words` - terms to remove
    ///
    /// # Returns
    /// * `u64` - Total count of removed terms
    pub fn remove_stop_terms(&mut self, stop_words: &StopWords) -> u64 {
        self.remove_terms_by(|term, _| stop_words.contains(term))
    }

    /// Remove terms by a condition
    ///
    /// # Arguments
    /// * `condition` - Closure to determine which terms to remove
    ///
    /// # Returns
    /// * `u64` - Total count of removed terms
    pub fn remove_terms_by<F>(&mut self, condition: F) -> u64
    where
        F: Fn(&str, u64) -> bool,
    {
        let mut removed_total_count: u64 = 0;
        self.term_count.retain(|term, count| {
            if condition(term, *count) {
                removed_total_count += *count;
                false
            } else {
                true
            }
        });
        self.total_term_count -= removed_total_count;
        removed_total_count
    }
}

impl<T> From<&[T]> for TermFrequency
where
    T: AsRef<str>,
{
    fn from(terms: &[T]) -> Self {
        let mut tf = TermFrequency::new();
        tf.add_terms(terms);
        tf
    }
}

/// Implementation for retrieving information from TermFrequency
impl TermFrequency {
    /// Iterator over all terms and their counts, in no particular order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.term_count.iter().map(|(term, &count)| (term.as_str(), count))
    }

    /// Get the total count of all terms
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    /// Get the occurrence count for a specific term
    ///
    /// # Arguments
    /// * `term` - term
    ///
    /// # Returns
    /// * `u64` - Occurrence count for the term, 0 if absent
    #[inline]
    pub fn term_count(&self, term: &str) -> u64 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// Get the number of unique terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    /// The `n` most frequent terms, most frequent first
    /// ties are broken by dictionary order, so the result is deterministic
    ///
    /// # Returns
    /// * `Vec<(String, u64)>` - at most `n` terms with their counts
    pub fn most_frequent(&self, n: usize) -> Vec<(String, u64)> {
        let mut term_list: Vec<(&String, u64)> = self.term_count.iter().map(|(term, &count)| (term, count)).collect();
        term_list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        term_list
            .into_iter()
            .take(n)
            .map(|(term, count)| (term.clone(), count))
            .collect()
    }
}
