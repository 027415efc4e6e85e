use std::{collections::HashSet, sync::atomic::{AtomicU64, Ordering}};

use ahash::RandomState;
use dashmap::DashMap;

use crate::TermFrequency;

/// keep document count and per-term document / collection frequency
/// in a thread-safe way, so documents can be added from a rayon pool
#[derive(Debug, Default)]
pub struct Corpus {
    /// number of documents added
    pub doc_num: AtomicU64,
    /// number of token occurrences added
    pub token_num: AtomicU64,
    /// term -> number of documents containing it
    pub doc_freq: DashMap<Box<str>, u64, RandomState>,
    /// term -> number of occurrences
    pub coll_freq: DashMap<Box<str>, u64, RandomState>,
}

impl Clone for Corpus {
    fn clone(&self) -> Self {
        Self {
            doc_num: AtomicU64::new(self.doc_num.load(Ordering::Acquire)),
            token_num: AtomicU64::new(self.token_num.load(Ordering::Acquire)),
            doc_freq: self.doc_freq.clone(),
            coll_freq: self.coll_freq.clone(),
        }
    }
}

impl Corpus {
    /// Create a new instance
    pub fn new() -> Self {
        Self {
            doc_num: AtomicU64::new(0),
            token_num: AtomicU64::new(0),
            doc_freq: DashMap::with_hasher(RandomState::new()),
            coll_freq: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Add one document's tokens
    /// a repeated token counts once for the document frequency
    pub fn add_document<T>(&self, tokens: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num.fetch_add(1, Ordering::Relaxed);
        self.token_num.fetch_add(tokens.len() as u64, Ordering::Relaxed);

        let mut seen: HashSet<&str, RandomState> = HashSet::with_hasher(RandomState::new());
        for token in tokens {
            let token = token.as_ref();
            self.coll_freq
                .entry(token.into())
                .and_modify(|count| *count += 1)
                .or_insert(1);
            if seen.insert(token) {
                self.doc_freq
                    .entry(token.into())
                    .and_modify(|count| *count += 1)
                    .or_insert(1);
            }
        }
    }

    /// Get the number of documents in the corpus
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num.load(Ordering::Relaxed)
    }

    /// Get the number of token occurrences in the corpus
    pub fn get_token_num(&self) -> u64 {
        self.token_num.load(Ordering::Relaxed)
    }

    /// Number of documents containing `term`
    pub fn get_doc_freq(&self, term: &str) -> u64 {
        self.doc_freq.get(term).map_or(0, |count| *count)
    }

    /// Number of occurrences of `term`
    pub fn get_coll_freq(&self, term: &str) -> u64 {
        self.coll_freq.get(term).map_or(0, |count| *count)
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.doc_freq.len()
    }

    /// Merge another corpus into self
    pub fn merge_corpus(&self, other: &Corpus) {
        for (src, dst) in [(&other.doc_freq, &self.doc_freq), (&other.coll_freq, &self.coll_freq)] {
            for entry in src.iter() {
                let count_other = *entry.value();
                dst.entry(entry.key().clone())
                    .and_modify(|count| *count += count_other)
                    .or_insert(count_other);
            }
        }
        self.doc_num
            .fetch_add(other.doc_num.load(Ordering::Relaxed), Ordering::Relaxed);
        self.token_num
            .fetch_add(other.token_num.load(Ordering::Relaxed), Ordering::Relaxed);
    }
}

/// collection frequencies as a term table
impl From<&Corpus> for TermFrequency {
    fn from(corpus: &Corpus) -> Self {
        let mut tf = TermFrequency::new();
        for entry in corpus.coll_freq.iter() {
            tf.set_term_count(entry.key(), *entry.value());
        }
        tf
    }
}
