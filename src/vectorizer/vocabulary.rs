use std::collections::BTreeSet;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::VocabularyConfig,
    error::{AnnotateError, Result},
    utils::persist::Persist,
    vectorizer::{bow::BagOfWords, corpus::Corpus},
};

/// Corpus statistics of one vocabulary term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermStats {
    /// number of documents containing the term
    pub doc_freq: u64,
    /// number of occurrences of the term
    pub coll_freq: u64,
}

/// Controlled vocabulary: dense term <-> id mapping with corpus statistics
///
/// The id of a term is its index in the table, ids are `0..len()` without gaps.
/// Immutable once built. It remembers a fingerprint of the token corpus it was
/// built from, and [`Vocabulary::encode_corpus`] refuses any other corpus.
///
/// # Examples
/// ```
/// use topic_sentiment::{config::VocabularyConfig, Vocabulary};
/// let docs = vec![vec!["wall", "border"], vec!["wall", "tax"], vec!["tax"]];
/// let config = VocabularyConfig { no_below: 2, no_above: 1.0, keep_n: None };
/// let vocab = Vocabulary::build(&docs, &config);
/// assert_eq!(vocab.len(), 2);
/// assert_eq!(vocab.term_of(0), Some("wall"));
/// assert_eq!(vocab.id_of("tax"), Some(1));
/// assert_eq!(vocab.doc2bow(&["tax", "tax", "border"]).pairs(), &[(1, 2)]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(with = "indexmap::map::serde_seq")]
    terms: IndexMap<String, TermStats>,
    num_docs: u64,
    fingerprint: u64,
}

impl Persist for Vocabulary {}

impl Vocabulary {
    /// Build the vocabulary and prune rare and overly common terms
    ///
    /// # Arguments
    /// * `docs` - token sequences (after collocation augmentation)
    /// * `config` - `no_below` (absolute), `no_above` (fraction), `keep_n`
    pub fn build<D, S>(docs: &[D], config: &VocabularyConfig) -> Self
    where
        D: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        let corpus = Corpus::new();
        docs.par_iter().for_each(|doc| corpus.add_document(doc.as_ref()));

        // id は並列集計とは別に、文書順 + 文書内の辞書順で決める
        let mut terms: IndexMap<String, TermStats> = IndexMap::new();
        for doc in docs {
            let distinct: BTreeSet<&str> = doc.as_ref().iter().map(|t| t.as_ref()).collect();
            for term in distinct {
                if !terms.contains_key(term) {
                    let stats = TermStats {
                        doc_freq: corpus.get_doc_freq(term),
                        coll_freq: corpus.get_coll_freq(term),
                    };
                    terms.insert(term.to_string(), stats);
                }
            }
        }
        let num_docs = corpus.get_doc_num();
        let before = terms.len();

        let max_df = (config.no_above * num_docs as f64).floor() as u64;
        terms.retain(|_, stats| stats.doc_freq >= config.no_below && stats.doc_freq <= max_df);

        if let Some(keep_n) = config.keep_n {
            if terms.len() > keep_n {
                let mut ranked: Vec<usize> = (0..terms.len()).collect();
                ranked.sort_by(|&a, &b| terms[b].doc_freq.cmp(&terms[a].doc_freq).then(a.cmp(&b)));
                let mut keep = vec![false; terms.len()];
                for &idx in &ranked[..keep_n] {
                    keep[idx] = true;
                }
                let mut idx = 0;
                terms.retain(|_, _| {
                    idx += 1;
                    keep[idx - 1]
                });
            }
        }

        debug!(max_df, no_below = config.no_below, "vocabulary bounds");
        info!(
            documents = num_docs,
            seen = before,
            kept = terms.len(),
            removed = before - terms.len(),
            "vocabulary built"
        );

        Self {
            terms,
            num_docs,
            fingerprint: corpus_fingerprint(docs),
        }
    }

    /// Encode one token sequence, out-of-vocabulary tokens are dropped
    pub fn doc2bow<S>(&self, tokens: &[S]) -> BagOfWords
    where
        S: AsRef<str>,
    {
        BagOfWords::from_ids(tokens.iter().filter_map(|t| self.id_of(t.as_ref())))
    }

    /// Encode the corpus this vocabulary was built from
    ///
    /// # Errors
    /// * `StaleVocabulary` - `docs` is not the token corpus of `build`
    pub fn encode_corpus<D, S>(&self, docs: &[D]) -> Result<Vec<BagOfWords>>
    where
        D: AsRef<[S]> + Sync,
        S: AsRef<str> + Sync,
    {
        self.check_fingerprint(docs)?;
        Ok(docs.par_iter().map(|doc| self.doc2bow(doc.as_ref())).collect())
    }

    /// Fails with `StaleVocabulary` unless `docs` is the corpus of `build`
    pub fn check_fingerprint<D, S>(&self, docs: &[D]) -> Result<()>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let actual = corpus_fingerprint(docs);
        if actual != self.fingerprint {
            return Err(AnnotateError::StaleVocabulary {
                built_for: self.fingerprint,
                actual,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn id_of(&self, term: &str) -> Option<u32> {
        self.terms.get_index_of(term).map(|id| id as u32)
    }

    #[inline]
    pub fn term_of(&self, id: u32) -> Option<&str> {
        self.terms.get_index(id as usize).map(|(term, _)| term.as_str())
    }

    pub fn stats(&self, term: &str) -> Option<TermStats> {
        self.terms.get(term).copied()
    }

    /// Document frequency, 0 for unknown terms
    pub fn doc_freq(&self, term: &str) -> u64 {
        self.stats(term).map_or(0, |s| s.doc_freq)
    }

    /// Collection frequency, 0 for unknown terms
    pub fn coll_freq(&self, term: &str) -> u64 {
        self.stats(term).map_or(0, |s| s.coll_freq)
    }

    /// Terms in id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str, TermStats)> {
        self.terms
            .iter()
            .enumerate()
            .map(|(id, (term, stats))| (id as u32, term.as_str(), *stats))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of documents the vocabulary was built from
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

/// Order-sensitive 64-bit FNV-1a over a token corpus
/// stable across platforms and builds, so it survives persistence
pub fn corpus_fingerprint<D, S>(docs: &[D]) -> u64
where
    D: AsRef<[S]>,
    S: AsRef<str>,
{
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    let mut feed = |bytes: &[u8]| {
        for &b in bytes {
            hash ^= b as u64;
            hash = hash.wrapping_mul(PRIME);
        }
    };
    for doc in docs {
        for token in doc.as_ref() {
            feed(token.as_ref().as_bytes());
            feed(&[0x1f]);
        }
        feed(&[0x1e]);
    }
    hash
}
