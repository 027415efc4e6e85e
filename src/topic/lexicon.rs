use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{AnnotateError, Result},
    text::{Lemmatizer, RuleLemmatizer, Tokenizer},
    topic::{catalog::TopicCatalog, embedding::{AssociationModel, EmbeddingModel}},
    utils::persist::Persist,
};

/// Expanded word list of one topic
///
/// Seeds come first (weight 1.0), followed by the model's associations, best
/// first. Multi-word entries use `_` between words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicLexicon {
    pub topic: String,
    pub seeds: Vec<String>,
    #[serde(with = "indexmap::map::serde_seq")]
    words: IndexMap<String, f32>,
}

impl TopicLexicon {
    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Association weight, `None` outside the lexicon
    #[inline]
    pub fn weight(&self, word: &str) -> Option<f32> {
        self.words.get(word).copied()
    }

    /// Words in lexicon order
    pub fn words(&self) -> impl Iterator<Item = (&str, f32)> {
        self.words.iter().map(|(w, &s)| (w.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Expanded lexicons of a whole catalog, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexiconSet {
    lexicons: Vec<TopicLexicon>,
}

impl Persist for LexiconSet {}

impl LexiconSet {
    pub fn new(lexicons: Vec<TopicLexicon>) -> Self {
        Self { lexicons }
    }

    pub fn get(&self, topic: &str) -> Option<&TopicLexicon> {
        self.lexicons.iter().find(|l| l.topic == topic)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicLexicon> {
        self.lexicons.iter()
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.lexicons.iter().map(|l| l.topic.as_str())
    }

    pub fn len(&self) -> usize {
        self.lexicons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicons.is_empty()
    }
}

/// Grows seed words into topic lexicons with an association model
///
/// `LexiconExpander<M, L>` has two generic parameters:
/// - `M`: implementation of [`AssociationModel`] (default [`EmbeddingModel`])
/// - `L`: lemmatizer of the attached tokenizer (default [`RuleLemmatizer`])
///
/// The model is queried with the seeds as written. With a tokenizer attached,
/// every lexicon entry is then mapped into token space (lemmas, stopwords
/// removed, words joined with the collocation delimiter) so it can match the
/// tokens of a document.
///
/// The result is deterministic for a fixed seed set, model and size.
#[derive(Debug)]
pub struct LexiconExpander<M = EmbeddingModel, L = RuleLemmatizer>
where
    M: AssociationModel,
    L: Lemmatizer,
{
    model: Arc<M>,
    size: usize,
    tokenizer: Option<(Arc<Tokenizer<L>>, String)>,
}

impl<M, L> Clone for LexiconExpander<M, L>
where
    M: AssociationModel,
    L: Lemmatizer,
{
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            size: self.size,
            tokenizer: self.tokenizer.as_ref().map(|(t, d)| (Arc::clone(t), d.clone())),
        }
    }
}

impl<M> LexiconExpander<M>
where
    M: AssociationModel,
{
    /// Expander without a tokenizer, entries stay lowercase surface forms
    ///
    /// # Arguments
    /// * `model` - shared association model
    /// * `size` - maximum number of words per lexicon
    pub fn new(model: Arc<M>, size: usize) -> Self {
        Self {
            model,
            size,
            tokenizer: None,
        }
    }
}

impl<M, L> LexiconExpander<M, L>
where
    M: AssociationModel,
    L: Lemmatizer,
{
    /// Map lexicon entries through `tokenizer`
    ///
    /// # Arguments
    /// * `tokenizer` - the tokenizer documents go through
    /// * `delimiter` - collocation delimiter for multi-word entries
    pub fn with_tokenizer<L2>(self, tokenizer: Arc<Tokenizer<L2>>, delimiter: &str) -> LexiconExpander<M, L2>
    where
        L2: Lemmatizer,
    {
        LexiconExpander {
            model: self.model,
            size: self.size,
            tokenizer: Some((tokenizer, delimiter.to_string())),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Token-space form of one entry, `None` when it filters to nothing
    fn term(&self, word: &str) -> Option<String> {
        match &self.tokenizer {
            Some((tokenizer, delimiter)) => tokenizer.tokenize_term(word, delimiter),
            None => Some(word.to_string()),
        }
    }

    /// Expand one topic
    ///
    /// Seeds are trimmed, lowercased and their inner spaces become `_`. They are
    /// always part of the lexicon; when there are more seeds than `size`, only
    /// the first `size` seeds are kept.
    ///
    /// # Errors
    /// * `EmptySeedSet` - no non-blank seed, or no seed survives the tokenizer
    pub fn expand(&self, topic: &str, seeds: &[String]) -> Result<TopicLexicon> {
        let mut query: Vec<String> = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let seed = seed.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase();
            if !seed.is_empty() && !query.contains(&seed) {
                query.push(seed);
            }
        }
        if query.is_empty() {
            return Err(AnnotateError::EmptySeedSet {
                topic: topic.to_string(),
            });
        }
        for seed in query.iter().filter(|s| !self.model.contains(s)) {
            warn!(topic, seed = %seed, "seed word unknown to the association model");
        }

        let mut normalized: Vec<String> = Vec::with_capacity(query.len());
        for seed in &query {
            match self.term(seed) {
                Some(term) => {
                    if !normalized.contains(&term) {
                        normalized.push(term);
                    }
                }
                None => warn!(topic, seed = %seed, "seed word removed by the tokenizer"),
            }
        }
        if normalized.is_empty() {
            return Err(AnnotateError::EmptySeedSet {
                topic: topic.to_string(),
            });
        }

        let mut words: IndexMap<String, f32> = IndexMap::with_capacity(self.size);
        for seed in normalized.iter().take(self.size) {
            words.insert(seed.clone(), 1.0);
        }
        if words.len() < self.size {
            // 見出し語化で重複が出るので多めに取る
            for (word, weight) in self.model.most_associated(&query, self.size) {
                if words.len() == self.size {
                    break;
                }
                if let Some(term) = self.term(&word) {
                    words.entry(term).or_insert(weight);
                }
            }
        }

        debug!(topic, seeds = normalized.len(), words = words.len(), "topic expanded");
        Ok(TopicLexicon {
            topic: topic.to_string(),
            seeds: normalized,
            words,
        })
    }

    /// Expand every topic of the catalog in parallel
    /// the first failure aborts the whole set
    pub fn expand_catalog(&self, catalog: &TopicCatalog) -> Result<LexiconSet> {
        let topics: Vec<(&str, &[String])> = catalog.iter().collect();
        let lexicons = topics
            .par_iter()
            .map(|(topic, seeds)| self.expand(topic, seeds))
            .collect::<Result<Vec<_>>>()?;
        info!(
            topics = lexicons.len(),
            words = lexicons.iter().map(TopicLexicon::len).sum::<usize>(),
            "lexicons expanded"
        );
        Ok(LexiconSet::new(lexicons))
    }
}
