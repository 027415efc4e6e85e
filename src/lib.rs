//! This crate is a topic and sentiment annotation pipeline for quotation corpora.
pub mod aggregate;
pub mod compare;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reduce;
pub mod sentiment;
pub mod text;
pub mod topic;
pub mod utils;
pub mod vectorizer;

/// Annotation Pipeline
/// The top-level struct of this crate. It turns raw quotation records into
/// annotated documents: lemma tokens with collocations, a bag-of-words over a
/// pruned vocabulary, a compound sentiment score and a set of topics.
///
/// Stages:
/// - Normalization and tokenization (per document, parallel)
/// - Collocation detection and vocabulary building (corpus barriers)
/// - Lexicon expansion (per topic, concurrent with the text stages)
/// - Topic assignment and sentiment scoring (per document, parallel)
///
/// `Pipeline<M, S, L>` has the following generic parameters:
/// - `M`: association model for lexicon expansion (e.g., `EmbeddingModel`)
/// - `S`: polarity scorer (e.g., `SentimentIntensityAnalyzer`)
/// - `L`: lemmatizer (e.g., `RuleLemmatizer`)
///
/// Rows that cannot be read are recorded as failures, the batch keeps going.
pub use pipeline::{AnnotatedCorpus, AnnotatedDocument, InputRecord, Pipeline};

/// Pipeline Configuration
/// Every field has a default. Loadable from JSON.
pub use config::PipelineConfig;

/// Errors
/// `AnnotateError` aborts a stage, `DocumentError` only skips one document.
pub use error::{AnnotateError, DocumentError, DocumentFailure, Result};

/// Corpus statistics
/// Thread-safe document frequency and collection frequency counters.
/// Implemented using DashMap and atomics.
pub use vectorizer::corpus::Corpus;

/// Term Frequency structure
/// Occurrence counts of terms in one document or a group of documents.
pub use vectorizer::term::TermFrequency;

/// Vocabulary
/// Bidirectional term and dense id map with document and collection frequencies.
/// Immutable after pruning; remembers the fingerprint of the corpus it was built from.
///
/// # Serialization
/// Supported (CBOR through `Persist`).
pub use vectorizer::vocabulary::Vocabulary;

/// Collocations and Bag-of-Words
pub use vectorizer::{bow::BagOfWords, collocation::Phrases};

/// TF-IDF Vectorizer and Calculation Engine Trait
/// By implementing `TfIdfEngine`, you can plug different TF-IDF calculation
/// strategies into `TfIdfVectorizer<E>`.
pub use vectorizer::tfidf::{DefaultTfIdfEngine, TfIdfEngine, TfIdfMatrix, TfIdfVectorizer};

/// Topics
/// Seed catalog, association model, lexicon expansion and assignment.
/// `LdaModel` learns latent topics from the bag-of-words corpus instead.
pub use topic::{
    assigner::TopicAssigner,
    catalog::TopicCatalog,
    embedding::{AssociationModel, EmbeddingModel},
    lda::LdaModel,
    lexicon::{LexiconExpander, LexiconSet, TopicLexicon},
};

/// Sentiment
/// `PolarityScorer` is the injectable scoring service, the default is a
/// lexicon and rule based analyzer.
pub use sentiment::{analyzer::SentimentIntensityAnalyzer, PolarityScorer, PolarityScores};

/// Aggregation, dimensionality reduction and group comparison
pub use aggregate::TopicScoreMatrix;
pub use compare::{ComparisonOutcome, ComparisonReport, GroupComparator};
pub use reduce::{FillPolicy, Pca, ReducedProjection, TruncatedSvd};

/// Binary persistence
pub use utils::persist::Persist;
