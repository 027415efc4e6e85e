use std::str::Utf8Error;

use thiserror::Error;

/// Errors that abort a pipeline stage (or the whole run)
#[derive(Error, Debug)]
pub enum AnnotateError {
    /// embedding / sentiment / tokenizer model failed to load
    /// fatal: a partially annotated corpus is not safe to aggregate
    #[error("model `{model}` unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("topic `{topic}` has no seed words")]
    EmptySeedSet { topic: String },

    #[error("requested {requested} components but only {available} non-zero dimensions are available")]
    InvalidComponentCount { requested: usize, available: usize },

    /// vocabulary was built from a different token corpus
    /// (typically: before collocations were appended)
    #[error("vocabulary is stale: built for corpus {built_for:#018x}, got {actual:#018x}")]
    StaleVocabulary { built_for: u64, actual: u64 },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_cbor::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnnotateError>;

/// Defects isolated to a single input row.
/// The row is skipped and recorded, the batch keeps going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("missing text")]
    MissingText,

    #[error("text is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] Utf8Error),

    #[error("duplicate document id")]
    DuplicateId,
}

/// A skipped document and why it was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFailure {
    pub id: String,
    pub error: DocumentError,
}
