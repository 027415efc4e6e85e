use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{error::DocumentError, vectorizer::bow::BagOfWords};

/// Raw text of an input row, as received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawText {
    Utf8(String),
    /// undecoded bytes, decoded (and validated) at ingestion
    Bytes(Vec<u8>),
}

impl RawText {
    pub fn decode(self) -> Result<String, DocumentError> {
        match self {
            RawText::Utf8(text) => Ok(text),
            RawText::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Ok(text),
                Err(e) => Err(DocumentError::InvalidEncoding(e.utf8_error())),
            },
        }
    }
}

/// One input row: id, text and pass-through metadata (speaker, date, party, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub id: String,
    pub text: Option<RawText>,
    pub metadata: BTreeMap<String, String>,
}

impl InputRecord {
    pub fn new<I, T>(id: I, text: T) -> Self
    where
        I: Into<String>,
        T: Into<String>,
    {
        Self {
            id: id.into(),
            text: Some(RawText::Utf8(text.into())),
            metadata: BTreeMap::new(),
        }
    }

    /// Row with undecoded text bytes
    pub fn from_bytes<I: Into<String>>(id: I, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            text: Some(RawText::Bytes(bytes)),
            metadata: BTreeMap::new(),
        }
    }

    /// Row without text
    pub fn empty<I: Into<String>>(id: I) -> Self {
        Self {
            id: id.into(),
            text: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Validated and normalized document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub normalized: String,
    pub metadata: BTreeMap<String, String>,
}

/// Document with its lemma tokens (collocations appended)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizedDocument {
    pub id: String,
    pub text: String,
    pub normalized: String,
    pub tokens: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Fully annotated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub id: String,
    pub text: String,
    pub normalized: String,
    pub tokens: Vec<String>,
    pub bow: BagOfWords,
    /// compound polarity in [-1, 1]
    pub compound: f64,
    pub topics: BTreeSet<String>,
    pub metadata: BTreeMap<String, String>,
}

impl AnnotatedDocument {
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }
}
