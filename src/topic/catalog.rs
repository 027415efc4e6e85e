use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{AnnotateError, Result};

/// Topic catalog: topic name -> ordered seed words
///
/// The single domain configuration surface of the pipeline. Topic order is
/// kept everywhere downstream (lexicon set, score matrix columns, reports).
///
/// # Examples
/// ```
/// use topic_sentiment::TopicCatalog;
/// let catalog = TopicCatalog::from_json_str(r#"{ "tax": ["income", "tariff"], "coal": ["mine"] }"#).unwrap();
/// assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["tax", "coal"]);
/// assert_eq!(TopicCatalog::political_default().len(), 11);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicCatalog {
    topics: IndexMap<String, Vec<String>>,
}

impl TopicCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a topic
    pub fn with_topic<N, I, S>(mut self, name: N, seeds: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics
            .insert(name.into(), seeds.into_iter().map(Into::into).collect());
        self
    }

    /// Parse `{ "topic": ["seed", ...], ... }` and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// `EmptySeedSet` for the first topic without a usable seed word
    pub fn validate(&self) -> Result<()> {
        match self
            .topics
            .iter()
            .find(|(_, seeds)| seeds.iter().all(|s| s.trim().is_empty()))
        {
            Some((topic, _)) => Err(AnnotateError::EmptySeedSet {
                topic: topic.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn seeds(&self, topic: &str) -> Option<&[String]> {
        self.topics.get(topic).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.topics.iter().map(|(t, s)| (t.as_str(), s.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// The eleven political topics of the quotation study
    pub fn political_default() -> Self {
        POLITICAL_TOPICS
            .iter()
            .fold(Self::new(), |catalog, (topic, seeds)| catalog.with_topic(*topic, seeds.iter().copied()))
    }
}

const POLITICAL_TOPICS: &[(&str, &[&str])] = &[
    ("immigration", &["refugee", "immigration", "border", "citizenship", "naturalization"]),
    (
        "healthcare",
        &["health", "medical", "treatment", "disease", "aid", "hospital", "insurance", "reimbursement"],
    ),
    (
        "climate",
        &[
            "melting", "global warming", "temperature", "rise", "change", "ecology", "meteorology",
            "urgency", "co2", "greenhouse gas", "climate event",
        ],
    ),
    ("trump", &["president", "donald trump", "republican", "2016 presidential election"]),
    (
        "abortion",
        &[
            "pregnancy", "woman", "life", "choice", "family", "child", "foetus", "body", "right",
            "terminate", "abort", "rape",
        ],
    ),
    (
        "women right",
        &[
            "abortion", "sexism", "salary gap", "sexual harassment", "abuse", "gender equality",
            "gender", "woman", "female", "patriarchy", "feminism",
        ],
    ),
    (
        "violence",
        &[
            "police violence", "gun", "second amendment", "shooting", "death", "police brutality",
            "firearm",
        ],
    ),
    (
        "racism",
        &[
            "discrimination", "privilage", "race", "ethnicity", "equality", "afroamerican", "white",
            "black", "hate crime", "color",
        ],
    ),
    (
        "war",
        &[
            "military", "irak", "afghanistan", "palestine", "middle east", "soldier", "arm", "weapon",
            "missile", "conflict", "operation", "troop", "bomb", "force",
        ],
    ),
    (
        "tax",
        &[
            "income", "revenue", "free trade", "taxpayer", "imposition", "fee", "social welfare",
            "tax evasion", "tariff", "deductible", "vat",
        ],
    ),
    ("coal", &["energy", "pollution", "mine", "industry", "fossil fuel", "electricity", "carbon"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_keeps_topic_order() {
        let catalog = TopicCatalog::political_default();
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names.first(), Some(&"immigration"));
        assert_eq!(names.last(), Some(&"coal"));
        assert!(names.contains(&"women right"));
        assert_eq!(catalog.seeds("coal").map(<[String]>::len), Some(7));
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn empty_seed_set_is_rejected() {
        let err = TopicCatalog::from_json_str(r#"{ "tax": ["income"], "war": [" "] }"#).unwrap_err();
        assert!(matches!(err, AnnotateError::EmptySeedSet { topic } if topic == "war"));

        let catalog = TopicCatalog::new().with_topic("coal", Vec::<String>::new());
        assert!(catalog.validate().is_err());
    }
}
