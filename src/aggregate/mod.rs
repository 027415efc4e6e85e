use ahash::RandomState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::{pipeline::document::AnnotatedDocument, text::StopWords, TermFrequency};

/// One row of a topic score matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    /// document id, or entity name after aggregation
    pub key: String,
    pub entity: Option<String>,
    pub group: Option<String>,
    /// one cell per topic column, `None` when the topic is absent
    pub cells: Vec<Option<f64>>,
}

impl ScoreRow {
    pub fn is_all_missing(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Per-topic compound scores
///
/// Rows are documents or aggregated entities, one column per topic.
/// A missing cell means "topic not present", never a neutral score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicScoreMatrix {
    topics: Vec<String>,
    rows: Vec<ScoreRow>,
}

impl TopicScoreMatrix {
    /// Build a matrix directly from rows
    pub fn new(topics: Vec<String>, rows: Vec<ScoreRow>) -> Self {
        debug_assert!(rows.iter().all(|r| r.cells.len() == topics.len()));
        Self { topics, rows }
    }

    /// One row per document
    ///
    /// # Arguments
    /// * `docs` - annotated documents
    /// * `topics` - topic columns, in order
    /// * `entity_column` - metadata column naming the entity (speaker), if any
    /// * `group_column` - metadata column with the group label (party)
    pub fn from_documents<S: AsRef<str>>(
        docs: &[AnnotatedDocument],
        topics: &[S],
        entity_column: Option<&str>,
        group_column: &str,
    ) -> Self {
        let topics: Vec<String> = topics.iter().map(|t| t.as_ref().to_string()).collect();
        let rows = docs
            .iter()
            .map(|doc| ScoreRow {
                key: doc.id.clone(),
                entity: entity_column.and_then(|c| doc.meta(c)).map(str::to_string),
                group: doc.meta(group_column).map(str::to_string),
                cells: topics
                    .iter()
                    .map(|t| doc.has_topic(t).then_some(doc.compound))
                    .collect(),
            })
            .collect();
        Self { topics, rows }
    }

    /// Group rows by (entity, group) and average the present values per topic
    ///
    /// Rows without an entity fall back to their own key. Rows where every
    /// topic is missing are dropped. Group order is first appearance.
    pub fn aggregate(&self) -> Self {
        let width = self.topics.len();
        let mut groups: IndexMap<(String, Option<String>), Vec<(f64, u32)>, RandomState> =
            IndexMap::with_hasher(RandomState::new());
        for row in &self.rows {
            let entity = row.entity.clone().unwrap_or_else(|| row.key.clone());
            let acc = groups
                .entry((entity, row.group.clone()))
                .or_insert_with(|| vec![(0.0, 0); width]);
            for (slot, cell) in acc.iter_mut().zip(&row.cells) {
                if let Some(v) = cell {
                    slot.0 += v;
                    slot.1 += 1;
                }
            }
        }

        let rows: Vec<ScoreRow> = groups
            .into_iter()
            .map(|((entity, group), acc)| ScoreRow {
                key: entity.clone(),
                entity: Some(entity),
                group,
                cells: acc
                    .into_iter()
                    .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
                    .collect(),
            })
            .filter(|row| !row.is_all_missing())
            .collect();
        info!(input = self.rows.len(), output = rows.len(), "aggregated topic scores");
        Self {
            topics: self.topics.clone(),
            rows,
        }
    }

    /// Keep only rows whose group label is one of `labels`
    pub fn restrict_groups<S: AsRef<str>>(&self, labels: &[S]) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                row.group
                    .as_deref()
                    .is_some_and(|g| labels.iter().any(|l| l.as_ref() == g))
            })
            .cloned()
            .collect();
        Self {
            topics: self.topics.clone(),
            rows,
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.topics.len()
    }

    pub fn column_index(&self, topic: &str) -> Option<usize> {
        self.topics.iter().position(|t| t == topic)
    }

    /// Present values of one topic column for one group
    pub fn group_values(&self, col: usize, group: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|row| row.group.as_deref() == Some(group))
            .filter_map(|row| row.cells.get(col).copied().flatten())
            .collect()
    }

    /// Export column name for a topic
    pub fn column_name(topic: &str) -> String {
        format!("{}_compound_score", topic.replace(' ', "_"))
    }

    /// Contract table: one object per row with the key, one
    /// `{topic}_compound_score` column per topic (`null` when missing) and the
    /// group label under `group_column`
    pub fn export(&self, group_column: &str) -> Value {
        let names: Vec<String> = self.topics.iter().map(|t| Self::column_name(t)).collect();
        let records = self
            .rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                obj.insert("key".to_string(), Value::String(row.key.clone()));
                for (name, cell) in names.iter().zip(&row.cells) {
                    let value = cell
                        .and_then(serde_json::Number::from_f64)
                        .map_or(Value::Null, Value::Number);
                    obj.insert(name.clone(), value);
                }
                obj.insert(
                    group_column.to_string(),
                    row.group.clone().map_or(Value::Null, Value::String),
                );
                Value::Object(obj)
            })
            .collect();
        Value::Array(records)
    }
}

/// Term frequencies of the tokens of every document, grouped by a metadata column
///
/// Documents without the column are skipped. `extra_stopwords` are removed from
/// every table afterwards.
pub fn term_frequencies_by_group(
    docs: &[AnnotatedDocument],
    column: &str,
    extra_stopwords: &StopWords,
) -> IndexMap<String, TermFrequency, RandomState> {
    let mut groups: IndexMap<String, TermFrequency, RandomState> =
        IndexMap::with_hasher(RandomState::new());
    for doc in docs {
        if let Some(label) = doc.meta(column) {
            groups
                .entry(label.to_string())
                .or_default()
                .add_terms(&doc.tokens);
        }
    }
    for freq in groups.values_mut() {
        freq.remove_stop_terms(extra_stopwords);
    }
    groups
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::vectorizer::bow::BagOfWords;

    fn doc(id: &str, speaker: &str, party: &str, compound: f64, topics: &[&str]) -> AnnotatedDocument {
        let mut metadata = BTreeMap::new();
        metadata.insert("speaker".to_string(), speaker.to_string());
        metadata.insert("party".to_string(), party.to_string());
        AnnotatedDocument {
            id: id.to_string(),
            text: String::new(),
            normalized: String::new(),
            tokens: vec!["wall".to_string(), "border".to_string()],
            bow: BagOfWords::default(),
            compound,
            topics: topics.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            metadata,
        }
    }

    fn sample() -> Vec<AnnotatedDocument> {
        vec![
            doc("1", "ann", "D", 0.5, &["immigration"]),
            doc("2", "ann", "D", -0.1, &["immigration", "healthcare"]),
            doc("3", "bob", "R", 0.2, &["healthcare"]),
            doc("4", "cid", "G", 0.9, &[]),
        ]
    }

    #[test]
    fn missing_is_not_zero() {
        let m = TopicScoreMatrix::from_documents(&sample(), &["immigration", "healthcare"], Some("speaker"), "party");
        assert_eq!(m.rows()[0].cells, vec![Some(0.5), None]);
        assert_eq!(m.rows()[2].cells, vec![None, Some(0.2)]);
        assert!(m.rows()[3].is_all_missing());
    }

    #[test]
    fn aggregate_averages_present_values() {
        let m = TopicScoreMatrix::from_documents(&sample(), &["immigration", "healthcare"], Some("speaker"), "party")
            .aggregate();
        assert_eq!(m.n_rows(), 2);
        let ann = &m.rows()[0];
        assert_eq!(ann.key, "ann");
        assert!((ann.cells[0].unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(ann.cells[1], Some(-0.1));
        assert_eq!(m.rows()[1].cells, vec![None, Some(0.2)]);
    }

    #[test]
    fn restrict_and_export() {
        let m = TopicScoreMatrix::from_documents(&sample(), &["women right"], Some("speaker"), "party")
            .restrict_groups(&["R", "G"]);
        assert_eq!(m.n_rows(), 2);
        let json = m.export("party");
        assert_eq!(json[0]["women_right_compound_score"], Value::Null);
        assert_eq!(json[0]["party"], "R");
        assert_eq!(json[1]["key"], "4");
    }

    #[test]
    fn term_frequencies_per_group() {
        let stop = StopWords::new(["wall"]);
        let tables = term_frequencies_by_group(&sample(), "party", &stop);
        assert_eq!(tables.len(), 3);
        let d = &tables["D"];
        assert_eq!(d.term_count("border"), 2);
        assert_eq!(d.term_count("wall"), 0);
        assert_eq!(d.most_frequent(5), vec![("border".to_string(), 2)]);
        assert_eq!(tables.keys().collect::<Vec<_>>(), vec!["D", "R", "G"]);
    }
}
