use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use ahash::RandomState;
use indexmap::IndexMap;
use ndarray::{Array1, Array2};
use tracing::info;

use crate::{
    error::{AnnotateError, Result},
    utils::math,
};

/// Source of word associations used to grow a topic lexicon
///
/// Implementations are immutable, shared by all topic expansions running in
/// parallel.
pub trait AssociationModel: Send + Sync {
    /// Words most associated with the whole seed set, best first
    ///
    /// # Arguments
    /// * `seeds` - seed words (multi-word seeds joined with `_`)
    /// * `n` - maximum number of words
    ///
    /// # Returns
    /// * `Vec<(String, f32)>` - `(word, association weight)`, seeds excluded
    fn most_associated(&self, seeds: &[String], n: usize) -> Vec<(String, f32)>;

    /// Whether the model knows `word`
    fn contains(&self, word: &str) -> bool;
}

/// Static word embeddings with cosine-similarity association
///
/// Rows are stored unit-length, so association is a single matrix-vector
/// product against the normalized sum of the seed vectors.
#[derive(Debug, Clone)]
pub struct EmbeddingModel {
    index: IndexMap<String, usize, RandomState>,
    vectors: Array2<f32>,
}

impl EmbeddingModel {
    /// Build from in-memory vectors
    ///
    /// # Errors
    /// * `ModelUnavailable` - empty input or vectors of different dimensions
    pub fn from_vectors<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        Self::from_rows("in-memory", entries.into_iter().map(|(w, v)| (w.into(), v)))
    }

    /// Load the word2vec text format
    ///
    /// An optional `<count> <dim>` header line, then one `word v1 v2 ...` line per word.
    ///
    /// # Errors
    /// * `ModelUnavailable` - the file cannot be read or is malformed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let model = path.display().to_string();
        let unavailable = |reason: String| AnnotateError::ModelUnavailable {
            model: model.clone(),
            reason,
        };

        let file = File::open(path).map_err(|e| unavailable(e.to_string()))?;
        let mut rows = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| unavailable(e.to_string()))?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let values: std::result::Result<Vec<f32>, _> = parts.map(str::parse::<f32>).collect();
            let values = values.map_err(|e| unavailable(format!("line {}: {e}", line_no + 1)))?;
            // ヘッダ行 (語数 次元数)
            if line_no == 0 && values.len() == 1 && word.parse::<usize>().is_ok() {
                continue;
            }
            rows.push((word.to_string(), values));
        }

        let model = Self::from_rows(&model, rows)?;
        info!(words = model.len(), dim = model.dim(), path = %path.display(), "embedding model loaded");
        Ok(model)
    }

    fn from_rows<I>(name: &str, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let unavailable = |reason: String| AnnotateError::ModelUnavailable {
            model: name.to_string(),
            reason,
        };

        let mut index = IndexMap::with_hasher(RandomState::new());
        let mut flat = Vec::new();
        let mut dim = None;
        for (word, mut values) in rows {
            match dim {
                None => dim = Some(values.len()),
                Some(d) if d != values.len() => {
                    return Err(unavailable(format!(
                        "`{word}` has {} dimensions, expected {d}",
                        values.len()
                    )))
                }
                Some(_) => {}
            }
            if index.contains_key(&word) {
                continue;
            }
            math::normalize(&mut values);
            index.insert(word, index.len());
            flat.extend(values);
        }
        let dim = match dim {
            Some(d) if d > 0 => d,
            _ => return Err(unavailable("no vectors".to_string())),
        };
        let vectors = Array2::from_shape_vec((index.len(), dim), flat).map_err(|e| unavailable(e.to_string()))?;
        Ok(Self { index, vectors })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    /// Unit vector of a word
    pub fn vector(&self, word: &str) -> Option<Vec<f32>> {
        self.index.get(word).map(|&i| self.vectors.row(i).to_vec())
    }
}

impl AssociationModel for EmbeddingModel {
    fn most_associated(&self, seeds: &[String], n: usize) -> Vec<(String, f32)> {
        let mut query = Array1::<f32>::zeros(self.dim());
        let mut known = 0;
        for seed in seeds {
            if let Some(&i) = self.index.get(seed.as_str()) {
                query += &self.vectors.row(i);
                known += 1;
            }
        }
        if known == 0 || n == 0 {
            return Vec::new();
        }
        let norm = query.dot(&query).sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        query /= norm;

        let scores = self.vectors.dot(&query);
        let mut ranked: Vec<(&str, f32)> = self
            .index
            .iter()
            .filter(|(word, _)| !seeds.iter().any(|seed| seed == *word))
            .map(|(word, &i)| (word.as_str(), scores[i]))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
            .into_iter()
            .take(n)
            .map(|(word, score)| (word.to_string(), score))
            .collect()
    }

    fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }
}
