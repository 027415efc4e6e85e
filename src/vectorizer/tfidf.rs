use std::marker::PhantomData;

use indexmap::IndexSet;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use regex::Regex;
use sprs::{CsMat, CsVecView, TriMat};
use tracing::info;

use crate::{vectorizer::corpus::Corpus, TermFrequency};

/// TF-IDF calculation strategy
///
/// Plugged into [`TfIdfVectorizer<E>`], the vectorizer only handles
/// tokenization, the feature table and row normalization.
pub trait TfIdfEngine: Send + Sync {
    /// IDFベクトルを生成するメソッド
    /// # Arguments
    /// * `corpus` - document frequencies of the fitted texts
    /// * `features` - feature dimension sample
    /// # Returns
    /// * `Vec<f64>` - one weight per feature
    fn idf_vec(corpus: &Corpus, features: &IndexSet<String>) -> Vec<f64>;

    /// Sparse TF vector of one document, sorted by feature index
    /// terms outside `features` are ignored
    fn tf_vec(freq: &TermFrequency, features: &IndexSet<String>) -> Vec<(usize, f64)>;
}

/// デフォルトのTF-IDFエンジン
/// raw counts and smooth idf `ln((1 + n) / (1 + df)) + 1`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTfIdfEngine;

impl TfIdfEngine for DefaultTfIdfEngine {
    fn idf_vec(corpus: &Corpus, features: &IndexSet<String>) -> Vec<f64> {
        let doc_num = corpus.get_doc_num() as f64;
        features
            .iter()
            .map(|term| {
                let doc_freq = corpus.get_doc_freq(term) as f64;
                ((1.0 + doc_num) / (1.0 + doc_freq)).ln() + 1.0
            })
            .collect()
    }

    fn tf_vec(freq: &TermFrequency, features: &IndexSet<String>) -> Vec<(usize, f64)> {
        let mut tf_vec: Vec<(usize, f64)> = freq
            .iter()
            .filter_map(|(term, count)| features.get_index_of(term).map(|idx| (idx, count as f64)))
            .collect();
        tf_vec.sort_unstable_by_key(|&(idx, _)| idx);
        tf_vec
    }
}

/// Document-term TF-IDF matrix, rows are l2-normalized
///
/// Stored as a CSR `sprs::CsMat` next to the feature name of every column.
#[derive(Debug, Clone, PartialEq)]
pub struct TfIdfMatrix {
    matrix: CsMat<f64>,
    features: Vec<String>,
}

impl TfIdfMatrix {
    pub fn n_rows(&self) -> usize {
        self.matrix.rows()
    }

    pub fn n_cols(&self) -> usize {
        self.matrix.cols()
    }

    /// Feature name per column
    pub fn feature_names(&self) -> &[String] {
        &self.features
    }

    /// The underlying CSR matrix
    pub fn matrix(&self) -> &CsMat<f64> {
        &self.matrix
    }

    /// Non-zero entries of one row, `None` past the last row
    pub fn row(&self, row: usize) -> Option<CsVecView<'_, f64>> {
        self.matrix.outer_view(row)
    }

    /// Number of stored non-zeros
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    pub fn to_dense(&self) -> Array2<f64> {
        self.matrix.to_dense()
    }

    /// `A · X` for a dense `X` of shape (n_cols, k)
    pub fn dot(&self, x: ArrayView2<f64>) -> Array2<f64> {
        &self.matrix * &x
    }

    /// `Aᵀ · Y` for a dense `Y` of shape (n_rows, k)
    pub fn t_dot(&self, y: ArrayView2<f64>) -> Array2<f64> {
        &self.matrix.transpose_view() * &y
    }
}

/// TF-IDF vectorizer over free text
///
/// Tokens are runs of two or more word characters (`\b\w\w+\b`) of the
/// lowercased text. Features are every token seen, in dictionary order, or a
/// fixed vocabulary given up front (its order is the column order).
///
/// `TfIdfVectorizer<E>` has one generic parameter:
/// - `E`: TF-IDF calculation engine (default [`DefaultTfIdfEngine`])
///
/// # Examples
/// ```
/// use topic_sentiment::vectorizer::tfidf::TfIdfVectorizer;
/// let matrix = TfIdfVectorizer::new().fit_transform(&["the wall", "the tax"]);
/// assert_eq!(matrix.feature_names(), &["tax", "the", "wall"]);
/// assert_eq!(matrix.n_rows(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer<E = DefaultTfIdfEngine>
where
    E: TfIdfEngine,
{
    token_pattern: Regex,
    vocabulary: Option<IndexSet<String>>,
    _marker: PhantomData<E>,
}

impl Default for TfIdfVectorizer<DefaultTfIdfEngine> {
    fn default() -> Self {
        Self::with_engine()
    }
}

impl TfIdfVectorizer<DefaultTfIdfEngine> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E> TfIdfVectorizer<E>
where
    E: TfIdfEngine,
{
    pub fn with_engine() -> Self {
        Self {
            token_pattern: Regex::new(r"\b\w\w+\b").expect("static pattern"),
            vocabulary: None,
            _marker: PhantomData,
        }
    }

    /// Restrict the features to a fixed vocabulary
    /// duplicates keep their first position
    pub fn with_vocabulary<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = Some(words.into_iter().map(Into::into).collect());
        self
    }

    /// Split one text into lowercase tokens
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.token_pattern
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Learn the features and idf weights and return the document-term matrix
    pub fn fit_transform<S>(&self, texts: &[S]) -> TfIdfMatrix
    where
        S: AsRef<str> + Sync,
    {
        let freqs: Vec<TermFrequency> = texts
            .par_iter()
            .map(|text| TermFrequency::from(self.analyze(text.as_ref()).as_slice()))
            .collect();

        let corpus = Corpus::new();
        freqs.par_iter().for_each(|freq| {
            let terms: Vec<&str> = freq.iter().map(|(term, _)| term).collect();
            corpus.add_document(&terms);
        });

        let features: IndexSet<String> = match &self.vocabulary {
            Some(vocabulary) => vocabulary.clone(),
            None => {
                let mut terms: Vec<String> = corpus.doc_freq.iter().map(|e| e.key().to_string()).collect();
                terms.sort();
                terms.into_iter().collect()
            }
        };
        let idf = E::idf_vec(&corpus, &features);

        let rows: Vec<Vec<(usize, f64)>> = freqs
            .par_iter()
            .map(|freq| {
                let mut row = E::tf_vec(freq, &features);
                for (idx, value) in row.iter_mut() {
                    *value *= idf[*idx];
                }
                let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.iter_mut().for_each(|(_, v)| *v /= norm);
                }
                row
            })
            .collect();

        // 三つ組で組み立ててからCSRへ
        let mut triplets = TriMat::with_capacity((rows.len(), features.len()), rows.iter().map(Vec::len).sum());
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row {
                triplets.add_triplet(r, c, value);
            }
        }
        let matrix: CsMat<f64> = triplets.to_csr();

        info!(documents = texts.len(), features = features.len(), nnz = matrix.nnz(), "tf-idf matrix built");

        TfIdfMatrix {
            matrix,
            features: features.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn idf_is_smooth_and_rows_are_unit_length() {
        let matrix = TfIdfVectorizer::new().fit_transform(&["wall wall tax", "tax coal", "a"]);
        assert_eq!(matrix.feature_names(), &["coal", "tax", "wall"]);
        assert_eq!(matrix.n_rows(), 3);

        // doc 0: wall tf=2 idf=ln(4/2)+1, tax tf=1 idf=ln(4/3)+1
        let wall = 2.0 * ((4.0f64 / 2.0).ln() + 1.0);
        let tax = (4.0f64 / 3.0).ln() + 1.0;
        let norm = (wall * wall + tax * tax).sqrt();
        let row = matrix.row(0).unwrap();
        assert_eq!(row.indices(), &[1, 2]);
        assert!(close(row.data()[0], tax / norm));
        assert!(close(row.data()[1], wall / norm));

        for r in 0..2 {
            let row = matrix.row(r).unwrap();
            assert!(close(row.data().iter().map(|v| v * v).sum::<f64>(), 1.0));
        }
        // single-char tokens are not features
        assert_eq!(matrix.row(2).unwrap().nnz(), 0);
        assert!(matrix.row(3).is_none());
        assert_eq!(matrix.nnz(), 4);
    }

    #[test]
    fn fixed_vocabulary_sets_column_order() {
        let matrix = TfIdfVectorizer::new()
            .with_vocabulary(["wall", "tax", "wall", "unused"])
            .fit_transform(&["Tax the WALL"]);
        assert_eq!(matrix.feature_names(), &["wall", "tax", "unused"]);
        assert_eq!(matrix.row(0).unwrap().indices(), &[0, 1]);
    }

    /// presence only, no idf
    struct Binary;

    impl TfIdfEngine for Binary {
        fn idf_vec(_corpus: &Corpus, features: &IndexSet<String>) -> Vec<f64> {
            vec![1.0; features.len()]
        }

        fn tf_vec(freq: &TermFrequency, features: &IndexSet<String>) -> Vec<(usize, f64)> {
            let mut tf_vec: Vec<(usize, f64)> = freq
                .iter()
                .filter_map(|(term, _)| features.get_index_of(term).map(|idx| (idx, 1.0)))
                .collect();
            tf_vec.sort_unstable_by_key(|&(idx, _)| idx);
            tf_vec
        }
    }

    #[test]
    fn custom_engine_runs_on_the_thread_pool() {
        let texts: Vec<String> = (0..64).map(|i| format!("wall wall tax doc{i}")).collect();
        let matrix = TfIdfVectorizer::<Binary>::with_engine()
            .with_vocabulary(["tax", "wall"])
            .fit_transform(&texts);
        assert_eq!(matrix.n_rows(), 64);
        let expected = 1.0 / 2.0f64.sqrt();
        for r in 0..matrix.n_rows() {
            assert!(matrix.row(r).unwrap().data().iter().all(|&v| close(v, expected)));
        }
    }

    #[test]
    fn sparse_products_match_dense() {
        let matrix = TfIdfVectorizer::new().fit_transform(&["wall tax", "coal coal wall", "war"]);
        assert!(matrix.matrix().is_csr());
        assert_eq!(matrix.matrix().shape(), (3, 4));
        let dense = matrix.to_dense();
        let x = Array2::from_shape_fn((matrix.n_cols(), 2), |(i, j)| (i + 2 * j) as f64 - 1.5);
        let y = array![[1.0, 0.5], [-2.0, 1.0], [0.25, 3.0]];

        let ax = matrix.dot(x.view());
        let aty = matrix.t_dot(y.view());
        assert!((&ax - &dense.dot(&x)).iter().all(|v| v.abs() < 1e-12));
        assert!((&aty - &dense.t().dot(&y)).iter().all(|v| v.abs() < 1e-12));
    }
}
