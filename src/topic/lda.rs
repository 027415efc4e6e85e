//! Latent Dirichlet Allocation over bag-of-words documents.
//!
//! Collapsed Gibbs sampling with symmetric priors. A fixed seed gives a fixed
//! model, the sweep itself is sequential.

use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, info_span};

use crate::{
    config::LdaConfig,
    error::{AnnotateError, Result},
    vectorizer::{bow::BagOfWords, vocabulary::Vocabulary},
};

/// Fitted LDA model
///
/// Keeps the final assignment counts, distributions are derived on demand.
///
/// # Examples
/// ```
/// use topic_sentiment::{config::{LdaConfig, VocabularyConfig}, LdaModel, Vocabulary};
///
/// let docs = vec![vec!["tax", "fee", "tax"], vec!["war", "army"]];
/// let vocab = Vocabulary::build(&docs, &VocabularyConfig { no_below: 1, no_above: 1.0, keep_n: None });
/// let bows = vocab.encode_corpus(&docs).unwrap();
///
/// let config = LdaConfig { n_topics: 2, ..LdaConfig::default() };
/// let model = LdaModel::fit(&bows, &vocab, &config).unwrap();
/// assert_eq!(model.topic_term_matrix().dim(), (2, 4));
/// assert_eq!(model.document_topics().dim(), (2, 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LdaModel {
    alpha: f64,
    eta: f64,
    terms: Vec<String>,
    /// topic × term assignment counts
    topic_term: Array2<u32>,
    /// document × topic assignment counts
    doc_topic: Array2<u32>,
    topic_totals: Vec<u32>,
}

impl LdaModel {
    /// Fit a model to an encoded corpus
    ///
    /// # Arguments
    /// * `bows` - documents encoded with `vocabulary`
    /// * `vocabulary` - term ids of the columns
    /// * `config` - topic count, priors, sweeps and seed
    ///
    /// # Errors
    /// * `InvalidParameter` - invalid config, or a term id outside the vocabulary
    pub fn fit(bows: &[BagOfWords], vocabulary: &Vocabulary, config: &LdaConfig) -> Result<Self> {
        config.validate()?;
        let _span = info_span!("stage", name = "lda").entered();
        let k = config.n_topics;
        let v = vocabulary.len();
        let (alpha, eta) = config.priors();

        let mut docs: Vec<Vec<usize>> = Vec::with_capacity(bows.len());
        for bow in bows {
            let mut words = Vec::with_capacity(bow.total() as usize);
            for &(id, count) in bow.pairs() {
                let id = id as usize;
                if id >= v {
                    return Err(AnnotateError::InvalidParameter {
                        name: "bows",
                        reason: format!("term id {id} outside a vocabulary of {v} terms"),
                    });
                }
                words.extend(std::iter::repeat(id).take(count as usize));
            }
            docs.push(words);
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut topic_term = Array2::<u32>::zeros((k, v));
        let mut doc_topic = Array2::<u32>::zeros((docs.len(), k));
        let mut topic_totals = vec![0u32; k];
        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(docs.len());
        for (d, words) in docs.iter().enumerate() {
            let mut topics = Vec::with_capacity(words.len());
            for &w in words {
                let z = rng.gen_range(0..k);
                topic_term[[z, w]] += 1;
                doc_topic[[d, z]] += 1;
                topic_totals[z] += 1;
                topics.push(z);
            }
            assignments.push(topics);
        }

        let eta_sum = eta * v as f64;
        let mut weights = vec![0.0; k];
        for sweep in 0..config.n_iter {
            let mut moved = 0usize;
            for (d, words) in docs.iter().enumerate() {
                for (pos, &w) in words.iter().enumerate() {
                    let old = assignments[d][pos];
                    topic_term[[old, w]] -= 1;
                    doc_topic[[d, old]] -= 1;
                    topic_totals[old] -= 1;

                    // 文書長の分母はトピックに依らないので省く
                    let mut total = 0.0;
                    for (z, weight) in weights.iter_mut().enumerate() {
                        *weight = (doc_topic[[d, z]] as f64 + alpha) * (topic_term[[z, w]] as f64 + eta)
                            / (topic_totals[z] as f64 + eta_sum);
                        total += *weight;
                    }
                    let new = sample(&weights, rng.gen::<f64>() * total);

                    topic_term[[new, w]] += 1;
                    doc_topic[[d, new]] += 1;
                    topic_totals[new] += 1;
                    assignments[d][pos] = new;
                    moved += usize::from(new != old);
                }
            }
            debug!(sweep, moved, "gibbs sweep");
        }

        info!(
            documents = docs.len(),
            tokens = topic_totals.iter().map(|&n| n as u64).sum::<u64>(),
            topics = k,
            terms = v,
            "lda model fitted"
        );
        Ok(Self {
            alpha,
            eta,
            terms: vocabulary.iter().map(|(_, term, _)| term.to_string()).collect(),
            topic_term,
            doc_topic,
            topic_totals,
        })
    }

    pub fn n_topics(&self) -> usize {
        self.topic_totals.len()
    }

    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// `(alpha, eta)` the model was fitted with
    pub fn priors(&self) -> (f64, f64) {
        (self.alpha, self.eta)
    }

    /// Term distribution of every topic, shape (topics, terms), rows sum to 1
    pub fn topic_term_matrix(&self) -> Array2<f64> {
        let eta_sum = self.eta * self.n_terms() as f64;
        let mut phi = self.topic_term.mapv(|n| n as f64 + self.eta);
        for (mut row, &total) in phi.rows_mut().into_iter().zip(&self.topic_totals) {
            row /= total as f64 + eta_sum;
        }
        phi
    }

    /// Topic mixture of every fitted document, shape (documents, topics), rows sum to 1
    pub fn document_topics(&self) -> Array2<f64> {
        let mut theta = self.doc_topic.mapv(|n| n as f64 + self.alpha);
        for mut row in theta.rows_mut() {
            let total = row.sum();
            row /= total;
        }
        theta
    }

    /// Most probable topic of one fitted document, lowest index on ties
    pub fn dominant_topic(&self, doc: usize) -> Option<usize> {
        (doc < self.doc_topic.nrows()).then(|| {
            self.doc_topic
                .row(doc)
                .iter()
                .enumerate()
                .fold((0, 0), |best, (z, &n)| if n > best.1 { (z, n) } else { best })
                .0
        })
    }

    /// The `n` most probable terms of a topic, best first
    ///
    /// # Returns
    /// * `Vec<(&str, f64)>` - `(term, probability)`, empty for an unknown topic
    pub fn top_terms(&self, topic: usize, n: usize) -> Vec<(&str, f64)> {
        if topic >= self.n_topics() {
            return Vec::new();
        }
        let eta_sum = self.eta * self.n_terms() as f64;
        let total = self.topic_totals[topic] as f64 + eta_sum;
        let mut ranked: Vec<(usize, u32)> = self.topic_term.row(topic).iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(n)
            .map(|(w, count)| (self.terms[w].as_str(), (count as f64 + self.eta) / total))
            .collect()
    }
}

/// Index of the bucket of `weights` that `threshold` falls in
fn sample(weights: &[f64], mut threshold: f64) -> usize {
    for (z, &weight) in weights.iter().enumerate() {
        if threshold < weight {
            return z;
        }
        threshold -= weight;
    }
    weights.len() - 1
}
