use ndarray::{s, Array2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::{debug, info};

use super::{ReducedProjection, RANK_TOLERANCE};
use crate::{
    config::ReductionConfig,
    error::{AnnotateError, Result},
    utils::linalg::{column_variances, orthonormalize, symmetric_eigen},
    vectorizer::tfidf::TfIdfMatrix,
};

/// extra random directions sampled beyond the requested rank
const OVERSAMPLES: usize = 10;

/// Randomized truncated SVD over a sparse TF-IDF matrix (no centering)
///
/// Seeded, so repeated runs give identical projections.
#[derive(Debug, Clone, PartialEq)]
pub struct TruncatedSvd {
    n_components: usize,
    n_iter: usize,
    seed: u64,
}

impl TruncatedSvd {
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            n_iter: 10,
            seed: 0,
        }
    }

    pub fn from_config(config: &ReductionConfig) -> Self {
        Self {
            n_components: config.n_components,
            n_iter: config.n_iter,
            seed: config.seed,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    /// Project the rows of `matrix` onto its leading singular directions
    ///
    /// # Returns
    /// * `ReducedProjection` - coordinates `U·Σ`, axes sorted by explained variance
    ///
    /// # Errors
    /// * `InvalidParameter` - zero components requested
    /// * `InvalidComponentCount` - more components than non-zero singular values
    pub fn fit_transform(&self, matrix: &TfIdfMatrix) -> Result<ReducedProjection> {
        let k = self.n_components;
        if k == 0 {
            return Err(AnnotateError::InvalidParameter {
                name: "n_components",
                reason: "must be at least 1".to_string(),
            });
        }
        let (n, d) = (matrix.n_rows(), matrix.n_cols());
        let rank_bound = n.min(d);
        if k > rank_bound {
            return Err(AnnotateError::InvalidComponentCount {
                requested: k,
                available: rank_bound,
            });
        }
        let l = (k + OVERSAMPLES).min(rank_bound);

        // range finder with power iterations
        let mut rng = StdRng::seed_from_u64(self.seed);
        let omega = Array2::from_shape_simple_fn((d, l), || rng.sample::<f64, _>(StandardNormal));
        let mut q = matrix.dot(omega.view());
        orthonormalize(&mut q);
        for _ in 0..self.n_iter {
            let mut z = matrix.t_dot(q.view());
            orthonormalize(&mut z);
            q = matrix.dot(z.view());
            orthonormalize(&mut q);
        }

        // B = Qᵀ A, decomposed through B Bᵀ
        let bt = matrix.t_dot(q.view());
        let gram = bt.t().dot(&bt);
        let (values, vectors) = symmetric_eigen(&gram);
        let singular = values.mapv(|v| v.max(0.0).sqrt());
        let s_max = singular.iter().copied().fold(0.0, f64::max);
        let available = singular
            .iter()
            .filter(|&&v| s_max > 0.0 && v > RANK_TOLERANCE * s_max)
            .count();
        if k > available {
            return Err(AnnotateError::InvalidComponentCount {
                requested: k,
                available,
            });
        }
        debug!(rows = n, cols = d, oversampled = l, "randomized range found");

        let mut coordinates = q.dot(&vectors.slice(s![.., ..k]));
        for (mut column, &sigma) in coordinates.columns_mut().into_iter().zip(singular.iter()) {
            column *= sigma;
        }

        let total = total_variance(matrix);
        let variances = column_variances(&coordinates);
        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| variances[b].total_cmp(&variances[a]).then(a.cmp(&b)));

        let mut sorted = Array2::zeros((n, k));
        for (dst, &src) in order.iter().enumerate() {
            sorted.column_mut(dst).assign(&coordinates.column(src));
        }
        let ratios: Vec<f64> = order
            .iter()
            .map(|&i| if total > 0.0 { variances[i] / total } else { 0.0 })
            .collect();
        info!(components = k, ratios = ?ratios, "truncated svd projection");
        Ok(ReducedProjection::new(sorted, ratios))
    }
}

/// Sum of the population variances of every column of a sparse matrix
fn total_variance(matrix: &TfIdfMatrix) -> f64 {
    let n = matrix.n_rows();
    if n == 0 {
        return 0.0;
    }
    let mut sum = vec![0.0; matrix.n_cols()];
    let mut sum_sq = vec![0.0; matrix.n_cols()];
    for (&v, (_, c)) in matrix.matrix().iter() {
        sum[c] += v;
        sum_sq[c] += v * v;
    }
    let n = n as f64;
    sum.iter()
        .zip(&sum_sq)
        .map(|(s, sq)| (sq / n - (s / n) * (s / n)).max(0.0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::tfidf::TfIdfVectorizer;

    fn texts() -> Vec<&'static str> {
        vec![
            "border wall immigration border",
            "immigration visa border wall",
            "wall border visa",
            "healthcare insurance premium cost",
            "insurance cost healthcare",
            "premium healthcare insurance",
        ]
    }

    #[test]
    fn ratios_are_ordered_and_bounded() {
        let m = TfIdfVectorizer::new().fit_transform(&texts());
        let p = TruncatedSvd::new(2).fit_transform(&m).unwrap();
        let r = p.explained_variance_ratio();
        assert_eq!(p.n_rows(), 6);
        assert!(r.iter().all(|&x| x >= 0.0));
        assert!(r[0] >= r[1]);
        assert!(r.iter().sum::<f64>() <= 1.0 + 1e-9);
    }

    #[test]
    fn seeded_runs_agree() {
        let m = TfIdfVectorizer::new().fit_transform(&texts());
        let a = TruncatedSvd::new(2).with_seed(7).fit_transform(&m).unwrap();
        let b = TruncatedSvd::new(2).with_seed(7).fit_transform(&m).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn clusters_separate() {
        let m = TfIdfVectorizer::new().fit_transform(&texts());
        let p = TruncatedSvd::new(2).fit_transform(&m).unwrap();
        let between = p.separation(&[0, 1, 2], &[3, 4, 5]).unwrap();
        let within = p.separation(&[0], &[1]).unwrap();
        assert!(between > within);
    }

    #[test]
    fn too_many_components() {
        let m = TfIdfVectorizer::new().fit_transform(&["alpha beta", "alpha beta"]);
        assert!(matches!(
            TruncatedSvd::new(2).fit_transform(&m),
            Err(AnnotateError::InvalidComponentCount { .. })
        ));
    }
}
