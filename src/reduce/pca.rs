use ndarray::{s, Array2, Axis};
use tracing::{debug, info};

use super::{FillPolicy, ReducedProjection, RANK_TOLERANCE};
use crate::{
    aggregate::TopicScoreMatrix,
    config::ReductionConfig,
    error::{AnnotateError, Result},
    utils::linalg::{column_means, column_variances, symmetric_eigen},
};

/// Principal component analysis of a topic score matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Pca {
    n_components: usize,
    standardize: bool,
    fill: FillPolicy,
}

impl Pca {
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            standardize: false,
            fill: FillPolicy::Zero,
        }
    }

    pub fn from_config(config: &ReductionConfig) -> Self {
        Self::new(config.n_components).with_standardize(config.standardize)
    }

    /// Scale every column to unit population variance after centering
    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    pub fn with_fill(mut self, fill: FillPolicy) -> Self {
        self.fill = fill;
        self
    }

    /// Project the rows of a score matrix (missing cells filled per the fill policy)
    pub fn fit_transform(&self, matrix: &TopicScoreMatrix) -> Result<ReducedProjection> {
        self.fit_transform_dense(&self.fill.fill(matrix))
    }

    /// Project the rows of a dense (samples, features) matrix
    ///
    /// # Errors
    /// * `InvalidParameter` - zero components requested
    /// * `InvalidComponentCount` - more components than non-zero variance dimensions
    pub fn fit_transform_dense(&self, data: &Array2<f64>) -> Result<ReducedProjection> {
        if self.n_components == 0 {
            return Err(AnnotateError::InvalidParameter {
                name: "n_components",
                reason: "must be at least 1".to_string(),
            });
        }
        let n = data.nrows();
        let mut x = data - &column_means(data);
        if self.standardize {
            let std = column_variances(data).mapv(|v| if v > 0.0 { v.sqrt() } else { 1.0 });
            x /= &std;
        }

        let denom = if n > 1 { (n - 1) as f64 } else { 1.0 };
        let cov = x.t().dot(&x) / denom;
        let (values, vectors) = symmetric_eigen(&cov);
        let values = values.mapv(|v| v.max(0.0));

        let max = values.iter().copied().fold(0.0, f64::max);
        let available = values.iter().filter(|&&v| max > 0.0 && v > RANK_TOLERANCE * max).count();
        if self.n_components > available {
            return Err(AnnotateError::InvalidComponentCount {
                requested: self.n_components,
                available,
            });
        }

        let total: f64 = values.sum();
        let k = self.n_components;
        let ratios: Vec<f64> = values.iter().take(k).map(|v| v / total).collect();
        let basis = vectors.slice(s![.., ..k]);
        let coordinates = x.dot(&basis);
        debug!(samples = n, features = data.len_of(Axis(1)), "pca covariance decomposed");
        info!(components = k, ratios = ?ratios, "pca projection");
        Ok(ReducedProjection::new(coordinates, ratios))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn dominant_axis_first() {
        // spread along x much larger than along y
        let data = array![[-4.0, 0.5], [-2.0, -0.5], [2.0, -0.5], [4.0, 0.5]];
        let p = Pca::new(2).fit_transform_dense(&data).unwrap();
        let r = p.explained_variance_ratio();
        assert!(r[0] >= r[1] && r[1] >= 0.0);
        assert!((r.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(r[0] > 0.9);
        // first axis is x up to sign
        assert!((p.coordinates()[[0, 0]].abs() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn rank_deficient_request_fails() {
        let data = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        assert!(Pca::new(1).fit_transform_dense(&data).is_ok());
        assert!(matches!(
            Pca::new(2).fit_transform_dense(&data),
            Err(AnnotateError::InvalidComponentCount { requested: 2, available: 1 })
        ));
    }

    #[test]
    fn standardize_handles_constant_column() {
        let data = array![[1.0, 7.0, 0.0], [2.0, 7.0, 10.0], [3.0, 7.0, 30.0]];
        let p = Pca::new(2).with_standardize(true).fit_transform_dense(&data).unwrap();
        assert_eq!(p.n_components(), 2);
        assert!(p.coordinates().iter().all(|v| v.is_finite()));
    }
}
