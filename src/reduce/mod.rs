pub mod pca;
pub mod svd;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::aggregate::TopicScoreMatrix;

pub use pca::Pca;
pub use svd::TruncatedSvd;

/// Eigenvalues below this fraction of the largest one count as zero dimensions
pub(crate) const RANK_TOLERANCE: f64 = 1e-10;

/// How missing topic cells enter a dense projection
///
/// Filling changes meaning ("topic absent" becomes "neutral"), the result is
/// only fit for visualization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillPolicy {
    /// missing cells become 0.0
    #[default]
    Zero,
}

impl FillPolicy {
    /// Dense (rows, topics) matrix of a score matrix
    pub fn fill(&self, matrix: &TopicScoreMatrix) -> Array2<f64> {
        let mut dense = Array2::zeros((matrix.n_rows(), matrix.n_cols()));
        for (r, row) in matrix.rows().iter().enumerate() {
            for (c, cell) in row.cells.iter().enumerate() {
                dense[[r, c]] = match self {
                    FillPolicy::Zero => cell.unwrap_or(0.0),
                };
            }
        }
        dense
    }
}

/// Low-dimensional coordinates of every input row
///
/// Axes are ordered by explained variance. The sign of an axis is arbitrary,
/// compare groups through [`ReducedProjection::separation`] rather than raw
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedProjection {
    coordinates: Array2<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl ReducedProjection {
    pub(crate) fn new(coordinates: Array2<f64>, explained_variance_ratio: Vec<f64>) -> Self {
        debug_assert_eq!(coordinates.ncols(), explained_variance_ratio.len());
        Self {
            coordinates,
            explained_variance_ratio,
        }
    }

    /// (rows, components) coordinates
    pub fn coordinates(&self) -> &Array2<f64> {
        &self.coordinates
    }

    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    pub fn n_rows(&self) -> usize {
        self.coordinates.nrows()
    }

    pub fn n_components(&self) -> usize {
        self.coordinates.ncols()
    }

    /// Coordinates of one row
    pub fn point(&self, row: usize) -> Option<Vec<f64>> {
        (row < self.n_rows()).then(|| self.coordinates.row(row).to_vec())
    }

    /// Mean point of the given rows, `None` for an empty or out-of-range selection
    pub fn centroid(&self, rows: &[usize]) -> Option<Array1<f64>> {
        if rows.is_empty() || rows.iter().any(|&r| r >= self.n_rows()) {
            return None;
        }
        self.coordinates.select(Axis(0), rows).mean_axis(Axis(0))
    }

    /// Euclidean distance between the centroids of two row groups
    /// invariant under axis sign flips
    pub fn separation(&self, a: &[usize], b: &[usize]) -> Option<f64> {
        let ca = self.centroid(a)?;
        let cb = self.centroid(b)?;
        Some((&ca - &cb).mapv(|x| x * x).sum().sqrt())
    }
}
