use ndarray::{Array1, Array2, Axis};

const MAX_SWEEPS: usize = 100;

/// Eigen-decomposition of a symmetric matrix (cyclic Jacobi rotations)
///
/// # Arguments
/// * `matrix` - symmetric (n, n) matrix, only symmetry is assumed
///
/// # Returns
/// * `(Array1<f64>, Array2<f64>)` - eigenvalues in descending order and the
///   matching unit eigenvectors as columns. Each eigenvector is oriented so its
///   largest-magnitude entry is positive.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = matrix.nrows();
    debug_assert_eq!(n, matrix.ncols(), "matrix must be square");
    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[[p, q]] * a[[p, q]])
            .sum();
        if off.sqrt() <= 1e-15 * scale || off == 0.0 {
            break;
        }
        for p in 0..n {
            for q in p + 1..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // A <- Jᵀ A J, V <- V J
                for k in 0..n {
                    let (akp, akq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let (vkp, vkq) = (v[[k, p]], v[[k, q]]);
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]).then(i.cmp(&j)));

    let values = Array1::from_iter(order.iter().map(|&i| a[[i, i]]));
    let mut vectors = Array2::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        let mut column = v.column(src).to_owned();
        orient(&mut column);
        vectors.column_mut(dst).assign(&column);
    }
    (values, vectors)
}

/// flip so the largest-magnitude entry is positive
fn orient(column: &mut Array1<f64>) {
    let pivot = column
        .iter()
        .copied()
        .fold(0.0f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        column.mapv_inplace(|x| -x);
    }
}

/// Orthonormalize the columns in place (modified Gram-Schmidt)
/// linearly dependent columns end up as zero columns
pub fn orthonormalize(m: &mut Array2<f64>) {
    let k = m.ncols();
    for j in 0..k {
        for i in 0..j {
            let (left, mut right) = m.view_mut().split_at(Axis(1), j);
            let qi = left.column(i);
            let mut qj = right.column_mut(0);
            let proj = qi.dot(&qj);
            qj.scaled_add(-proj, &qi);
        }
        let mut qj = m.column_mut(j);
        let norm = qj.dot(&qj).sqrt();
        if norm > 1e-12 {
            qj.mapv_inplace(|x| x / norm);
        } else {
            qj.fill(0.0);
        }
    }
}

/// Column means
pub fn column_means(m: &Array2<f64>) -> Array1<f64> {
    if m.nrows() == 0 {
        return Array1::zeros(m.ncols());
    }
    m.sum_axis(Axis(0)) / m.nrows() as f64
}

/// Population variance per column
pub fn column_variances(m: &Array2<f64>) -> Array1<f64> {
    let means = column_means(m);
    if m.nrows() == 0 {
        return means;
    }
    let centered = m - &means;
    centered.mapv(|x| x * x).sum_axis(Axis(0)) / m.nrows() as f64
}
