use num::Float;

/// ドット積
///
/// # Arguments
/// * `a`, `b` - vectors of the same length
#[inline]
pub fn dot<F: Float>(a: &[F], b: &[F]) -> F {
    debug_assert_eq!(a.len(), b.len(), "Vectors must be of the same length to compute dot product.");
    a.iter().zip(b).fold(F::zero(), |acc, (&x, &y)| acc + x * y)
}

/// L2ノルム
#[inline]
pub fn l2_norm<F: Float>(a: &[F]) -> F {
    dot(a, a).sqrt()
}

/// Scale `a` to unit length, a zero vector is left unchanged
pub fn normalize<F: Float>(a: &mut [F]) {
    let norm = l2_norm(a);
    if norm > F::zero() {
        a.iter_mut().for_each(|x| *x = *x / norm);
    }
}

/// コサイン類似度
/// 0 when either vector has zero length
#[inline]
pub fn cosine_similarity<F: Float>(a: &[F], b: &[F]) -> F {
    let denom = l2_norm(a) * l2_norm(b);
    if denom > F::zero() {
        dot(a, b) / denom
    } else {
        F::zero()
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean<F: Float>(xs: &[F]) -> Option<F> {
    if xs.is_empty() {
        return None;
    }
    let n = F::from(xs.len())?;
    Some(xs.iter().fold(F::zero(), |acc, &x| acc + x) / n)
}

/// Unbiased sample variance (n - 1 denominator), `None` below 2 values
pub fn sample_variance<F: Float>(xs: &[F]) -> Option<F> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    let ss = xs.iter().fold(F::zero(), |acc, &x| acc + (x - m) * (x - m));
    Some(ss / F::from(xs.len() - 1)?)
}
