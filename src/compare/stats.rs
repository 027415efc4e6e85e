//! Two-sample t-test and the special functions behind its p-value.

use serde::{Deserialize, Serialize};

use crate::utils::math::{mean, sample_variance};

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

const CF_MAX_ITER: usize = 300;
const CF_EPS: f64 = 1e-15;
const CF_TINY: f64 = 1e-300;

/// Outcome of an independent two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTest {
    pub statistic: f64,
    /// two-tailed
    pub pvalue: f64,
    pub df: f64,
}

/// Independent two-sample t-test
///
/// # Arguments
/// * `a`, `b` - samples, at least 2 observations each
/// * `equal_var` - pooled variance (Student) when true, Welch otherwise
///
/// # Returns
/// * `Option<TTest>` - `None` when either sample has fewer than 2 observations.
///   Two samples without any spread yield `t = 0, p = 1` for equal means and an
///   infinite statistic with `p = 0` otherwise.
pub fn ttest_ind(a: &[f64], b: &[f64], equal_var: bool) -> Option<TTest> {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (m1, m2) = (mean(a)?, mean(b)?);
    let (v1, v2) = (sample_variance(a)?, sample_variance(b)?);

    let (se, df) = if equal_var {
        let df = n1 + n2 - 2.0;
        let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
        ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
    } else {
        let (q1, q2) = (v1 / n1, v2 / n2);
        let denom = q1 * q1 / (n1 - 1.0) + q2 * q2 / (n2 - 1.0);
        let df = if denom > 0.0 {
            (q1 + q2).powi(2) / denom
        } else {
            n1 + n2 - 2.0
        };
        ((q1 + q2).sqrt(), df)
    };

    let diff = m1 - m2;
    if se == 0.0 {
        return Some(if diff == 0.0 {
            TTest { statistic: 0.0, pvalue: 1.0, df }
        } else {
            TTest {
                statistic: diff.signum() * f64::INFINITY,
                pvalue: 0.0,
                df,
            }
        });
    }
    let statistic = diff / se;
    Some(TTest {
        statistic,
        pvalue: student_t_two_tailed(statistic, df),
        df,
    })
}

/// `P(|T| >= |t|)` for Student's t with `df` degrees of freedom
pub fn student_t_two_tailed(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// ln Γ(x) for x > 0 (Lanczos)
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // reflection
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS[0], |acc, (i, c)| acc + c / (x + i as f64 + 1.0));
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// I_x(a, b)
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// continued fraction of the incomplete beta (modified Lentz)
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    let tiny = |v: f64| if v.abs() < CF_TINY { CF_TINY } else { v };
    let (qab, qap, qam) = (a + b, a + 1.0, a - 1.0);
    let mut c = 1.0;
    let mut d = 1.0 / tiny(1.0 - qab * x / qap);
    let mut h = d;
    for m in 1..=CF_MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / tiny(1.0 + aa * d);
        c = tiny(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / tiny(1.0 + aa * d);
        c = tiny(1.0 + aa / c);
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < CF_EPS {
            break;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_values() {
        assert!((ln_gamma(1.0)).abs() < 1e-12);
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-10);
    }

    #[test]
    fn t_distribution_tails() {
        // df = 1 is Cauchy: P(|T| >= 1) = 0.5
        assert!((student_t_two_tailed(1.0, 1.0) - 0.5).abs() < 1e-9);
        assert!((student_t_two_tailed(0.0, 7.0) - 1.0).abs() < 1e-12);
        // t(10) critical value 2.228 at 5%
        assert!((student_t_two_tailed(2.228_138_851_986_273_5, 10.0) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn student_and_welch() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let student = ttest_ind(&a, &b, true).unwrap();
        assert!((student.statistic - (-1.8973665961)).abs() < 1e-8);
        assert_eq!(student.df, 8.0);
        assert!((student.pvalue - 0.0943497).abs() < 1e-5);

        let welch = ttest_ind(&a, &b, false).unwrap();
        assert!((welch.statistic - student.statistic).abs() < 1e-12);
        assert!(welch.df < 8.0);
        assert!(welch.pvalue > student.pvalue);
    }

    #[test]
    fn degenerate_samples() {
        assert_eq!(ttest_ind(&[1.0], &[1.0, 2.0], true), None);
        let same = ttest_ind(&[0.5, 0.5], &[0.5, 0.5], true).unwrap();
        assert_eq!((same.statistic, same.pvalue), (0.0, 1.0));
        let apart = ttest_ind(&[0.1, 0.1], &[0.9, 0.9], false).unwrap();
        assert_eq!(apart.statistic, f64::NEG_INFINITY);
        assert_eq!(apart.pvalue, 0.0);
    }
}
