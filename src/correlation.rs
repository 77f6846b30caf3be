//! Correlation analysis.
//!
//! Pearson and Spearman coefficients. Both degrade to 0 rather than failing
//! when the coefficient is undefined: lengths differ, fewer than 2 pairs,
//! or either series has (near) zero variance.
//!
//! # Examples
//!
//! ```
//! use u_quality::correlation::{correlation, spearman};
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.0, 4.0, 5.0, 4.0, 5.0];
//! assert!(correlation(&x, &y) > 0.7);
//! assert!(spearman(&x, &y) > 0.7);
//! assert_eq!(correlation(&x, &y[..4]), 0.0);
//! ```

use crate::descriptive::{covariance, std_dev, NEAR_ZERO};

// ---------------------------------------------------------------------------
// Pearson
// ---------------------------------------------------------------------------

/// Pearson product-moment correlation in [-1, 1].
///
/// r = cov(x, y) / (s_x · s_y)
///
/// Each series is divided by its largest magnitude before the moments are
/// taken, so values near the ends of the `f64` range do not overflow.
/// The near-zero spread check applies to the unscaled data.
///
/// # References
///
/// Pearson (1895). "Note on regression and inheritance in the case of
/// two parents". Proceedings of the Royal Society of London, 58, 240–242.
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    if std_dev(x) < NEAR_ZERO || std_dev(y) < NEAR_ZERO {
        return 0.0;
    }

    let xs = scaled(x);
    let ys = scaled(y);
    let cov = covariance(&xs, &ys);
    let sx = std_dev(&xs);
    let sy = std_dev(&ys);
    if sx == 0.0 || sy == 0.0 {
        return 0.0;
    }

    (cov / (sx * sy)).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Spearman
// ---------------------------------------------------------------------------

/// Spearman rank correlation: Pearson on mid-ranks.
///
/// # References
///
/// Spearman (1904). "The proof and measurement of association between two
/// things". The American Journal of Psychology, 15(1), 72–101.
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    correlation(&rank_data(x), &rank_data(y))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// `data` divided by its largest magnitude; unchanged when that is 0.
fn scaled(data: &[f64]) -> Vec<f64> {
    let peak = data.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if peak == 0.0 || !peak.is_finite() {
        return data.to_vec();
    }
    data.iter().map(|v| v / peak).collect()
}

/// Ranks data using the mid-rank method for ties.
///
/// Returns a Vec of ranks (1-based). Tied values receive the average rank.
fn rank_data(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    let mut indexed: Vec<(usize, f64)> = data.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && indexed[j].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 0.5;
        for item in &indexed[i..j] {
            ranks[item.0] = avg_rank;
        }
        i = j;
    }
    ranks
}
