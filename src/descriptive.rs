//! Descriptive statistics.
//!
//! Location, spread, percentiles, and shape of a dataset. A dataset is an
//! ordered sequence of `f64`; order matters only to the trend and SPC
//! modules, never to the statistics here.
//!
//! # Examples
//!
//! ```
//! use u_quality::descriptive::summary;
//!
//! let data: Vec<f64> = (1..=10).map(f64::from).collect();
//! let s = summary(&data).unwrap();
//! assert_eq!(s.mean, 5.5);
//! assert_eq!(s.median, 5.5);
//! assert!(s.min <= s.median && s.median <= s.max);
//! ```

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::error::{AnalyticsError, Result};

/// Standard deviations below this are treated as zero.
pub const NEAR_ZERO: f64 = 1e-10;

/// First, second, and third quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    /// 25th percentile.
    pub q1: f64,
    /// 50th percentile.
    pub q2: f64,
    /// 75th percentile.
    pub q3: f64,
}

impl Quartiles {
    /// Interquartile range Q3 − Q1.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Summary statistics of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSummary {
    /// Number of observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// 50th percentile.
    pub median: f64,
    /// Sample variance (n − 1 denominator); 0 when n < 2.
    pub variance: f64,
    /// Square root of `variance`.
    pub std_dev: f64,
    /// Smallest observation.
    pub min: f64,
    /// Largest observation.
    pub max: f64,
    /// Q1, Q2, Q3.
    pub quartiles: Quartiles,
    /// Mean of standardized cubes; 0 when `std_dev` ≈ 0.
    pub skewness: f64,
    /// Mean of standardized fourth powers minus 3; 0 when `std_dev` ≈ 0.
    pub kurtosis: f64,
}

impl StatisticalSummary {
    /// `max − min`.
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Computes the full summary of `data`.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `data` is empty.
pub fn summary(data: &[f64]) -> Result<StatisticalSummary> {
    let m = stats::mean(data).ok_or(AnalyticsError::EmptyInput {
        context: "summary dataset",
    })?;
    let variance = variance(data);
    let std_dev = variance.sqrt();
    let (skewness, kurtosis) = shape(data, m, std_dev);

    let quartiles = Quartiles {
        q1: quantile(data, 0.25),
        q2: quantile(data, 0.50),
        q3: quantile(data, 0.75),
    };

    tracing::debug!(count = data.len(), mean = m, std_dev, "computed summary");

    Ok(StatisticalSummary {
        count: data.len(),
        mean: m,
        median: quartiles.q2,
        variance,
        std_dev,
        min: stats::min(data).unwrap_or(m),
        max: stats::max(data).unwrap_or(m),
        quartiles,
        skewness,
        kurtosis,
    })
}

/// Arithmetic mean.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `data` is empty.
pub fn mean(data: &[f64]) -> Result<f64> {
    stats::mean(data).ok_or(AnalyticsError::EmptyInput { context: "mean" })
}

/// Sample variance with Bessel's correction; 0 when fewer than 2 points.
pub fn variance(data: &[f64]) -> f64 {
    stats::variance(data).unwrap_or(0.0)
}

/// Sample standard deviation; 0 when fewer than 2 points.
pub fn std_dev(data: &[f64]) -> f64 {
    stats::std_dev(data).unwrap_or(0.0)
}

/// Sample covariance (n − 1 denominator).
///
/// Returns 0 when lengths differ or fewer than 2 pairs are given.
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        return 0.0;
    }
    stats::covariance(x, y).unwrap_or(0.0)
}

/// Linearly interpolated percentile, `p` in [0, 100].
///
/// The rank is `(n − 1)·p/100`; the value interpolates between the order
/// statistics at its floor and ceiling.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `data` is empty,
/// [`AnalyticsError::InvalidParameter`] when `p` is outside [0, 100].
pub fn percentile(data: &[f64], p: f64) -> Result<f64> {
    if data.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            context: "percentile dataset",
        });
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(AnalyticsError::InvalidParameter {
            message: format!("percentile must be in [0, 100], got {p}"),
        });
    }
    Ok(quantile(data, p / 100.0))
}

/// Standardized values `(x − mean)/std_dev`; all zeros when `std_dev` ≈ 0.
pub fn z_scores(data: &[f64]) -> Vec<f64> {
    let Some(m) = stats::mean(data) else {
        return Vec::new();
    };
    let sd = std_dev(data);
    if sd < NEAR_ZERO {
        return vec![0.0; data.len()];
    }
    data.iter().map(|&x| (x - m) / sd).collect()
}

/// `std_dev / |mean|`.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `data` is empty,
/// [`AnalyticsError::ZeroDenominator`] when the mean is zero.
pub fn coefficient_of_variation(data: &[f64]) -> Result<f64> {
    let m = mean(data)?;
    if m == 0.0 {
        return Err(AnalyticsError::ZeroDenominator {
            context: "mean in coefficient of variation",
        });
    }
    Ok(std_dev(data) / m.abs())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Quantile at `q` in [0, 1] of non-empty data; NaN when empty.
pub(crate) fn quantile(data: &[f64], q: f64) -> f64 {
    stats::quantile(data, q).unwrap_or(f64::NAN)
}

/// Skewness and excess kurtosis as means of standardized powers.
fn shape(data: &[f64], m: f64, sd: f64) -> (f64, f64) {
    if sd < NEAR_ZERO {
        return (0.0, 0.0);
    }
    let n = data.len() as f64;
    let (s3, s4) = data.iter().fold((0.0, 0.0), |(s3, s4), &x| {
        let z = (x - m) / sd;
        let z2 = z * z;
        (s3 + z2 * z, s4 + z2 * z2)
    });
    (s3 / n, s4 / n - 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_one_to_ten() {
        let data: Vec<f64> = (1..=10).map(f64::from).collect();
        let s = summary(&data).expect("non-empty");
        assert_eq!(s.count, 10);
        assert_eq!(s.mean, 5.5);
        assert_eq!(s.median, 5.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 10.0);
        assert!((s.variance - 55.0 / 6.0).abs() < 1e-12);
        assert!((s.quartiles.q1 - 3.25).abs() < 1e-12);
        assert!((s.quartiles.q3 - 7.75).abs() < 1e-12);
        assert!(s.skewness.abs() < 1e-12, "symmetric data has no skew");
        assert_eq!(s.range(), 9.0);
    }

    #[test]
    fn summary_empty_is_error() {
        assert!(matches!(
            summary(&[]),
            Err(AnalyticsError::EmptyInput { .. })
        ));
    }

    #[test]
    fn single_point_has_zero_spread() {
        let s = summary(&[42.0]).expect("non-empty");
        assert_eq!(s.variance, 0.0);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.skewness, 0.0);
        assert_eq!(s.kurtosis, 0.0);
        assert_eq!(s.quartiles.q1, 42.0);
        assert_eq!(s.quartiles.q3, 42.0);
    }

    #[test]
    fn constant_data_has_zero_shape() {
        let s = summary(&[3.0; 8]).expect("non-empty");
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.skewness, 0.0);
        assert_eq!(s.kurtosis, 0.0);
    }

    #[test]
    fn right_tail_gives_positive_skew() {
        let s = summary(&[1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 10.0]).expect("non-empty");
        assert!(s.skewness > 0.5, "skewness = {}", s.skewness);
    }

    #[test]
    fn uniform_data_is_platykurtic() {
        let data: Vec<f64> = (0..100).map(f64::from).collect();
        let s = summary(&data).expect("non-empty");
        assert!(s.kurtosis < -1.0, "kurtosis = {}", s.kurtosis);
    }

    #[test]
    fn order_does_not_matter() {
        let a = summary(&[5.0, 1.0, 4.0, 2.0, 3.0]).expect("non-empty");
        let b = summary(&[1.0, 2.0, 3.0, 4.0, 5.0]).expect("non-empty");
        assert_eq!(a.median, b.median);
        assert_eq!(a.quartiles, b.quartiles);
        assert_eq!(a.min, b.min);
    }

    #[test]
    fn percentile_interpolates() {
        let data = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&data, 0.0).expect("ok"), 10.0);
        assert_eq!(percentile(&data, 100.0).expect("ok"), 40.0);
        // rank = 3 · 0.5 = 1.5 → halfway between 20 and 30
        assert_eq!(percentile(&data, 50.0).expect("ok"), 25.0);
        assert!(percentile(&data, 101.0).is_err());
        assert!(percentile(&[], 50.0).is_err());
    }

    #[test]
    fn covariance_basics() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((covariance(&x, &y) - 2.0 * variance(&x)).abs() < 1e-12);
        assert_eq!(covariance(&x, &y[..3]), 0.0);
        assert_eq!(covariance(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn z_scores_are_standardized() {
        let z = z_scores(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let m: f64 = z.iter().sum::<f64>() / z.len() as f64;
        assert!(m.abs() < 1e-12);
        assert!((std_dev(&z) - 1.0).abs() < 1e-12);
        assert_eq!(z_scores(&[1.0, 1.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn coefficient_of_variation_rejects_zero_mean() {
        assert!(matches!(
            coefficient_of_variation(&[-1.0, 1.0]),
            Err(AnalyticsError::ZeroDenominator { .. })
        ));
        let cv = coefficient_of_variation(&[10.0, 12.0, 8.0]).expect("ok");
        assert!((cv - 0.2).abs() < 1e-12);
    }
}
