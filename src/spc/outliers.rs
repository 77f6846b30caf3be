//! Outlier detection by Tukey fences or z-scores.
//!
//! # Examples
//!
//! ```
//! use u_quality::spc::{detect_outliers, OutlierMethod};
//!
//! let report = detect_outliers(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], OutlierMethod::Iqr);
//! assert_eq!(report.indices, vec![5]);
//! assert_eq!(report.values, vec![100.0]);
//! ```

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::config::SpcConfig;
use crate::descriptive::{std_dev, NEAR_ZERO};

/// How outliers are identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Outside [Q1 − m·IQR, Q3 + m·IQR] (m = 1.5 by default).
    Iqr,
    /// |x − x̄| / s above a threshold (3 by default).
    ZScore,
}

/// Points flagged as outliers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    /// Indices of flagged points, ascending.
    pub indices: Vec<usize>,
    /// Flagged values, aligned with `indices`.
    pub values: Vec<f64>,
    /// `(lower, upper)` acceptance bounds; `None` when no bounds could be
    /// formed (empty data, or zero spread for the z-score method).
    pub bounds: Option<(f64, f64)>,
}

impl OutlierReport {
    /// Number of flagged points.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether nothing was flagged.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Detects outliers with default multipliers.
///
/// See [`detect_outliers_with`].
pub fn detect_outliers(data: &[f64], method: OutlierMethod) -> OutlierReport {
    detect_outliers_with(data, method, &SpcConfig::default())
}

/// Detects outliers in `data`.
///
/// # Algorithm
///
/// - [`OutlierMethod::Iqr`]: quartiles by linear interpolation; a point is
///   flagged when strictly outside Q1 − m·IQR or Q3 + m·IQR, with
///   m = `config.iqr_multiplier`.
/// - [`OutlierMethod::ZScore`]: a point is flagged when
///   |x − x̄| / s > `config.zscore_threshold`. Nothing is flagged when
///   s < 10⁻¹⁰.
///
/// Empty data yields an empty report.
///
/// # References
///
/// Tukey, J.W. (1977). *Exploratory Data Analysis*. Addison-Wesley.
pub fn detect_outliers_with(
    data: &[f64],
    method: OutlierMethod,
    config: &SpcConfig,
) -> OutlierReport {
    let Some(m) = stats::mean(data) else {
        return OutlierReport::default();
    };

    let report = match method {
        OutlierMethod::Iqr => {
            let (Some(q1), Some(q3)) = (stats::quantile(data, 0.25), stats::quantile(data, 0.75))
            else {
                return OutlierReport::default();
            };
            let fence = config.iqr_multiplier * (q3 - q1);
            let (lower, upper) = (q1 - fence, q3 + fence);
            collect(data, (lower, upper), |x| x < lower || x > upper)
        }
        OutlierMethod::ZScore => {
            let sd = std_dev(data);
            if sd < NEAR_ZERO {
                return OutlierReport::default();
            }
            let k = config.zscore_threshold;
            collect(data, (m - k * sd, m + k * sd), |x| (x - m).abs() / sd > k)
        }
    };

    tracing::debug!(
        n = data.len(),
        ?method,
        flagged = report.len(),
        "outlier detection"
    );
    report
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn collect(data: &[f64], bounds: (f64, f64), is_outlier: impl Fn(f64) -> bool) -> OutlierReport {
    let (indices, values) = data
        .iter()
        .enumerate()
        .filter(|&(_, &x)| is_outlier(x))
        .map(|(i, &x)| (i, x))
        .unzip();
    OutlierReport {
        indices,
        values,
        bounds: Some(bounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iqr_flags_extreme_value() {
        let r = detect_outliers(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], OutlierMethod::Iqr);
        assert_eq!(r.indices, vec![5]);
        assert_eq!(r.values, vec![100.0]);
        // Q1 = 2.25, Q3 = 4.75, IQR = 2.5
        let (lo, hi) = r.bounds.expect("bounds");
        assert!((lo - (-1.5)).abs() < 1e-12);
        assert!((hi - 8.5).abs() < 1e-12);
    }

    #[test]
    fn iqr_flags_both_tails() {
        let data = [-50.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 80.0];
        let r = detect_outliers(&data, OutlierMethod::Iqr);
        assert_eq!(r.indices, vec![0, 7]);
    }

    #[test]
    fn zscore_needs_large_sample_to_flag() {
        // With n = 6 a single point cannot reach |z| > 3.
        let small = detect_outliers(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], OutlierMethod::ZScore);
        assert!(small.is_empty());
        assert!(small.bounds.is_some());

        let mut data = vec![10.0; 20];
        data.extend([10.5, 9.5, 10.2, 9.8]);
        data.push(40.0);
        let r = detect_outliers(&data, OutlierMethod::ZScore);
        assert_eq!(r.indices, vec![24]);
    }

    #[test]
    fn zscore_zero_spread_is_empty() {
        let r = detect_outliers(&[3.0; 10], OutlierMethod::ZScore);
        assert!(r.is_empty());
        assert_eq!(r.bounds, None);
    }

    #[test]
    fn empty_data_is_empty_report() {
        assert_eq!(detect_outliers(&[], OutlierMethod::Iqr), OutlierReport::default());
        assert_eq!(detect_outliers(&[], OutlierMethod::ZScore).len(), 0);
    }

    #[test]
    fn multiplier_is_configurable() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 7.5];
        assert!(detect_outliers(&data, OutlierMethod::Iqr).is_empty());
        let tight = SpcConfig {
            iqr_multiplier: 0.5,
            ..SpcConfig::default()
        };
        assert_eq!(
            detect_outliers_with(&data, OutlierMethod::Iqr, &tight).indices,
            vec![5]
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn flagged_points_lie_outside_bounds(
            data in proptest::collection::vec(-1e3_f64..1e3, 1..=80),
            zscore in any::<bool>(),
        ) {
            let method = if zscore { OutlierMethod::ZScore } else { OutlierMethod::Iqr };
            let r = detect_outliers(&data, method);
            prop_assert_eq!(r.indices.len(), r.values.len());
            if let Some((lo, hi)) = r.bounds {
                for (&i, &v) in r.indices.iter().zip(&r.values) {
                    prop_assert_eq!(data[i].to_bits(), v.to_bits());
                    if method == OutlierMethod::Iqr {
                        prop_assert!(v < lo || v > hi);
                    }
                }
            }
        }
    }
}
