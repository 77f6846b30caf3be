//! Individuals control chart.
//!
//! Builds control limits for a flat series of observations, applies the
//! run rules of [`super::rules`], and reports a simple capability ratio.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use super::rules::{fires, BeyondLimits, MonotoneTrend, RunRule, SameSideRun};
use crate::config::SpcConfig;
use crate::descriptive::{std_dev, NEAR_ZERO};
use crate::error::{AnalyticsError, Result};

/// Control limits for a chart.
///
/// # Invariants
///
/// - `lcl <= ucl`
/// - `cl` is the mean of the charted data, which may fall outside
///   caller-supplied limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Upper control limit.
    pub ucl: f64,
    /// Center line (process mean).
    pub cl: f64,
    /// Lower control limit.
    pub lcl: f64,
}

/// Types of control chart violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// Point strictly beyond the control limits.
    BeyondLimits,
    /// Run of points strictly on one side of the center line.
    Run,
    /// Run of strictly increasing or strictly decreasing points.
    Trend,
}

/// A violation detected on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The index of the point where the violation was detected.
    pub point_index: usize,
    /// The type of violation.
    pub violation_type: ViolationType,
}

/// Result of charting a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlChart {
    /// Mean of the data.
    pub center_line: f64,
    /// Upper control limit.
    pub upper_limit: f64,
    /// Lower control limit.
    pub lower_limit: f64,
    /// Indices of points strictly beyond the limits.
    pub out_of_control_indices: BTreeSet<usize>,
    /// Whether a same-side run of the configured length occurred.
    pub run_violation: bool,
    /// Whether a monotone trend of the configured length occurred.
    pub trend_violation: bool,
    /// (upper − lower) / (6σ); 0 when σ ≈ 0.
    pub capability_index: f64,
    /// Every rule hit, ordered by point index then rule.
    pub violations: Vec<Violation>,
}

impl ControlChart {
    /// Control limits as a [`ControlLimits`] triple.
    pub fn limits(&self) -> ControlLimits {
        ControlLimits {
            ucl: self.upper_limit,
            cl: self.center_line,
            lcl: self.lower_limit,
        }
    }

    /// No point beyond the limits, no run, and no trend.
    pub fn is_in_control(&self) -> bool {
        self.out_of_control_indices.is_empty() && !self.run_violation && !self.trend_violation
    }
}

/// Charts `data` with default rule settings and `sigma_k`-sigma limits.
///
/// See [`control_chart_with`].
///
/// # Examples
///
/// ```
/// use u_quality::spc::control_chart;
///
/// let data = [98.5, 99.2, 101.0, 98.8, 100.1, 99.5, 100.8, 99.1, 100.3];
/// let chart = control_chart(&data, None, 3.0).unwrap();
/// assert!(chart.is_in_control());
/// assert!((chart.capability_index - 1.0).abs() < 1e-12);
/// ```
pub fn control_chart(data: &[f64], limits: Option<(f64, f64)>, sigma_k: f64) -> Result<ControlChart> {
    let config = SpcConfig {
        sigma_k,
        ..SpcConfig::default()
    };
    control_chart_with(data, limits, &config)
}

/// Charts `data` against explicit or computed control limits.
///
/// # Algorithm
///
/// 1. CL = x̄, σ = sample standard deviation.
/// 2. `limits` is `(lower, upper)`; when absent, CL ± k·σ with
///    k = `config.sigma_k`.
/// 3. Rules: points strictly beyond the limits, `config.run_length`
///    points strictly on one side of CL, `config.trend_length` strictly
///    monotone points.
/// 4. Capability = (upper − lower) / (6σ), 0 when σ < 10⁻¹⁰. With
///    computed limits this is k/3.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `data` is empty,
/// [`AnalyticsError::InvalidParameter`] when supplied limits are not finite
/// or `lower > upper`, or when limits are computed and `config.sigma_k` is
/// not a finite positive number.
pub fn control_chart_with(
    data: &[f64],
    limits: Option<(f64, f64)>,
    config: &SpcConfig,
) -> Result<ControlChart> {
    let center_line = stats::mean(data).ok_or(AnalyticsError::EmptyInput {
        context: "control chart data",
    })?;
    let sigma = std_dev(data);
    let (lower_limit, upper_limit) = match limits {
        Some((lower, upper)) => {
            if !(lower.is_finite() && upper.is_finite()) || lower > upper {
                return Err(AnalyticsError::InvalidParameter {
                    message: format!("control limits must be finite with lower <= upper, got ({lower}, {upper})"),
                });
            }
            (lower, upper)
        }
        None => {
            let k = config.sigma_k;
            if !(k.is_finite() && k > 0.0) {
                return Err(AnalyticsError::InvalidParameter {
                    message: format!("sigma multiplier must be finite and positive, got {k}"),
                });
            }
            (center_line - k * sigma, center_line + k * sigma)
        }
    };
    let limits = ControlLimits {
        ucl: upper_limit,
        cl: center_line,
        lcl: lower_limit,
    };

    let run_rule = SameSideRun {
        length: config.run_length,
    };
    let trend_rule = MonotoneTrend {
        length: config.trend_length,
    };

    let mut hits = BeyondLimits.check(data, &limits);
    let out_of_control_indices: BTreeSet<usize> = hits.iter().map(|&(i, _)| i).collect();
    let run_violation = fires(&run_rule, data, &limits);
    let trend_violation = fires(&trend_rule, data, &limits);
    hits.extend(run_rule.check(data, &limits));
    hits.extend(trend_rule.check(data, &limits));
    hits.sort_by_key(|&(i, kind)| (i, kind as u8));

    let violations: Vec<Violation> = hits
        .into_iter()
        .map(|(point_index, violation_type)| Violation {
            point_index,
            violation_type,
        })
        .collect();

    let capability_index = if sigma < NEAR_ZERO {
        0.0
    } else {
        (upper_limit - lower_limit) / (6.0 * sigma)
    };

    tracing::debug!(
        n = data.len(),
        center_line,
        upper_limit,
        lower_limit,
        out_of_control = out_of_control_indices.len(),
        run_violation,
        trend_violation,
        "control chart"
    );

    Ok(ControlChart {
        center_line,
        upper_limit,
        lower_limit,
        out_of_control_indices,
        run_violation,
        trend_violation,
        capability_index,
        violations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STABLE: [f64; 9] = [98.5, 99.2, 101.0, 98.8, 100.1, 99.5, 100.8, 99.1, 100.3];

    #[test]
    fn stable_process_is_in_control() {
        let chart = control_chart(&STABLE, None, 3.0).expect("chart");
        assert!(chart.is_in_control());
        assert!(chart.violations.is_empty());
        assert!((chart.center_line - 99.7).abs() < 1e-9);
        assert!(chart.lower_limit < chart.center_line && chart.center_line < chart.upper_limit);
    }

    #[test]
    fn seven_above_mean_sets_run_violation() {
        let data = [
            10.0, 10.2, 10.1, 10.3, 10.2, 10.1, 10.2, 8.0, 8.1, 7.9, 8.2, 8.0,
        ];
        let chart = control_chart(&data, None, 3.0).expect("chart");
        assert!(chart.run_violation);
        assert!(!chart.trend_violation);
        assert!(chart.out_of_control_indices.is_empty());
        assert!(!chart.is_in_control());
        assert!(chart
            .violations
            .iter()
            .any(|v| v.point_index == 6 && v.violation_type == ViolationType::Run));
    }

    #[test]
    fn steady_climb_sets_trend_violation() {
        let data = [5.0, 4.0, 5.0, 5.1, 5.2, 5.3, 5.4, 5.5, 4.0];
        let chart = control_chart(&data, None, 3.0).expect("chart");
        assert!(chart.trend_violation);
        assert!(!chart.run_violation);
    }

    #[test]
    fn explicit_limits_flag_points() {
        let chart = control_chart(&[1.0, 5.0, 9.0, 12.0], Some((0.0, 10.0)), 3.0).expect("chart");
        assert_eq!(chart.out_of_control_indices, BTreeSet::from([3]));
        assert_eq!(chart.lower_limit, 0.0);
        assert_eq!(chart.upper_limit, 10.0);
        let expected = 10.0 / (6.0 * std_dev(&[1.0, 5.0, 9.0, 12.0]));
        assert!((chart.capability_index - expected).abs() < 1e-12);
    }

    #[test]
    fn sigma_k_scales_limits_and_capability() {
        let one = control_chart(&STABLE, None, 1.0).expect("chart");
        let three = control_chart(&STABLE, None, 3.0).expect("chart");
        assert!((one.capability_index - 1.0 / 3.0).abs() < 1e-12);
        assert!(one.upper_limit < three.upper_limit);
    }

    #[test]
    fn constant_data_has_zero_capability() {
        let chart = control_chart(&[4.0; 5], None, 3.0).expect("chart");
        assert_eq!(chart.capability_index, 0.0);
        assert_eq!(chart.upper_limit, 4.0);
        assert!(chart.is_in_control());
    }

    #[test]
    fn errors() {
        assert!(matches!(
            control_chart(&[], None, 3.0),
            Err(AnalyticsError::EmptyInput { .. })
        ));
        assert!(matches!(
            control_chart(&[1.0, 2.0], Some((5.0, 1.0)), 3.0),
            Err(AnalyticsError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn non_positive_sigma_k_is_rejected() {
        for k in [-3.0, 0.0, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    control_chart(&STABLE, None, k),
                    Err(AnalyticsError::InvalidParameter { .. })
                ),
                "sigma_k = {k}"
            );
        }
        // Supplied limits do not depend on the multiplier.
        assert!(control_chart(&STABLE, Some((95.0, 105.0)), f64::NAN).is_ok());
    }

    #[test]
    fn configured_run_length() {
        let config = SpcConfig {
            run_length: 3,
            ..SpcConfig::default()
        };
        let data = [2.0, 2.0, 2.0, 0.0, 0.0];
        assert!(control_chart_with(&data, None, &config).expect("chart").run_violation);
        assert!(!control_chart(&data, None, 3.0).expect("chart").run_violation);
    }

    #[test]
    fn charting_is_idempotent() {
        let a = control_chart(&STABLE, None, 3.0).expect("chart");
        let b = control_chart(&STABLE, None, 3.0).expect("chart");
        assert_eq!(a, b);
        assert_eq!(a.limits().cl.to_bits(), b.limits().cl.to_bits());
    }
}
