//! Linear trend detection and forecasting.
//!
//! Fits an ordinary least squares line of value against position
//! 0..n−1 and extrapolates it.
//!
//! # Algorithm
//!
//! ```text
//! Fit:      ŷ_t = β₀ + β₁·t,  t = 0..n−1
//! Forecast: F_i = β₀ + β₁·(n + i),  i = 0..h−1
//! Band:     F_{h−1} ± z·√(SS_res/(n−2))
//! ```
//!
//! # Examples
//!
//! ```
//! use u_quality::trend::{analyze, TrendDirection};
//!
//! let r = analyze(&[10.0, 12.0, 14.0, 16.0, 18.0], 3).unwrap();
//! assert_eq!(r.direction, TrendDirection::Increasing);
//! assert_eq!(r.forecast, vec![20.0, 22.0, 24.0]);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::TrendConfig;
use crate::error::Result;
use crate::regression::fit_line;

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Slope at or above the stability threshold.
    Increasing,
    /// Slope at or below the negated threshold.
    Decreasing,
    /// |slope| below the threshold.
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        })
    }
}

/// Fitted trend and its extrapolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Classified direction.
    pub direction: TrendDirection,
    /// Change per period.
    pub slope: f64,
    /// Fitted value at position 0.
    pub intercept: f64,
    /// R² of the fit; 0 for a flat series.
    pub goodness_of_fit: f64,
    /// Values for the next `forecast_periods` positions.
    pub forecast: Vec<f64>,
    /// `(low, high)` band around the final forecast point.
    pub confidence_interval: (f64, f64),
    /// √(SS_res/(n−2)); 0 when n ≤ 2.
    pub residual_std_error: f64,
}

/// Trend analyzer holding its thresholds.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    /// Creates an analyzer with the given thresholds.
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Fits `series` against its positions and forecasts `forecast_periods` ahead.
    ///
    /// With `forecast_periods = 0` the forecast is empty and the band is
    /// centered on the last fitted value.
    ///
    /// # Errors
    ///
    /// [`crate::AnalyticsError::InsufficientData`] when `series` has fewer
    /// than 2 points.
    pub fn analyze(&self, series: &[f64], forecast_periods: usize) -> Result<TrendResult> {
        let positions: Vec<f64> = (0..series.len()).map(|i| i as f64).collect();
        let fit = fit_line(&positions, series)?;

        let direction = self.classify(fit.slope);
        let n = series.len() as f64;
        let at = |t: f64| fit.intercept + fit.slope * t;
        let forecast: Vec<f64> = (0..forecast_periods)
            .map(|i| at(n + i as f64))
            .collect();

        let anchor = forecast.last().copied().unwrap_or_else(|| at(n - 1.0));
        let margin = self.config.interval_z * fit.residual_std_error;

        tracing::debug!(
            n = series.len(),
            slope = fit.slope,
            r_squared = fit.r_squared,
            %direction,
            forecast_periods,
            "trend analysis"
        );

        Ok(TrendResult {
            direction,
            slope: fit.slope,
            intercept: fit.intercept,
            goodness_of_fit: fit.r_squared,
            forecast,
            confidence_interval: (anchor - margin, anchor + margin),
            residual_std_error: fit.residual_std_error,
        })
    }

    fn classify(&self, slope: f64) -> TrendDirection {
        if slope.abs() < self.config.stable_slope_threshold {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

/// [`TrendAnalyzer::analyze`] with default thresholds.
pub fn analyze(series: &[f64], forecast_periods: usize) -> Result<TrendResult> {
    TrendAnalyzer::default().analyze(series, forecast_periods)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn forecast_length_and_band_order(
            series in proptest::collection::vec(-1e3_f64..1e3, 2..=40),
            periods in 0_usize..10,
        ) {
            let r = analyze(&series, periods).expect("trend");
            prop_assert_eq!(r.forecast.len(), periods);
            prop_assert!(r.confidence_interval.0 <= r.confidence_interval.1);
        }

        #[test]
        fn analysis_is_deterministic(series in proptest::collection::vec(-1e3_f64..1e3, 2..=40)) {
            prop_assert_eq!(analyze(&series, 3).expect("a"), analyze(&series, 3).expect("b"));
        }
    }
}
