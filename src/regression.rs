//! Regression analysis.
//!
//! Multiple linear regression over named features (normal equations solved
//! by Gaussian elimination), exponential curve fitting via a log transform,
//! and a closed-form single-variable line fit shared with trend analysis.
//!
//! # Examples
//!
//! ```
//! use u_quality::model::FeatureVector;
//! use u_quality::regression::{fit_linear, predict_linear};
//!
//! let samples: Vec<(FeatureVector, f64)> = (0..4)
//!     .map(|i| {
//!         let x = f64::from(i);
//!         (FeatureVector::from([("x".to_string(), x)]), 2.0 * x)
//!     })
//!     .collect();
//! let model = fit_linear(&samples).unwrap();
//! assert!(model.goodness_of_fit > 0.95);
//!
//! let input = FeatureVector::from([("x".to_string(), 10.0)]);
//! assert!((predict_linear(&model, &input) - 20.0).abs() < 1e-9);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::descriptive::{mean, NEAR_ZERO};
use crate::error::{AnalyticsError, Result};
use crate::model::{FeatureVector, ModelKind, ModelParameters, DEFAULT_CONFIDENCE_LEVEL};
use crate::solver::{matrix, nonconformable, Solver};

/// Name of the leading coefficient slot of a linear model.
pub const INTERCEPT: &str = "intercept";

/// Name of the leading coefficient slot of an exponential model.
pub const AMPLITUDE: &str = "amplitude";

/// Result of a closed-form single-variable fit: y = intercept + slope · x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    /// Slope coefficient (β₁).
    pub slope: f64,
    /// Intercept (β₀).
    pub intercept: f64,
    /// Coefficient of determination; 0 when the targets have no spread.
    pub r_squared: f64,
    /// Sum of squared residuals.
    pub ss_residual: f64,
    /// √(SS_res/(n−2)); 0 when n ≤ 2.
    pub residual_std_error: f64,
    /// Sample size.
    pub n: usize,
}

// ---------------------------------------------------------------------------
// Linear
// ---------------------------------------------------------------------------

/// Fits `y = β₀ + Σ βᵢ·xᵢ` by ordinary least squares.
///
/// # Algorithm
///
/// The variables are the sorted union of feature names across all samples;
/// a feature absent from a sample counts as 0. The design matrix
/// X = [1 | x₁ | ... | xₚ] gets a leading intercept column, and the normal
/// equations (XᵗX)β = Xᵗy are solved by Gaussian elimination with partial
/// pivoting. Collinear or constant features leave singular columns, whose
/// coefficients are zero-filled rather than failing.
///
/// `goodness_of_fit` is R² = 1 − SS_res/SS_tot, or 0 when SS_tot is exactly 0.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `samples` is empty.
pub fn fit_linear(samples: &[(FeatureVector, f64)]) -> Result<ModelParameters> {
    fit_linear_with(samples, &Solver::default())
}

/// [`fit_linear`] with an explicit solver.
pub fn fit_linear_with(
    samples: &[(FeatureVector, f64)],
    solver: &Solver,
) -> Result<ModelParameters> {
    if samples.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            context: "linear regression samples",
        });
    }

    let names = feature_names(samples);
    let n = samples.len();
    let ncols = names.len() + 1;

    // Build design matrix X (n × ncols, row-major)
    let mut x_data = Vec::with_capacity(n * ncols);
    for (features, _) in samples {
        x_data.push(1.0);
        for name in &names {
            x_data.push(features.get(name).copied().unwrap_or(0.0));
        }
    }
    let x_mat = matrix(n, ncols, x_data)?;
    let y: Vec<f64> = samples.iter().map(|(_, target)| *target).collect();

    let xt = x_mat.transpose();
    let xtx = xt.mul_mat(&x_mat).map_err(nonconformable)?;
    let xty = xt.mul_vec(&y).map_err(nonconformable)?;
    let coefficients = solver.solve(&xtx, &xty)?;

    let fitted = x_mat.mul_vec(&coefficients).map_err(nonconformable)?;
    let r_squared = r_squared(&y, &fitted);

    tracing::debug!(
        samples = n,
        variables = names.len(),
        r_squared,
        "fitted linear model"
    );

    let mut variable_names = Vec::with_capacity(ncols);
    variable_names.push(INTERCEPT.to_string());
    variable_names.extend(names);

    Ok(ModelParameters {
        kind: ModelKind::Linear,
        coefficients,
        variable_names,
        confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        goodness_of_fit: r_squared,
    })
}

/// Evaluates a linear model: intercept + Σ coefficientᵢ · features[nameᵢ].
///
/// Features missing from `features` count as 0; extra features are ignored.
pub fn predict_linear(model: &ModelParameters, features: &FeatureVector) -> f64 {
    let Some(&intercept) = model.coefficients.first() else {
        return 0.0;
    };
    intercept
        + model
            .variable_names
            .iter()
            .zip(&model.coefficients)
            .skip(1)
            .map(|(name, coeff)| coeff * features.get(name).copied().unwrap_or(0.0))
            .sum::<f64>()
}

/// Residuals `target − prediction` of a linear model over `samples`.
pub fn residuals(model: &ModelParameters, samples: &[(FeatureVector, f64)]) -> Vec<f64> {
    samples
        .iter()
        .map(|(features, target)| target - predict_linear(model, features))
        .collect()
}

// ---------------------------------------------------------------------------
// Exponential
// ---------------------------------------------------------------------------

/// Fits `y = amplitude · exp(rate · x)` by linear regression on ln(y).
///
/// Samples with a target ≤ 0 cannot be log-transformed and are dropped.
/// Only the first feature (by name) is used, matching
/// [`predict_exponential`]. The fit is done in log space, so
/// `goodness_of_fit` is the R² of ln(y) against x. Coefficients are
/// `[amplitude, rate]` with names `["amplitude", <feature>]`.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `samples` is empty,
/// [`AnalyticsError::NoPositiveTargets`] when every target is ≤ 0.
pub fn fit_exponential(samples: &[(FeatureVector, f64)]) -> Result<ModelParameters> {
    fit_exponential_with(samples, &Solver::default())
}

/// [`fit_exponential`] with an explicit solver.
pub fn fit_exponential_with(
    samples: &[(FeatureVector, f64)],
    solver: &Solver,
) -> Result<ModelParameters> {
    if samples.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            context: "exponential regression samples",
        });
    }

    let positive: Vec<&(FeatureVector, f64)> =
        samples.iter().filter(|(_, target)| *target > 0.0).collect();
    if positive.is_empty() {
        return Err(AnalyticsError::NoPositiveTargets);
    }
    let dropped = samples.len() - positive.len();
    if dropped > 0 {
        tracing::warn!(dropped, "dropped non-positive targets before log transform");
    }

    let feature = positive
        .iter()
        .flat_map(|(features, _)| features.keys())
        .min()
        .cloned();

    let log_samples: Vec<(FeatureVector, f64)> = positive
        .iter()
        .map(|(features, target)| {
            let mut single = FeatureVector::new();
            if let Some(name) = &feature {
                single.insert(name.clone(), features.get(name).copied().unwrap_or(0.0));
            }
            (single, target.ln())
        })
        .collect();

    let log_model = fit_linear_with(&log_samples, solver)?;
    let amplitude = log_model.coefficients[0].exp();
    let rate = log_model.coefficients.get(1).copied().unwrap_or(0.0);

    tracing::debug!(amplitude, rate, "fitted exponential model");

    Ok(ModelParameters {
        kind: ModelKind::Exponential,
        coefficients: vec![amplitude, rate],
        variable_names: vec![AMPLITUDE.to_string(), feature.unwrap_or_else(|| "x".into())],
        confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        goodness_of_fit: log_model.goodness_of_fit,
    })
}

/// Evaluates an exponential model at the **first** value in `features`.
///
/// Single-variable by construction: other features are ignored, and an
/// empty map evaluates at x = 0.
pub fn predict_exponential(model: &ModelParameters, features: &FeatureVector) -> f64 {
    let amplitude = model.coefficients.first().copied().unwrap_or(0.0);
    let rate = model.coefficients.get(1).copied().unwrap_or(0.0);
    let x = features.values().next().copied().unwrap_or(0.0);
    amplitude * (rate * x).exp()
}

// ---------------------------------------------------------------------------
// Single-variable line
// ---------------------------------------------------------------------------

/// Closed-form OLS line through `(x, y)`.
///
/// β₁ = Σ(x−x̄)(y−ȳ) / Σ(x−x̄)², β₀ = ȳ − β₁·x̄. When x has no spread the
/// slope is 0 and the line is the mean of y.
///
/// # Errors
///
/// [`AnalyticsError::MismatchedLength`] when lengths differ,
/// [`AnalyticsError::InsufficientData`] when fewer than 2 points.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit> {
    let n = x.len();
    if n != y.len() {
        return Err(AnalyticsError::MismatchedLength {
            left: n,
            right: y.len(),
        });
    }
    if n < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            actual: n,
        });
    }

    let x_mean = mean(x)?;
    let y_mean = mean(y)?;
    let (sxy, sxx) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(sxy, sxx), (&xi, &yi)| {
            let dx = xi - x_mean;
            (sxy + dx * (yi - y_mean), sxx + dx * dx)
        });

    let slope = if sxx < NEAR_ZERO { 0.0 } else { sxy / sxx };
    let intercept = y_mean - slope * x_mean;

    let fitted: Vec<f64> = x.iter().map(|&xi| intercept + slope * xi).collect();
    let ss_residual: f64 = y
        .iter()
        .zip(&fitted)
        .map(|(&yi, &fi)| (yi - fi).powi(2))
        .sum();
    let residual_std_error = if n > 2 {
        (ss_residual / (n - 2) as f64).sqrt()
    } else {
        0.0
    };

    Ok(LineFit {
        slope,
        intercept,
        r_squared: r_squared(y, &fitted),
        ss_residual,
        residual_std_error,
        n,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Sorted union of feature names across samples.
fn feature_names(samples: &[(FeatureVector, f64)]) -> Vec<String> {
    samples
        .iter()
        .flat_map(|(features, _)| features.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 1 − SS_res/SS_tot, or 0 when SS_tot is exactly 0.
fn r_squared(y: &[f64], fitted: &[f64]) -> f64 {
    let Ok(y_mean) = mean(y) else {
        return 0.0;
    };
    let ss_tot: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = y
        .iter()
        .zip(fitted)
        .map(|(&yi, &fi)| (yi - fi).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fit_linear_is_idempotent(
            points in proptest::collection::vec((-1e3_f64..1e3, -1e3_f64..1e3), 1..=20)
        ) {
            let samples: Vec<(FeatureVector, f64)> = points
                .iter()
                .map(|&(x, y)| (FeatureVector::from([("x".to_string(), x)]), y))
                .collect();
            let a = fit_linear(&samples).expect("fit");
            let b = fit_linear(&samples).expect("fit");
            prop_assert_eq!(a, b);
        }

        #[test]
        fn line_r_squared_bounded(
            data in proptest::collection::vec(-1e3_f64..1e3, 3..=30)
                .prop_flat_map(|x| {
                    let n = x.len();
                    (Just(x), proptest::collection::vec(-1e3_f64..1e3, n..=n))
                })
        ) {
            let (x, y) = data;
            let fit = fit_line(&x, &y).expect("fit");
            prop_assert!(fit.r_squared >= -0.01 && fit.r_squared <= 1.01, "R² = {}", fit.r_squared);
        }
    }
}
