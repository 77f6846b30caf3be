//! Shared value records: feature vectors, fitted model parameters, and
//! predictions.
//!
//! Every record here is an immutable value produced by one fit and consumed
//! by any number of downstream calls. Nothing is cached or shared.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named numeric inputs for a regression model.
///
/// An ordered map, so variable order is deterministic across fits and
/// "the first feature" always means the lexicographically smallest name.
pub type FeatureVector = BTreeMap<String, f64>;

/// Confidence level attached to fitted models; matches the 1.96 critical
/// value used for intervals and tests.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Which family a [`ModelParameters`] record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// `y = β₀ + Σ βᵢ·xᵢ`.
    Linear,
    /// `y = amplitude · exp(rate · x)`.
    Exponential,
    /// Posterior probabilities over named outcomes.
    Bayesian,
    /// Flattened state transition matrix.
    Markov,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear => "linear",
            Self::Exponential => "exponential",
            Self::Bayesian => "bayesian",
            Self::Markov => "markov",
        };
        f.write_str(name)
    }
}

/// Parameters of a fitted model.
///
/// # Coefficient layout
///
/// | Kind        | `coefficients`              | `variable_names`                 |
/// |-------------|-----------------------------|----------------------------------|
/// | Linear      | `[β₀, β₁, ..., βₚ]`         | `["intercept", x₁, ..., xₚ]`     |
/// | Exponential | `[amplitude, rate]`         | `["amplitude", x]`               |
/// | Bayesian    | posterior per outcome       | outcome names                    |
/// | Markov      | transition probabilities    | `"from->to"` pair names          |
///
/// `goodness_of_fit` may be negative when a fit is worse than the mean
/// baseline; that is a valid result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Model family.
    pub kind: ModelKind,
    /// Fitted coefficients, aligned with `variable_names`.
    pub coefficients: Vec<f64>,
    /// Names aligned 1:1 with `coefficients`.
    pub variable_names: Vec<String>,
    /// Confidence level in (0, 1].
    pub confidence_level: f64,
    /// R² for regression models; nominally in [0, 1].
    pub goodness_of_fit: f64,
}

impl ModelParameters {
    /// Looks up a coefficient by variable name.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.variable_names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.coefficients.get(i).copied())
    }
}

/// A single scored prediction with its interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted value.
    pub value: f64,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Human-readable interpretation.
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficient_lookup_by_name() {
        let params = ModelParameters {
            kind: ModelKind::Linear,
            coefficients: vec![1.0, 2.0, 3.0],
            variable_names: vec!["intercept".into(), "a".into(), "b".into()],
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            goodness_of_fit: 0.9,
        };
        assert_eq!(params.coefficient("b"), Some(3.0));
        assert_eq!(params.coefficient("intercept"), Some(1.0));
        assert_eq!(params.coefficient("missing"), None);
    }

    #[test]
    fn model_kind_display_matches_serde_name() {
        for kind in [
            ModelKind::Linear,
            ModelKind::Exponential,
            ModelKind::Bayesian,
            ModelKind::Markov,
        ] {
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
