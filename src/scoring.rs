//! Normalized 0–100 scores from fitted models.
//!
//! The facade picks a predictor by [`ModelKind`], clamps the result to the
//! score scale, and attaches a banded interpretation whose thresholds
//! depend on what the score measures ([`ScoreSemantics`]).
//!
//! # Examples
//!
//! ```
//! use u_quality::model::FeatureVector;
//! use u_quality::regression::fit_linear;
//! use u_quality::scoring::{ScoreSemantics, ScoringFacade};
//!
//! let samples: Vec<(FeatureVector, f64)> = (0..5)
//!     .map(|i| {
//!         let gaps = f64::from(i);
//!         (FeatureVector::from([("open_findings".to_string(), gaps)]), 10.0 + 20.0 * gaps)
//!     })
//!     .collect();
//! let model = fit_linear(&samples).unwrap();
//!
//! let facade = ScoringFacade::new(ScoreSemantics::Risk);
//! let inputs = FeatureVector::from([("open_findings".to_string(), 10.0)]);
//! let p = facade.predict_and_interpret(&model, &inputs).unwrap();
//! assert_eq!(p.value, 100.0);
//! assert!(p.explanation.contains("high risk"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ScoreBands, ScoringConfig};
use crate::error::{AnalyticsError, Result};
use crate::model::{FeatureVector, ModelKind, ModelParameters, Prediction};
use crate::regression::{predict_exponential, predict_linear};

/// Upper end of the score scale.
pub const MAX_SCORE: f64 = 100.0;

/// What a score measures; selects band thresholds and wording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSemantics {
    /// Higher is worse.
    #[default]
    Risk,
    /// Higher is better.
    Compliance,
    /// Higher is better.
    Quality,
}

impl ScoreSemantics {
    /// Band thresholds for these semantics.
    pub fn bands(self, config: &ScoringConfig) -> ScoreBands {
        match self {
            Self::Risk => config.risk,
            Self::Compliance => config.compliance,
            Self::Quality => config.quality,
        }
    }
}

impl fmt::Display for ScoreSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Risk => "risk",
            Self::Compliance => "compliance",
            Self::Quality => "quality",
        })
    }
}

/// Band a score falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    /// Below `moderate_from`.
    Low,
    /// From `moderate_from` up to (excluding) `high_from`.
    Moderate,
    /// At or above `high_from`.
    High,
}

impl ScoreBand {
    /// Classifies `score` against `bands`.
    pub fn of(score: f64, bands: ScoreBands) -> Self {
        if score >= bands.high_from {
            Self::High
        } else if score >= bands.moderate_from {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        })
    }
}

/// Entry point for turning fitted models into interpreted scores.
#[derive(Debug, Clone, Default)]
pub struct ScoringFacade {
    config: ScoringConfig,
    semantics: ScoreSemantics,
}

impl ScoringFacade {
    /// Creates a facade with default bands for `semantics`.
    pub fn new(semantics: ScoreSemantics) -> Self {
        Self {
            config: ScoringConfig::default(),
            semantics,
        }
    }

    /// Replaces the band thresholds.
    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    /// The semantics this facade interprets scores under.
    pub fn semantics(&self) -> ScoreSemantics {
        self.semantics
    }

    /// Band of an already-normalized score.
    pub fn band(&self, score: f64) -> ScoreBand {
        ScoreBand::of(clamp_score(score), self.semantics.bands(&self.config))
    }

    /// Short label such as `"moderate compliance"`.
    pub fn interpret(&self, score: f64) -> String {
        format!("{} {}", self.band(score), self.semantics)
    }

    /// Predicts with `model`, clamps to [0, 100], and interprets the score.
    ///
    /// `confidence` is the model's confidence level scaled by its
    /// goodness of fit clamped to [0, 1].
    ///
    /// # Errors
    ///
    /// [`AnalyticsError::UnsupportedModel`] for model kinds without a
    /// numeric predictor (Markov).
    pub fn predict_and_interpret(
        &self,
        model: &ModelParameters,
        inputs: &FeatureVector,
    ) -> Result<Prediction> {
        let raw = predict_raw(model, inputs)?;
        let value = clamp_score(raw);
        let confidence = model.confidence_level * clamp_unit(model.goodness_of_fit);
        let explanation = format!(
            "{} model predicts {value:.1} ({})",
            model.kind,
            self.interpret(value)
        );

        if value != raw {
            tracing::debug!(raw, value, kind = %model.kind, "prediction clamped to score range");
        }

        Ok(Prediction {
            value,
            confidence,
            explanation,
        })
    }
}

/// [`ScoringFacade::predict_and_interpret`] under risk semantics.
pub fn predict_and_interpret(model: &ModelParameters, inputs: &FeatureVector) -> Result<Prediction> {
    ScoringFacade::default().predict_and_interpret(model, inputs)
}

/// Unclamped prediction of `model` at `inputs`.
///
/// | Kind        | Prediction                                        |
/// |-------------|---------------------------------------------------|
/// | Linear      | [`predict_linear`]                                |
/// | Exponential | [`predict_exponential`]                           |
/// | Bayesian    | Σ posterior(outcome) · inputs[outcome], missing 0 |
/// | Markov      | unsupported                                       |
///
/// # Errors
///
/// [`AnalyticsError::UnsupportedModel`] for [`ModelKind::Markov`].
pub fn predict_raw(model: &ModelParameters, inputs: &FeatureVector) -> Result<f64> {
    match model.kind {
        ModelKind::Linear => Ok(predict_linear(model, inputs)),
        ModelKind::Exponential => Ok(predict_exponential(model, inputs)),
        ModelKind::Bayesian => Ok(model
            .variable_names
            .iter()
            .zip(&model.coefficients)
            .map(|(outcome, p)| p * inputs.get(outcome).copied().unwrap_or(0.0))
            .sum()),
        ModelKind::Markov => Err(AnalyticsError::UnsupportedModel { kind: model.kind }),
    }
}

/// Label for `score` under `semantics` with default bands, e.g. `"high risk"`.
pub fn interpret_score(score: f64, semantics: ScoreSemantics) -> String {
    ScoringFacade::new(semantics).interpret(score)
}

/// Percentage of `implemented` out of `total`, capped at 100.
///
/// # Errors
///
/// [`AnalyticsError::ZeroDenominator`] when `total` is 0.
pub fn ratio_score(implemented: usize, total: usize) -> Result<f64> {
    if total == 0 {
        return Err(AnalyticsError::ZeroDenominator {
            context: "total in ratio score",
        });
    }
    Ok((implemented as f64 / total as f64 * MAX_SCORE).min(MAX_SCORE))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Clamps to [0, 100]; NaN maps to 0.
fn clamp_score(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, MAX_SCORE)
    }
}

fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn predictions_stay_on_scale(
            intercept in -1e4_f64..1e4,
            slope in -1e4_f64..1e4,
            x in -1e3_f64..1e3,
        ) {
            let model = ModelParameters {
                kind: ModelKind::Linear,
                coefficients: vec![intercept, slope],
                variable_names: vec!["intercept".into(), "x".into()],
                confidence_level: 0.95,
                goodness_of_fit: 0.5,
            };
            let inputs = FeatureVector::from([("x".to_string(), x)]);
            let p = predict_and_interpret(&model, &inputs).expect("predict");
            prop_assert!((0.0..=MAX_SCORE).contains(&p.value));
            prop_assert!((0.0..=1.0).contains(&p.confidence));
        }
    }
}
