//! Engine configuration.
//!
//! Every threshold the engine uses lives here, grouped by analysis area.
//! `Default` reproduces the engine's standard constants exactly, so the
//! free functions in each module behave identically to an engine built
//! from `AnalyticsConfig::default()`.
//!
//! # Examples
//!
//! ```
//! use u_quality::config::AnalyticsConfig;
//!
//! let config = AnalyticsConfig::from_json(r#"{ "spc": { "sigma_k": 2.0 } }"#).unwrap();
//! assert_eq!(config.spc.sigma_k, 2.0);
//! assert_eq!(config.spc.run_length, 7); // untouched sections keep defaults
//! assert_eq!(config.testing.critical_value, 1.96);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Top-level configuration, one section per analysis area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Linear solver.
    pub solver: SolverConfig,
    /// Hypothesis tests.
    pub testing: TestingConfig,
    /// Trend analysis.
    pub trend: TrendConfig,
    /// Control charts and outlier detection.
    pub spc: SpcConfig,
    /// Score interpretation bands.
    pub scoring: ScoringConfig,
}

impl AnalyticsConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AnalyticsError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<()> {
        self.solver.validate()?;
        self.testing.validate()?;
        self.trend.validate()?;
        self.spc.validate()?;
        self.scoring.validate()
    }
}

fn invalid(message: String) -> AnalyticsError {
    AnalyticsError::InvalidConfig { message }
}

/// Gaussian elimination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Pivots with magnitude below this are treated as zero.
    pub pivot_epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_epsilon: 1e-10,
        }
    }
}

impl SolverConfig {
    /// Validates the section.
    pub fn validate(&self) -> Result<()> {
        if !self.pivot_epsilon.is_finite() || self.pivot_epsilon < 0.0 {
            return Err(invalid(format!(
                "solver.pivot_epsilon must be finite and >= 0, got {}",
                self.pivot_epsilon
            )));
        }
        Ok(())
    }
}

/// Hypothesis test settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingConfig {
    /// Fixed two-tailed critical value for the t-test (≈95%).
    pub critical_value: f64,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            critical_value: 1.96,
        }
    }
}

impl TestingConfig {
    /// Validates the section.
    pub fn validate(&self) -> Result<()> {
        if !self.critical_value.is_finite() || self.critical_value <= 0.0 {
            return Err(invalid(format!(
                "testing.critical_value must be > 0, got {}",
                self.critical_value
            )));
        }
        Ok(())
    }
}

/// Trend analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Slopes with magnitude below this are reported as stable.
    pub stable_slope_threshold: f64,
    /// Multiplier on the residual standard error for the forecast band.
    pub interval_z: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            stable_slope_threshold: 0.01,
            interval_z: 1.96,
        }
    }
}

impl TrendConfig {
    /// Validates the section.
    pub fn validate(&self) -> Result<()> {
        if !self.stable_slope_threshold.is_finite() || self.stable_slope_threshold < 0.0 {
            return Err(invalid(format!(
                "trend.stable_slope_threshold must be >= 0, got {}",
                self.stable_slope_threshold
            )));
        }
        if !self.interval_z.is_finite() || self.interval_z < 0.0 {
            return Err(invalid(format!(
                "trend.interval_z must be >= 0, got {}",
                self.interval_z
            )));
        }
        Ok(())
    }
}

/// Control chart and outlier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpcConfig {
    /// Width of default control limits in standard deviations.
    pub sigma_k: f64,
    /// Consecutive points on one side of the center line that flag a run.
    pub run_length: usize,
    /// Consecutive strictly monotone points that flag a trend.
    pub trend_length: usize,
    /// Fence multiplier for the IQR outlier method.
    pub iqr_multiplier: f64,
    /// |z| above which a point is an outlier.
    pub zscore_threshold: f64,
}

impl Default for SpcConfig {
    fn default() -> Self {
        Self {
            sigma_k: 3.0,
            run_length: 7,
            trend_length: 6,
            iqr_multiplier: 1.5,
            zscore_threshold: 3.0,
        }
    }
}

impl SpcConfig {
    /// Validates the section.
    pub fn validate(&self) -> Result<()> {
        if !self.sigma_k.is_finite() || self.sigma_k <= 0.0 {
            return Err(invalid(format!("spc.sigma_k must be > 0, got {}", self.sigma_k)));
        }
        if self.run_length < 2 {
            return Err(invalid(format!(
                "spc.run_length must be >= 2, got {}",
                self.run_length
            )));
        }
        if self.trend_length < 3 {
            return Err(invalid(format!(
                "spc.trend_length must be >= 3, got {}",
                self.trend_length
            )));
        }
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(invalid(format!(
                "spc.iqr_multiplier must be >= 0, got {}",
                self.iqr_multiplier
            )));
        }
        if !self.zscore_threshold.is_finite() || self.zscore_threshold <= 0.0 {
            return Err(invalid(format!(
                "spc.zscore_threshold must be > 0, got {}",
                self.zscore_threshold
            )));
        }
        Ok(())
    }
}

/// Score band thresholds on the 0–100 scale.
///
/// Scores below `moderate_from` are low, scores at or above `high_from`
/// are high, anything in between is moderate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBands {
    /// Lowest score in the moderate band.
    pub moderate_from: f64,
    /// Lowest score in the high band.
    pub high_from: f64,
}

impl ScoreBands {
    fn validate(&self, name: &str) -> Result<()> {
        let ordered = 0.0 <= self.moderate_from
            && self.moderate_from <= self.high_from
            && self.high_from <= 100.0;
        if !ordered {
            return Err(invalid(format!(
                "scoring.{name} bands must satisfy 0 <= moderate_from <= high_from <= 100, \
                 got {} / {}",
                self.moderate_from, self.high_from
            )));
        }
        Ok(())
    }
}

/// Band thresholds per score semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Risk scores (higher is worse).
    pub risk: ScoreBands,
    /// Compliance scores (higher is better).
    pub compliance: ScoreBands,
    /// Quality scores (higher is better).
    pub quality: ScoreBands,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            risk: ScoreBands {
                moderate_from: 30.0,
                high_from: 60.0,
            },
            compliance: ScoreBands {
                moderate_from: 50.0,
                high_from: 80.0,
            },
            quality: ScoreBands {
                moderate_from: 40.0,
                high_from: 70.0,
            },
        }
    }
}

impl ScoringConfig {
    /// Validates the section.
    pub fn validate(&self) -> Result<()> {
        self.risk.validate("risk")?;
        self.compliance.validate("compliance")?;
        self.quality.validate("quality")
    }
}
