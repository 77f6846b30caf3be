//! Statistical Process Control (SPC) for individual observations.
//!
//! # Charts
//!
//! - [`control_chart`] — limits at mean ± k·σ (or caller-supplied), with
//!   beyond-limit, same-side run and monotone trend tests
//!
//! # Run Rules
//!
//! - [`BeyondLimits`], [`SameSideRun`], [`MonotoneTrend`] behind the
//!   [`RunRule`] trait
//!
//! # Outliers
//!
//! - [`detect_outliers`] — Tukey fences or z-scores
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.

mod chart;
mod outliers;
mod rules;

pub use chart::{
    control_chart, control_chart_with, ControlChart, ControlLimits, Violation, ViolationType,
};
pub use outliers::{detect_outliers, detect_outliers_with, OutlierMethod, OutlierReport};
pub use rules::{BeyondLimits, MonotoneTrend, RunRule, SameSideRun};
