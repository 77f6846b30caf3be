//! # u-quality
//!
//! Statistical engine for quality analytics: regression, hypothesis tests,
//! probabilistic models, trend forecasting, and statistical process control,
//! with a facade that turns fitted models into normalized 0–100 scores.
//!
//! Every operation is a pure function over caller-supplied data. There is no
//! shared state, caching, or I/O; results are plain serializable values.
//!
//! ## Modules
//!
//! - [`solver`] — Dense linear systems (Gaussian elimination with partial pivoting)
//! - [`descriptive`] — Summary statistics, percentiles, z-scores
//! - [`correlation`] — Correlation analysis (Pearson, Spearman)
//! - [`regression`] — Multiple linear and exponential regression, single-variable OLS
//! - [`testing`] — Hypothesis testing (t-test, z-test, chi-squared, confidence intervals)
//! - [`special`] — Error function and normal distribution helpers
//! - [`probability`] — Bayesian posteriors and Markov chains
//! - [`trend`] — Linear trend detection and forecasting
//! - [`spc`] — Control charts with run rules, outlier detection
//! - [`scoring`] — Model predictions normalized to interpreted 0–100 scores
//! - [`config`] — Tunable thresholds, loadable from JSON
//!
//! ## Error Policy
//!
//! Structurally impossible inputs (empty data, mismatched lengths, zero
//! denominators) return [`AnalyticsError`]. Numerically degenerate but
//! well-typed inputs (zero variance, singular columns, zero probability mass)
//! resolve to documented defaults and emit a `tracing` event.
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.

pub mod config;
pub mod correlation;
pub mod descriptive;
pub mod error;
pub mod model;
pub mod probability;
pub mod regression;
pub mod scoring;
pub mod solver;
pub mod spc;
pub mod special;
pub mod testing;
pub mod trend;

pub use error::{AnalyticsError, Result};
