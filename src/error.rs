//! Error types.
//!
//! Structural impossibilities (empty input, zero denominators, mismatched
//! pairs) are errors. Numerically degenerate but well-typed inputs (zero
//! variance, singular columns, zero probability mass) are not: they resolve
//! to a documented default in the module that handles them.

use thiserror::Error;

use crate::model::ModelKind;

/// Errors raised by the analytics engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// A dataset or training set was empty where a result is undefined.
    #[error("empty input: {context}")]
    EmptyInput {
        /// What was empty.
        context: &'static str,
    },

    /// Paired sequences of different lengths.
    #[error("mismatched lengths: {left} vs {right}")]
    MismatchedLength {
        /// Length of the first sequence.
        left: usize,
        /// Length of the second sequence.
        right: usize,
    },

    /// A ratio with a zero denominator.
    #[error("zero denominator: {context}")]
    ZeroDenominator {
        /// The quantity that was zero.
        context: &'static str,
    },

    /// Exponential fit with no strictly positive targets to log-transform.
    #[error("no positive targets available for log transform")]
    NoPositiveTargets,

    /// Too few points for a statistic.
    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum number of points.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// A call argument outside its valid domain.
    #[error("invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the problem.
        message: String,
    },

    /// A configuration value outside its valid domain.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// Markov stepping from a state the model does not know.
    #[error("unknown state: {state}")]
    UnknownState {
        /// The offending state.
        state: String,
    },

    /// The model kind has no numeric predictor.
    #[error("model kind {kind} has no numeric predictor")]
    UnsupportedModel {
        /// The model kind.
        kind: ModelKind,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = AnalyticsError::InsufficientData {
            required: 2,
            actual: 1,
        };
        assert_eq!(e.to_string(), "insufficient data: need at least 2 points, got 1");

        let e = AnalyticsError::UnsupportedModel {
            kind: ModelKind::Markov,
        };
        assert_eq!(e.to_string(), "model kind markov has no numeric predictor");
    }
}
