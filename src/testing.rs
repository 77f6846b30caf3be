//! Hypothesis testing.
//!
//! t-tests, the χ² goodness-of-fit test, and normal confidence intervals.
//!
//! # Approximations
//!
//! p-values here are deliberately approximate and stable across releases:
//!
//! - the t-test uses the standard normal CDF instead of Student's t, and
//!   rejects at a fixed critical value (1.96 by default) regardless of
//!   degrees of freedom;
//! - the χ² test uses a normal approximation for df > 30 and a crude
//!   linear estimate of the 95% critical value below that.
//!
//! Both are accurate mainly for larger samples.
//!
//! # Examples
//!
//! ```
//! use u_quality::testing::t_test;
//!
//! let before = [5.1, 4.9, 5.2, 5.0, 4.8, 5.1, 4.9, 5.0];
//! let after = [7.1, 6.9, 7.2, 7.0, 6.8, 7.1, 6.9, 7.0];
//! let r = t_test(&before, &after, false).unwrap();
//! assert!(r.reject_null);
//! assert!(r.p_value < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::TestingConfig;
use crate::descriptive::{mean, std_dev, variance, NEAR_ZERO};
use crate::error::{AnalyticsError, Result};
use crate::special::{inverse_normal_cdf, standard_normal_cdf, two_tailed_normal_p};

/// 95% χ² critical value at df = 1.
const CHI_SQUARE_BASE_CRITICAL: f64 = 3.841;

/// Slope of the linear critical-value estimate per extra degree of freedom.
const CHI_SQUARE_CRITICAL_SLOPE: f64 = 1.38;

/// One-tailed 95% normal quantile.
const Z_95_ONE_TAILED: f64 = 1.645;

/// Degrees of freedom above which χ² uses the normal approximation.
const CHI_SQUARE_NORMAL_DF: usize = 30;

/// Outcome of a hypothesis test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisTestResult {
    /// Test statistic (t or χ²).
    pub statistic: f64,
    /// Approximate p-value in [0, 1].
    pub p_value: f64,
    /// Degrees of freedom, when meaningful.
    pub degrees_of_freedom: Option<usize>,
    /// Critical value the statistic was compared against.
    pub critical_value: f64,
    /// Whether the null hypothesis is rejected.
    pub reject_null: bool,
    /// Human-readable conclusion.
    pub conclusion: String,
}

// ---------------------------------------------------------------------------
// t-test
// ---------------------------------------------------------------------------

/// Two-sample t-test with the default critical value.
///
/// See [`t_test_with`].
pub fn t_test(sample1: &[f64], sample2: &[f64], paired: bool) -> Result<HypothesisTestResult> {
    t_test_with(sample1, sample2, paired, &TestingConfig::default())
}

/// Two-sample t-test: H₀: the means are equal.
///
/// # Algorithm
///
/// - Paired: dᵢ = xᵢ − yᵢ, t = d̄ / (s_d/√n), df = n − 1.
/// - Independent: t = (x̄₁ − x̄₂) / √(s₁²/n₁ + s₂²/n₂), df = n₁ + n₂ − 2.
///
/// A (near) zero standard error gives t = 0. The p-value is
/// 2·(1 − Φ(|t|)) and H₀ is rejected when |t| exceeds the configured
/// critical value.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when either sample is empty,
/// [`AnalyticsError::MismatchedLength`] for paired samples of unequal length.
pub fn t_test_with(
    sample1: &[f64],
    sample2: &[f64],
    paired: bool,
    config: &TestingConfig,
) -> Result<HypothesisTestResult> {
    if sample1.is_empty() || sample2.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            context: "t-test sample",
        });
    }

    let (statistic, df) = if paired {
        if sample1.len() != sample2.len() {
            return Err(AnalyticsError::MismatchedLength {
                left: sample1.len(),
                right: sample2.len(),
            });
        }
        let diffs: Vec<f64> = sample1.iter().zip(sample2).map(|(a, b)| a - b).collect();
        let n = diffs.len();
        let se = std_dev(&diffs) / (n as f64).sqrt();
        let t = if se < NEAR_ZERO {
            0.0
        } else {
            mean(&diffs)? / se
        };
        (t, n - 1)
    } else {
        let n1 = sample1.len() as f64;
        let n2 = sample2.len() as f64;
        let se = (variance(sample1) / n1 + variance(sample2) / n2).sqrt();
        let t = if se < NEAR_ZERO {
            0.0
        } else {
            (mean(sample1)? - mean(sample2)?) / se
        };
        (t, (sample1.len() + sample2.len()).saturating_sub(2))
    };

    let p_value = two_tailed_normal_p(statistic);
    let critical_value = config.critical_value;
    let reject_null = statistic.abs() > critical_value;
    let conclusion = if reject_null {
        format!("reject null hypothesis: means differ significantly (p = {p_value:.4})")
    } else {
        format!("fail to reject null hypothesis: no significant difference in means (p = {p_value:.4})")
    };

    tracing::debug!(statistic, p_value, paired, reject_null, "t-test");

    Ok(HypothesisTestResult {
        statistic,
        p_value,
        degrees_of_freedom: Some(df),
        critical_value,
        reject_null,
        conclusion,
    })
}

// ---------------------------------------------------------------------------
// Chi-squared
// ---------------------------------------------------------------------------

/// χ² goodness-of-fit test: H₀: observed counts follow the expected ones.
///
/// # Algorithm
///
/// χ² = Σ (Oᵢ − Eᵢ)² / Eᵢ with df = k − 1; categories with Eᵢ = 0
/// contribute nothing. Without `expected`, every category expects
/// total/k.
///
/// The critical value and p-value are approximations:
///
/// - df > 30: z = (χ² − df)/√(2·df), p = 1 − Φ(z),
///   critical = df + 1.645·√(2·df);
/// - otherwise: critical = 3.841 + 1.38·(df − 1), and
///   p = 1 − 0.95·χ²/critical clamped to [0, 1], so p = 0.05 exactly at
///   the critical value.
///
/// H₀ is rejected when χ² exceeds the critical value.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `observed` is empty,
/// [`AnalyticsError::MismatchedLength`] when `expected` has another length.
pub fn chi_square_test(observed: &[u64], expected: Option<&[u64]>) -> Result<HypothesisTestResult> {
    if observed.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            context: "chi-square observed counts",
        });
    }
    let k = observed.len();

    let expected: Vec<f64> = match expected {
        Some(e) if e.len() != k => {
            return Err(AnalyticsError::MismatchedLength {
                left: k,
                right: e.len(),
            });
        }
        Some(e) => e.iter().map(|&v| v as f64).collect(),
        None => {
            let total: f64 = observed.iter().map(|&o| o as f64).sum();
            vec![total / k as f64; k]
        }
    };

    let statistic: f64 = observed
        .iter()
        .zip(&expected)
        .filter(|&(_, &e)| e != 0.0)
        .map(|(&o, &e)| (o as f64 - e).powi(2) / e)
        .sum();

    let df = k - 1;
    let (critical_value, p_value) = chi_square_approximation(statistic, df);
    let reject_null = statistic > critical_value;
    let conclusion = if reject_null {
        format!("reject null hypothesis: observed distribution differs from expected (p = {p_value:.4})")
    } else {
        format!("fail to reject null hypothesis: observed distribution consistent with expected (p = {p_value:.4})")
    };

    tracing::debug!(statistic, df, p_value, reject_null, "chi-square test");

    Ok(HypothesisTestResult {
        statistic,
        p_value,
        degrees_of_freedom: Some(df),
        critical_value,
        reject_null,
        conclusion,
    })
}

/// `(critical_value, p_value)` for a χ² statistic.
fn chi_square_approximation(statistic: f64, df: usize) -> (f64, f64) {
    if df > CHI_SQUARE_NORMAL_DF {
        let d = df as f64;
        let spread = (2.0 * d).sqrt();
        let z = (statistic - d) / spread;
        let critical = d + Z_95_ONE_TAILED * spread;
        (critical, (1.0 - standard_normal_cdf(z)).clamp(0.0, 1.0))
    } else {
        // df = 0 (a single category) is estimated as df = 1.
        let d = df.max(1) as f64;
        let critical = CHI_SQUARE_BASE_CRITICAL + CHI_SQUARE_CRITICAL_SLOPE * (d - 1.0);
        let p = (1.0 - 0.95 * statistic / critical).clamp(0.0, 1.0);
        (critical, p)
    }
}

// ---------------------------------------------------------------------------
// z-test
// ---------------------------------------------------------------------------

/// One-sample z-test: H₀: the population mean is `mu0`.
///
/// z = (x̄ − μ₀) / (s/√n), sharing the normal p-value and the fixed
/// critical value of the t-test. A (near) zero standard error gives z = 0.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `data` is empty.
pub fn one_sample_z_test(data: &[f64], mu0: f64) -> Result<HypothesisTestResult> {
    one_sample_z_test_with(data, mu0, &TestingConfig::default())
}

/// [`one_sample_z_test`] with an explicit critical value.
pub fn one_sample_z_test_with(
    data: &[f64],
    mu0: f64,
    config: &TestingConfig,
) -> Result<HypothesisTestResult> {
    if data.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            context: "z-test sample",
        });
    }

    let n = data.len();
    let se = std_dev(data) / (n as f64).sqrt();
    let statistic = if se < NEAR_ZERO {
        0.0
    } else {
        (mean(data)? - mu0) / se
    };
    let p_value = two_tailed_normal_p(statistic);
    let critical_value = config.critical_value;
    let reject_null = statistic.abs() > critical_value;
    let conclusion = if reject_null {
        format!("reject null hypothesis: mean differs from {mu0} (p = {p_value:.4})")
    } else {
        format!("fail to reject null hypothesis: mean consistent with {mu0} (p = {p_value:.4})")
    };

    tracing::debug!(statistic, p_value, n, reject_null, "one-sample z-test");

    Ok(HypothesisTestResult {
        statistic,
        p_value,
        degrees_of_freedom: Some(n - 1),
        critical_value,
        reject_null,
        conclusion,
    })
}

// ---------------------------------------------------------------------------
// Confidence intervals
// ---------------------------------------------------------------------------

/// Normal confidence interval for the mean: x̄ ± z·s/√n.
///
/// `z` is the two-sided normal quantile for `confidence_level`. With a
/// single observation the interval collapses to the point.
///
/// # Errors
///
/// [`AnalyticsError::EmptyInput`] when `data` is empty,
/// [`AnalyticsError::InvalidParameter`] unless `confidence_level` ∈ (0, 1).
///
/// # Examples
///
/// ```
/// use u_quality::testing::confidence_interval;
///
/// let (lo, hi) = confidence_interval(&[9.8, 10.1, 10.0, 9.9, 10.2], 0.95).unwrap();
/// assert!(lo < 10.0 && 10.0 < hi);
/// ```
pub fn confidence_interval(data: &[f64], confidence_level: f64) -> Result<(f64, f64)> {
    if data.is_empty() {
        return Err(AnalyticsError::EmptyInput {
            context: "confidence interval dataset",
        });
    }
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(AnalyticsError::InvalidParameter {
            message: format!("confidence level must be in (0, 1), got {confidence_level}"),
        });
    }

    let m = mean(data)?;
    let z = inverse_normal_cdf(1.0 - (1.0 - confidence_level) / 2.0);
    let margin = z * std_dev(data) / (data.len() as f64).sqrt();
    Ok((m - margin, m + margin))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn p_values_are_probabilities(
            a in proptest::collection::vec(-1e3_f64..1e3, 1..=30),
            b in proptest::collection::vec(-1e3_f64..1e3, 1..=30),
        ) {
            let r = t_test(&a, &b, false).expect("test");
            prop_assert!((0.0..=1.0).contains(&r.p_value));
            prop_assert_eq!(r.reject_null, r.statistic.abs() > 1.96);
        }

        #[test]
        fn swapping_samples_negates_statistic(
            a in proptest::collection::vec(-1e3_f64..1e3, 2..=30),
            b in proptest::collection::vec(-1e3_f64..1e3, 2..=30),
        ) {
            let ab = t_test(&a, &b, false).expect("test");
            let ba = t_test(&b, &a, false).expect("test");
            prop_assert!((ab.statistic + ba.statistic).abs() < 1e-9);
            prop_assert_eq!(ab.reject_null, ba.reject_null);
        }

        #[test]
        fn chi_square_p_value_bounded(
            observed in proptest::collection::vec(0_u64..1000, 1..=50)
        ) {
            let r = chi_square_test(&observed, None).expect("test");
            prop_assert!((0.0..=1.0).contains(&r.p_value));
            prop_assert!(r.statistic >= 0.0);
        }
    }
}
