//! Special functions: error function and the standard normal distribution.
//!
//! The hypothesis tests in this crate approximate their p-values with the
//! standard normal CDF rather than exact Student-t or χ² distributions.
//! These are the approximations they share.

use std::f64::consts::SQRT_2;

use u_numflow::special;

/// Error function, erf(x) = 2·Φ(x·√2) − 1.
pub fn erf(x: f64) -> f64 {
    2.0 * special::standard_normal_cdf(x * SQRT_2) - 1.0
}

/// Standard normal CDF Φ(x) = ½(1 + erf(x/√2)).
pub fn standard_normal_cdf(x: f64) -> f64 {
    special::standard_normal_cdf(x)
}

/// Two-tailed p-value for a z-like statistic: 2·(1 − Φ(|z|)), in [0, 1].
pub fn two_tailed_normal_p(z: f64) -> f64 {
    if z.is_nan() {
        return 1.0;
    }
    (2.0 * (1.0 - standard_normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Inverse standard normal CDF (quantile function).
///
/// Returns ±∞ at p = 1 and p = 0, NaN outside [0, 1].
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    special::inverse_normal_cdf(p)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn inverse_is_left_inverse_of_cdf(p in 0.001_f64..0.999) {
            let z = inverse_normal_cdf(p);
            prop_assert!((standard_normal_cdf(z) - p).abs() < 1e-6, "p = {p}, z = {z}");
        }

        #[test]
        fn cdf_is_symmetric(x in -8.0_f64..8.0) {
            let total = standard_normal_cdf(x) + standard_normal_cdf(-x);
            prop_assert!((total - 1.0).abs() < 1e-9, "Φ(x) + Φ(-x) = {total}");
        }
    }
}
