//! Dense linear systems.
//!
//! A Gaussian-elimination [`Solver`] with partial pivoting over the
//! row-major [`Matrix`] of `u_numflow`, used by the regression layer to
//! solve the normal equations.
//!
//! # Singular systems
//!
//! When no usable pivot remains for a column (magnitude below
//! `pivot_epsilon`), elimination skips that column and the unknown is
//! resolved by the solver's [`SingularPolicy`]. The only policy today is
//! [`SingularPolicy::ZeroFill`]: the unknown is set to zero and
//! back-substitution continues. Singular systems therefore return a
//! vector with zero entries for the underdetermined unknowns instead of
//! failing.
//!
//! # Examples
//!
//! ```
//! use u_quality::solver::{matrix, solve};
//!
//! let a = matrix(2, 2, vec![2.0, 1.0, 1.0, 3.0]).unwrap();
//! let x = solve(&a, &[3.0, 5.0]).unwrap();
//! assert!((x[0] - 0.8).abs() < 1e-12);
//! assert!((x[1] - 1.4).abs() < 1e-12);
//!
//! // Singular: the second unknown is underdetermined and zero-filled.
//! let s = matrix(2, 2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
//! let x = solve(&s, &[3.0, 6.0]).unwrap();
//! assert_eq!(x, vec![3.0, 0.0]);
//! ```

use serde::{Deserialize, Serialize};
pub use u_numflow::matrix::Matrix;

use crate::config::SolverConfig;
use crate::error::{AnalyticsError, Result};

/// Builds a row-major [`Matrix`].
///
/// # Errors
///
/// [`AnalyticsError::MismatchedLength`] when `data.len() != rows * cols`,
/// [`AnalyticsError::InvalidParameter`] when the shape is otherwise rejected.
pub fn matrix(rows: usize, cols: usize, data: Vec<f64>) -> Result<Matrix> {
    if data.len() != rows * cols {
        return Err(AnalyticsError::MismatchedLength {
            left: rows * cols,
            right: data.len(),
        });
    }
    Matrix::new(rows, cols, data).map_err(|_| AnalyticsError::InvalidParameter {
        message: format!("cannot build a {rows}x{cols} matrix"),
    })
}

/// Error for a matrix product whose operands do not conform.
pub(crate) fn nonconformable<E>(_: E) -> AnalyticsError {
    AnalyticsError::InvalidParameter {
        message: "matrix dimensions do not conform".to_string(),
    }
}

/// How the solver resolves an unknown whose column has no usable pivot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SingularPolicy {
    /// The unknown is set to zero.
    #[default]
    ZeroFill,
}

impl SingularPolicy {
    /// Value assigned to an unknown whose column could not be eliminated.
    fn resolve_underdetermined(self, column: usize) -> f64 {
        match self {
            Self::ZeroFill => {
                tracing::warn!(column, "no usable pivot; unknown zero-filled");
                0.0
            }
        }
    }
}

/// Gaussian elimination with partial pivoting.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
    policy: SingularPolicy,
}

impl Solver {
    /// Creates a solver with the given configuration and the zero-fill policy.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            policy: SingularPolicy::ZeroFill,
        }
    }

    /// Replaces the singular-column policy.
    pub fn with_policy(mut self, policy: SingularPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active singular-column policy.
    pub fn policy(&self) -> SingularPolicy {
        self.policy
    }

    /// Solves `a · x = b`.
    ///
    /// # Errors
    ///
    /// [`AnalyticsError::InvalidParameter`] when the columns of `a` do not
    /// match `b`, [`AnalyticsError::MismatchedLength`] when `a` is not
    /// square. Singular systems are not errors.
    pub fn solve(&self, a: &Matrix, b: &[f64]) -> Result<Vec<f64>> {
        let n = b.len();
        let rows = a.mul_vec(b).map_err(nonconformable)?.len();
        if rows != n {
            return Err(AnalyticsError::MismatchedLength {
                left: n,
                right: rows,
            });
        }

        // Augmented matrix [A | b], one row per equation.
        let mut aug: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let mut row: Vec<f64> = (0..n).map(|j| a.get(i, j)).collect();
                row.push(b[i]);
                row
            })
            .collect();
        let eps = self.config.pivot_epsilon;
        let mut eliminable = vec![true; n];

        for i in 0..n {
            // Partial pivoting: largest |a[k][i]| among the remaining rows.
            let mut pivot_row = i;
            for k in (i + 1)..n {
                if aug[k][i].abs() > aug[pivot_row][i].abs() {
                    pivot_row = k;
                }
            }
            aug.swap(i, pivot_row);

            if aug[i][i].abs() < eps {
                eliminable[i] = false;
                continue;
            }

            let pivot = aug[i].clone();
            for row in aug.iter_mut().skip(i + 1) {
                let factor = row[i] / pivot[i];
                if factor == 0.0 {
                    continue;
                }
                for (r, p) in row.iter_mut().zip(&pivot).skip(i) {
                    *r -= factor * p;
                }
            }
        }

        // Back-substitution over the (possibly incomplete) upper triangle.
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            if !eliminable[i] {
                x[i] = self.policy.resolve_underdetermined(i);
                continue;
            }
            let tail: f64 = ((i + 1)..n).map(|j| aug[i][j] * x[j]).sum();
            x[i] = (aug[i][n] - tail) / aug[i][i];
        }

        Ok(x)
    }
}

/// Solves `a · x = b` with the default solver.
pub fn solve(a: &Matrix, b: &[f64]) -> Result<Vec<f64>> {
    Solver::default().solve(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(n: usize, data: Vec<f64>) -> Matrix {
        matrix(n, n, data).expect("matrix")
    }

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < tol, "x[{i}] = {a}, expected {e}");
        }
    }

    #[test]
    fn solves_three_by_three() {
        // x = 1, y = -2, z = 3
        let a = square(3, vec![2.0, 1.0, -1.0, -3.0, -1.0, 2.0, -2.0, 1.0, 2.0]);
        let b = [2.0 * 1.0 - 2.0 - 3.0, -3.0 + 2.0 + 6.0, -2.0 - 2.0 + 6.0];
        let x = solve(&a, &b).expect("solve");
        assert_close(&x, &[1.0, -2.0, 3.0], 1e-10);
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        // Naive elimination would divide by a[0][0] = 0.
        let a = square(2, vec![0.0, 1.0, 1.0, 1.0]);
        let x = solve(&a, &[2.0, 3.0]).expect("solve");
        assert_close(&x, &[1.0, 2.0], 1e-12);
    }

    #[test]
    fn singular_column_is_zero_filled() {
        let a = square(2, vec![1.0, 2.0, 2.0, 4.0]);
        let x = solve(&a, &[3.0, 6.0]).expect("solve");
        assert_eq!(x, vec![3.0, 0.0]);
    }

    #[test]
    fn all_zero_system_gives_zero_vector() {
        let a = square(3, vec![0.0; 9]);
        let x = solve(&a, &[1.0, 2.0, 3.0]).expect("solve");
        assert_eq!(x, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn epsilon_is_configurable() {
        let a = square(1, vec![1e-6]);
        let strict = Solver::new(SolverConfig {
            pivot_epsilon: 1e-3,
        });
        assert_eq!(strict.solve(&a, &[1.0]).expect("solve"), vec![0.0]);
        let x = solve(&a, &[1.0]).expect("solve");
        assert!((x[0] - 1e6).abs() < 1e-3);
    }

    #[test]
    fn dimension_errors() {
        let rect = matrix(2, 3, vec![0.0; 6]).expect("matrix");
        assert!(matches!(
            solve(&rect, &[1.0, 2.0, 3.0]),
            Err(AnalyticsError::MismatchedLength { left: 3, right: 2 })
        ));
        assert!(matches!(
            solve(&rect, &[1.0, 2.0]),
            Err(AnalyticsError::InvalidParameter { .. })
        ));
        assert!(solve(&square(2, vec![0.0; 4]), &[1.0]).is_err());
        assert!(matches!(
            matrix(2, 2, vec![1.0]),
            Err(AnalyticsError::MismatchedLength { left: 4, right: 1 })
        ));
    }

    #[test]
    fn default_policy_is_zero_fill() {
        assert_eq!(Solver::default().policy(), SingularPolicy::ZeroFill);
    }
}
