//! Run rules for detecting non-random patterns in control chart data.
//!
//! Three tests are applied to an individuals series:
//!
//! 1. A point strictly beyond the control limits (Nelson Rule 1).
//! 2. A run of consecutive points strictly on one side of the center line
//!    (Nelson Rule 2, with a configurable length; 7 by default).
//! 3. A run of consecutive points strictly increasing or strictly
//!    decreasing (Nelson Rule 3, 6 points by default).
//!
//! # References
//!
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

use std::cmp::Ordering;

use super::chart::{ControlLimits, ViolationType};

/// A test for special causes of variation.
///
/// Implementors return `(point_index, violation_type)` pairs, reporting a
/// run at every point from the one that completes it onward.
pub trait RunRule {
    /// Checks `values` against this rule.
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<(usize, ViolationType)>;
}

/// Any point strictly above the UCL or below the LCL.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeyondLimits;

/// `length` or more consecutive points strictly on the same side of the
/// center line. A point exactly on the center line breaks the run.
#[derive(Debug, Clone, Copy)]
pub struct SameSideRun {
    /// Minimum run length, at least 2.
    pub length: usize,
}

/// `length` or more consecutive points, each strictly greater (or each
/// strictly smaller) than the previous one. Equal neighbours break the run.
#[derive(Debug, Clone, Copy)]
pub struct MonotoneTrend {
    /// Minimum number of points in the trend, at least 3.
    pub length: usize,
}

impl RunRule for BeyondLimits {
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<(usize, ViolationType)> {
        values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > limits.ucl || v < limits.lcl)
            .map(|(i, _)| (i, ViolationType::BeyondLimits))
            .collect()
    }
}

impl RunRule for SameSideRun {
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<(usize, ViolationType)> {
        let cl = limits.cl;
        let sides: Vec<Ordering> = values
            .iter()
            .map(|v| v.partial_cmp(&cl).unwrap_or(Ordering::Equal))
            .collect();

        // Run lengths count points.
        run_ends(&sides, self.length)
            .map(|i| (i, ViolationType::Run))
            .collect()
    }
}

impl RunRule for MonotoneTrend {
    fn check(&self, values: &[f64], _limits: &ControlLimits) -> Vec<(usize, ViolationType)> {
        let dirs: Vec<Ordering> = values
            .windows(2)
            .map(|w| w[1].partial_cmp(&w[0]).unwrap_or(Ordering::Equal))
            .collect();

        // `length` points form `length - 1` same-direction changes; dirs[i]
        // is the step into point i + 1, where the violation is reported.
        run_ends(&dirs, self.length.saturating_sub(1))
            .map(|i| (i + 1, ViolationType::Trend))
            .collect()
    }
}

/// Whether `rule` fires anywhere in `values`.
pub(crate) fn fires(rule: &dyn RunRule, values: &[f64], limits: &ControlLimits) -> bool {
    !rule.check(values, limits).is_empty()
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Indices at which a run of equal, non-`Equal` entries reaches `min_len`
/// or more.
fn run_ends(marks: &[Ordering], min_len: usize) -> impl Iterator<Item = usize> + '_ {
    let min_len = min_len.max(1);
    let mut run_length = 0_usize;
    marks.iter().enumerate().filter_map(move |(i, &m)| {
        if m == Ordering::Equal {
            run_length = 0;
        } else if i > 0 && marks[i - 1] == m {
            run_length += 1;
        } else {
            run_length = 1;
        }
        (run_length >= min_len).then_some(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(cl: f64, half_width: f64) -> ControlLimits {
        ControlLimits {
            ucl: cl + half_width,
            cl,
            lcl: cl - half_width,
        }
    }

    #[test]
    fn beyond_limits_is_strict() {
        let l = limits(10.0, 3.0);
        let v = BeyondLimits.check(&[10.0, 13.0, 13.1, 6.9, 7.0], &l);
        assert_eq!(
            v,
            vec![(2, ViolationType::BeyondLimits), (3, ViolationType::BeyondLimits)]
        );
    }

    #[test]
    fn seven_above_center_is_a_run() {
        let l = limits(0.0, 10.0);
        let data = [1.0, 2.0, 1.0, 3.0, 1.0, 2.0, 1.0, -1.0, -2.0];
        let v = SameSideRun { length: 7 }.check(&data, &l);
        assert_eq!(v, vec![(6, ViolationType::Run)]);
    }

    #[test]
    fn six_on_one_side_is_not_a_run() {
        let l = limits(0.0, 10.0);
        let data = [1.0, 2.0, 1.0, 3.0, 1.0, 2.0, -1.0];
        assert!(SameSideRun { length: 7 }.check(&data, &l).is_empty());
    }

    #[test]
    fn center_line_point_breaks_run() {
        let l = limits(0.0, 10.0);
        let data = [1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        assert!(SameSideRun { length: 7 }.check(&data, &l).is_empty());
    }

    #[test]
    fn long_run_reports_every_point_past_threshold() {
        let l = limits(0.0, 10.0);
        let data = [-1.0; 9];
        let v = SameSideRun { length: 7 }.check(&data, &l);
        let idx: Vec<usize> = v.iter().map(|&(i, _)| i).collect();
        assert_eq!(idx, vec![6, 7, 8]);
    }

    #[test]
    fn six_increasing_is_a_trend() {
        let l = limits(3.0, 10.0);
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let v = MonotoneTrend { length: 6 }.check(&data, &l);
        assert_eq!(v, vec![(5, ViolationType::Trend)]);
    }

    #[test]
    fn five_decreasing_is_not_a_trend() {
        let l = limits(3.0, 10.0);
        let data = [6.0, 5.0, 4.0, 3.0, 2.0, 2.5];
        assert!(MonotoneTrend { length: 6 }.check(&data, &l).is_empty());
    }

    #[test]
    fn trend_does_not_depend_on_limits() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let rule = MonotoneTrend { length: 6 };
        let wide = rule.check(&data, &limits(3.0, 10.0));
        let narrow = rule.check(&data, &limits(-50.0, 0.5));
        assert_eq!(wide, narrow);
    }

    #[test]
    fn equal_neighbours_break_trend() {
        let l = limits(3.0, 10.0);
        let data = [1.0, 2.0, 3.0, 3.0, 4.0, 5.0, 6.0];
        assert!(MonotoneTrend { length: 6 }.check(&data, &l).is_empty());
    }

    #[test]
    fn short_series_never_fire() {
        let l = limits(0.0, 1.0);
        assert!(!fires(&SameSideRun { length: 7 }, &[1.0; 3], &l));
        assert!(!fires(&MonotoneTrend { length: 6 }, &[1.0, 2.0], &l));
        assert!(!fires(&MonotoneTrend { length: 6 }, &[], &l));
    }
}
