//! The pass/fail primitives every rule goes through.
//!
//! Different clauses of the standard quote different tolerances, so both
//! forms take the tolerance per call. A failed comparison yields a
//! [`Failure`] record, never an error, so evaluation always continues.

use crate::report::{Failure, RuleId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tolerance {
    /// `|actual - expected| <= value`, in the units of the quantity.
    Absolute(f64),
    /// `|actual - expected| / |expected| < value`. The expected value is the
    /// denominator; callers use the absolute form when it can be zero.
    Relative(f64),
}

impl Tolerance {
    pub fn holds(&self, actual: f64, expected: f64) -> bool {
        match self {
            Tolerance::Absolute(tol) => within_abs(actual, expected, *tol),
            Tolerance::Relative(frac) => within_rel(actual, expected, *frac),
        }
    }
}

pub fn within_abs(actual: f64, expected: f64, tolerance: f64) -> bool {
    is_close!(actual, expected, abs_tol = tolerance, rel_tol = 0.0)
}

pub fn within_rel(actual: f64, expected: f64, fraction: f64) -> bool {
    if actual == expected {
        return true;
    }
    ((actual - expected) / expected).abs() < fraction
}

/// Case-normalized exact match for categorical fields (control types,
/// control variables, reference temperature types).
pub fn same_token(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

/// Compare a numeric quantity, producing a failure record on mismatch.
pub fn check_value(
    rule: RuleId,
    object: impl std::fmt::Display,
    quantity: &str,
    expected: f64,
    actual: f64,
    units: Option<&str>,
    tolerance: Tolerance,
) -> Option<Failure> {
    if tolerance.holds(actual, expected) {
        None
    } else {
        Some(Failure::value_mismatch(
            rule,
            object,
            quantity,
            fmt_value(expected),
            fmt_value(actual),
            units,
        ))
    }
}

/// Compare a categorical quantity (case-normalized), producing a failure
/// record on mismatch. The reported values keep the model's original casing.
pub fn check_token(
    rule: RuleId,
    object: impl std::fmt::Display,
    quantity: &str,
    expected: &str,
    actual: &str,
) -> Option<Failure> {
    if same_token(expected, actual) {
        None
    } else {
        Some(Failure::value_mismatch(
            rule,
            object,
            quantity,
            expected,
            actual,
            None,
        ))
    }
}

/// Render a value with up to four decimals, trailing zeros trimmed, so
/// report messages read "0.3" rather than "0.30000000000000004".
pub fn fmt_value(value: f64) -> String {
    let rendered = format!("{value:.4}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" || trimmed == "-0" {
        "0".into()
    } else {
        trimmed.to_string()
    }
}
