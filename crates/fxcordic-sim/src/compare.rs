//! Percentage-error comparator
//!
//! `error = 100·(actual − expected)/expected`. An expected value of zero has
//! no relative error; the comparator then reports a fallback figure instead
//! (see [`Comparison::ZeroExpected`]). The fallback is a coarser check than
//! the relative error and is flagged as such in reports.

use fxcordic_core::{AngleFormat, Degeneracy, FixedAngle};
use serde::Serialize;

/// Outcome of comparing one output against its reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Comparison {
    /// Relative error in percent
    Relative { percent: f64 },
    /// Expected value was zero. For scalars `fallback` is the actual value as
    /// a percentage of the input magnitude (or the raw actual value when the
    /// input magnitude is zero too); for phases it is the signed actual angle
    /// as a percentage of a full turn.
    ZeroExpected { fallback: f64 },
}

impl Comparison {
    /// The figure checked against the tolerance.
    pub fn error(&self) -> f64 {
        match *self {
            Comparison::Relative { percent } => percent,
            Comparison::ZeroExpected { fallback } => fallback,
        }
    }

    /// `|error| < tolerance`.
    pub fn passes(&self, tolerance_percent: f64) -> bool {
        self.error().abs() < tolerance_percent
    }

    pub fn degeneracy(&self) -> Option<Degeneracy> {
        match self {
            Comparison::Relative { .. } => None,
            Comparison::ZeroExpected { .. } => Some(Degeneracy::ZeroExpected),
        }
    }
}

/// Compare a scalar output. `input_magnitude` scales the zero-expected fallback.
pub fn compare_scalar(actual: i64, expected: i64, input_magnitude: i64) -> Comparison {
    if expected == 0 {
        let fallback = if input_magnitude == 0 {
            actual as f64
        } else {
            100.0 * actual as f64 / input_magnitude.abs() as f64
        };
        return Comparison::ZeroExpected { fallback };
    }
    Comparison::Relative {
        percent: 100.0 * (actual - expected) as f64 / expected as f64,
    }
}

/// Compare a phase output using the wrapped signed difference, so 359.9°
/// against 0.1° is a small error.
pub fn compare_phase(actual: FixedAngle, expected: FixedAngle, format: &AngleFormat) -> Comparison {
    if expected == FixedAngle::ZERO {
        return Comparison::ZeroExpected {
            fallback: 100.0 * format.to_signed(actual) as f64 / format.full_turn(),
        };
    }
    Comparison::Relative {
        percent: 100.0 * format.signed_diff(actual, expected) as f64 / expected.raw() as f64,
    }
}
