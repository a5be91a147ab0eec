//! Harness error types

use fxcordic_core::CordicError;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors raised by a validation run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Engine construction or codec failure
    #[error("Engine error: {0}")]
    Engine(#[from] CordicError),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// One or more trials exceeded the tolerance
    #[error("{test}: {violations} of {trials} trials exceeded {tolerance}% (worst error {worst_error:.3}%)")]
    ToleranceViolation {
        test: String,
        violations: usize,
        trials: usize,
        worst_error: f64,
        tolerance: f64,
    },

    /// Report could not be serialized
    #[error("Report error: {0}")]
    Report(String),
}

impl HarnessError {
    /// Whether this is a test failure rather than a setup fault.
    pub fn is_tolerance_violation(&self) -> bool {
        matches!(self, HarnessError::ToleranceViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_violation_display() {
        let err = HarnessError::ToleranceViolation {
            test: "rotation_sweep".to_string(),
            violations: 2,
            trials: 30,
            worst_error: 4.25,
            tolerance: 3.0,
        };
        assert!(err.is_tolerance_violation());
        assert_eq!(
            err.to_string(),
            "rotation_sweep: 2 of 30 trials exceeded 3% (worst error 4.250%)"
        );
    }

    #[test]
    fn test_from_engine_error() {
        let err: HarnessError = CordicError::NonFiniteAngle(f64::NAN).into();
        assert!(matches!(err, HarnessError::Engine(_)));
        assert!(!err.is_tolerance_violation());
    }
}
