//! CORDIC error types

use thiserror::Error;

/// Result type for CORDIC operations
pub type CordicResult<T> = Result<T, CordicError>;

/// Errors raised while configuring the engine or converting its inputs.
///
/// The iteration core itself never fails: overflow wraps silently and
/// degenerate inputs are handled by fixed fallbacks (see [`Degeneracy`]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CordicError {
    /// A bit width is outside the supported range
    #[error("Invalid {field}: {value} (supported range {min}..={max})")]
    InvalidWidth {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Iteration count is zero or larger than the shift range
    #[error("Invalid iteration count: {value} (supported range 1..={max})")]
    InvalidIterations { value: u32, max: u32 },

    /// NaN or infinite angle handed to the angle codec
    #[error("Angle must be finite, got {0}")]
    NonFiniteAngle(f64),

    /// Forgetting factor outside the open interval (0, 1)
    #[error("Forgetting factor must lie in (0, 1), got {0}")]
    InvalidForgettingFactor(f64),

    /// Engine configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CordicError {
    /// Check if this error rejects an engine configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CordicError::InvalidWidth { .. }
                | CordicError::InvalidIterations { .. }
                | CordicError::Config(_)
        )
    }

    /// Check if this error is a precondition violation on a call input
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CordicError::NonFiniteAngle(_) | CordicError::InvalidForgettingFactor(_)
        )
    }
}

/// Degenerate inputs that are recovered locally instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    /// Vectoring input `(0, 0)`: phase is undefined, reported as 0
    ZeroVector,
    /// Comparison against an expected value of 0: relative error is undefined
    ZeroExpected,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degeneracy::ZeroVector => write!(f, "zero vector"),
            Degeneracy::ZeroExpected => write!(f, "zero expected value"),
        }
    }
}
