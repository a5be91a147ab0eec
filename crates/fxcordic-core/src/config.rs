//! # Engine Configuration
//!
//! The three parameters that fix the shape of a CORDIC engine:
//!
//! - `angle_bits` (A): width of a [`FixedAngle`](crate::FixedAngle), a fraction of a full turn
//! - `data_bits` (D): width of a [`FixedScalar`](crate::FixedScalar), two's complement
//! - `iterations` (N): micro-rotations per call, defaults to D
//!
//! ## Example Configuration
//!
//! ```yaml
//! angle_bits: 32
//! data_bits: 16
//! iterations: 16
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CordicError, CordicResult};

/// Widest supported angle word.
pub const MAX_ANGLE_BITS: u32 = 64;

/// Widest supported data word. The gain product needs 2·D bits and is held in an `i64`.
pub const MAX_DATA_BITS: u32 = 32;

/// Largest iteration count; shifts of an `i64` stay below 64.
pub const MAX_ITERATIONS: u32 = 64;

/// CORDIC engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CordicConfig {
    /// Angle word width in bits
    pub angle_bits: u32,
    /// Data word width in bits
    pub data_bits: u32,
    /// Iteration count (None = `data_bits`)
    pub iterations: Option<u32>,
}

impl Default for CordicConfig {
    fn default() -> Self {
        Self {
            angle_bits: 32,
            data_bits: 16,
            iterations: None,
        }
    }
}

impl CordicConfig {
    /// Create a configuration with the canonical iteration count N = D.
    pub fn new(angle_bits: u32, data_bits: u32) -> Self {
        Self {
            angle_bits,
            data_bits,
            iterations: None,
        }
    }

    /// Override the iteration count.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Iteration count actually used by the engine.
    pub fn effective_iterations(&self) -> u32 {
        self.iterations.unwrap_or(self.data_bits)
    }

    /// Parse a configuration from a YAML string.
    pub fn parse(yaml: &str) -> CordicResult<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| CordicError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to YAML.
    pub fn to_yaml(&self) -> CordicResult<String> {
        serde_yaml::to_string(self).map_err(|e| CordicError::Config(e.to_string()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CordicResult<()> {
        check_width("angle_bits", self.angle_bits, MAX_ANGLE_BITS)?;
        check_width("data_bits", self.data_bits, MAX_DATA_BITS)?;

        let iterations = self.effective_iterations();
        if iterations == 0 || iterations > MAX_ITERATIONS {
            return Err(CordicError::InvalidIterations {
                value: iterations,
                max: MAX_ITERATIONS,
            });
        }

        Ok(())
    }
}

fn check_width(field: &'static str, value: u32, max: u32) -> CordicResult<()> {
    if value == 0 || value > max {
        return Err(CordicError::InvalidWidth {
            field,
            value,
            min: 1,
            max,
        });
    }
    Ok(())
}
