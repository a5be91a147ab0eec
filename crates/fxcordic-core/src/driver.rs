//! Mode drivers
//!
//! [`CordicEngine`] owns the configuration-time data (micro-step table and
//! gain constant) and hands out drivers that share it read-only:
//!
//! - [`RotationDriver`]: magnitude + angle → `(x, y)`
//! - [`VectoringDriver`]: `(x, y)` → magnitude + phase
//!
//! ## Example
//!
//! ```rust
//! use fxcordic_core::{CordicConfig, CordicEngine};
//!
//! let engine = CordicEngine::new(CordicConfig::new(32, 16)).unwrap();
//! let s = engine.scalar_format();
//!
//! let rect = engine.rotation().run_degrees(s.wrap(19429), 45.0).unwrap();
//! assert!((rect.x.raw() - 13739).abs() < 400);
//!
//! let polar = engine.vectoring().run(s.wrap(5000), s.wrap(2000));
//! assert!((polar.magnitude.raw() - 5385).abs() < 160);
//! ```

use std::sync::Arc;

use crate::angle::{AngleFormat, FixedAngle};
use crate::config::CordicConfig;
use crate::error::{CordicResult, Degeneracy};
use crate::fixed::{FixedScalar, ScalarFormat};
use crate::gain::{processing_gain, GainConstant};
use crate::iteration::{IterationCore, Mode, Vector2};
use crate::table::MicroStepTable;

/// Rectangular output of the rotation driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectSample {
    pub x: FixedScalar,
    pub y: FixedScalar,
}

/// Polar output of the vectoring driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolarSample {
    pub magnitude: FixedScalar,
    pub phase: FixedAngle,
    /// Set when the input had no defined phase and the fallback was used
    pub degenerate: Option<Degeneracy>,
}

/// A configured CORDIC engine. Cloning shares the micro-step table.
#[derive(Debug, Clone)]
pub struct CordicEngine {
    config: CordicConfig,
    core: IterationCore,
    gain: GainConstant,
    processing_gain: f64,
}

impl CordicEngine {
    /// Validate `config` and precompute the table and gain constant.
    pub fn new(config: CordicConfig) -> CordicResult<Self> {
        config.validate()?;

        let scalar = ScalarFormat::new(config.data_bits)?;
        let angle = AngleFormat::new(config.angle_bits)?;
        let iterations = config.effective_iterations() as usize;

        let table = Arc::new(MicroStepTable::new(angle, iterations));
        let gain = GainConstant::new(scalar, iterations);
        let processing_gain = processing_gain(iterations);

        tracing::debug!(
            angle_bits = config.angle_bits,
            data_bits = config.data_bits,
            iterations,
            processing_gain,
            "CORDIC engine configured; to cancel gain {}",
            gain
        );
        if let Some(limit) = table.resolution_limit() {
            tracing::debug!(
                limit,
                iterations,
                "micro-steps past iteration {} are below one angle LSB",
                limit
            );
        }

        Ok(Self {
            config,
            core: IterationCore::new(table, scalar),
            gain,
            processing_gain,
        })
    }

    pub fn config(&self) -> &CordicConfig {
        &self.config
    }

    pub fn iterations(&self) -> usize {
        self.core.iterations()
    }

    pub fn scalar_format(&self) -> ScalarFormat {
        self.core.scalar_format()
    }

    pub fn angle_format(&self) -> AngleFormat {
        self.core.angle_format()
    }

    pub fn table(&self) -> &MicroStepTable {
        self.core.table()
    }

    pub fn gain_constant(&self) -> GainConstant {
        self.gain
    }

    /// Theoretical processing gain `∏ sqrt(1 + 2^-2i)` for this iteration count.
    pub fn processing_gain(&self) -> f64 {
        self.processing_gain
    }

    /// Largest magnitude whose gain-scaled image still fits a data word, with
    /// one LSB of headroom per iteration for truncation.
    pub fn max_safe_magnitude(&self) -> i64 {
        let headroom = self.scalar_format().max_value() - self.iterations() as i64;
        ((headroom as f64 / self.processing_gain).floor() as i64).max(0)
    }

    pub fn iteration_core(&self) -> &IterationCore {
        &self.core
    }

    pub fn rotation(&self) -> RotationDriver {
        RotationDriver {
            core: self.core.clone(),
            gain: self.gain,
        }
    }

    pub fn vectoring(&self) -> VectoringDriver {
        VectoringDriver {
            core: self.core.clone(),
            gain: self.gain,
        }
    }
}

/// Polar → rectangular conversion.
#[derive(Debug, Clone)]
pub struct RotationDriver {
    core: IterationCore,
    gain: GainConstant,
}

impl RotationDriver {
    /// Rotate `(magnitude, 0)` by `angle` and cancel the processing gain:
    /// `(magnitude·cos(angle), magnitude·sin(angle))`.
    pub fn run(&self, magnitude: FixedScalar, angle: FixedAngle) -> RectSample {
        let raw = self.rotate(magnitude, angle);
        RectSample {
            x: self.gain.compensate(raw.x),
            y: self.gain.compensate(raw.y),
        }
    }

    /// Same as [`run`](Self::run) with the angle given in degrees.
    pub fn run_degrees(&self, magnitude: FixedScalar, degrees: f64) -> CordicResult<RectSample> {
        let angle = self.core.angle_format().from_degrees(degrees)?;
        Ok(self.run(magnitude, angle))
    }

    /// Raw iteration-core output, still scaled by the processing gain and
    /// wrapped to D bits.
    pub fn run_uncompensated(&self, magnitude: FixedScalar, angle: FixedAngle) -> RectSample {
        let s = self.core.scalar_format();
        let raw = self.rotate(magnitude, angle);
        RectSample {
            x: s.wrap(raw.x.raw()),
            y: s.wrap(raw.y.raw()),
        }
    }

    // Terminal vector with guard bits
    fn rotate(&self, magnitude: FixedScalar, angle: FixedAngle) -> Vector2 {
        let seed = self
            .core
            .seed_rotation(Vector2::new(magnitude, FixedScalar::ZERO), angle);
        self.core.run(Mode::Rotation, seed).vector
    }

    pub fn gain_constant(&self) -> GainConstant {
        self.gain
    }
}

/// Rectangular → polar conversion.
#[derive(Debug, Clone)]
pub struct VectoringDriver {
    core: IterationCore,
    gain: GainConstant,
}

impl VectoringDriver {
    /// Magnitude `sqrt(x² + y²)` (gain cancelled) and phase `atan2(y, x)`.
    ///
    /// `(0, 0)` has no phase; it returns magnitude 0, phase 0 and marks the
    /// sample [`Degeneracy::ZeroVector`].
    pub fn run(&self, x: FixedScalar, y: FixedScalar) -> PolarSample {
        self.polar(x, y, |m| self.gain.compensate(m))
    }

    /// Raw iteration-core output; only the magnitude carries the gain. The
    /// magnitude is wrapped to D bits, the phase is unaffected by the wrap.
    pub fn run_uncompensated(&self, x: FixedScalar, y: FixedScalar) -> PolarSample {
        let s = self.core.scalar_format();
        self.polar(x, y, |m| s.wrap(m.raw()))
    }

    // `narrow` maps the guarded terminal x to the output magnitude
    fn polar(&self, x: FixedScalar, y: FixedScalar, narrow: impl Fn(FixedScalar) -> FixedScalar) -> PolarSample {
        if x.is_zero() && y.is_zero() {
            tracing::debug!("vectoring input is the zero vector; phase fixed to 0");
            return PolarSample {
                magnitude: FixedScalar::ZERO,
                phase: FixedAngle::ZERO,
                degenerate: Some(Degeneracy::ZeroVector),
            };
        }

        let seed = self.core.seed_vectoring(Vector2::new(x, y));
        let done = self.core.run(Mode::Vectoring, seed);
        PolarSample {
            magnitude: narrow(done.vector.x),
            phase: done.angle,
            degenerate: None,
        }
    }

    pub fn gain_constant(&self) -> GainConstant {
        self.gain
    }

    pub fn scalar_format(&self) -> ScalarFormat {
        self.core.scalar_format()
    }

    pub fn angle_format(&self) -> AngleFormat {
        self.core.angle_format()
    }
}
