//! Floating-point reference oracle
//!
//! Computes what the fixed-point drivers should produce with real-valued
//! trigonometry, then reduces the result to a data word the way the chosen
//! [`WrapModel`] says. Two modelling choices are configurable:
//!
//! - [`GainModel`]: compare against compensated outputs (true scale) or raw
//!   core outputs (scaled by the processing gain G).
//! - [`WrapModel`]: production two's-complement wrap, or the asymmetric
//!   reduction used by the hardware testbenches, kept for comparison.

use fxcordic_core::{AngleFormat, CordicEngine, FixedAngle, ScalarFormat};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Scale of the outputs under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainModel {
    /// Gain-compensated driver outputs
    #[default]
    Compensated,
    /// Raw core outputs, magnitude carries G
    Raw,
}

/// How an out-of-range expected value is reduced to D bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapModel {
    /// Modulo 2^D, identical to the engine
    #[default]
    TwosComplement,
    /// `v mod (2^(D-1) - 1)` above the range, `v mod -2^(D-1)` below it,
    /// with floor-modulo signs. Not a true wrap.
    Reference,
}

/// Asymmetric reduction of [`WrapModel::Reference`].
pub fn reference_wrap(value: i64, bits: u32) -> i64 {
    let max = (1i64 << (bits - 1)) - 1;
    let min = -(1i64 << (bits - 1));
    if value > max {
        // Positive modulus: result in [0, max)
        if max == 0 {
            return 0;
        }
        value.rem_euclid(max)
    } else if value < min {
        // Negative modulus: result in (min, 0]
        let m = -min;
        match value.rem_euclid(m) {
            0 => 0,
            r => r - m,
        }
    } else {
        value
    }
}

/// Expected rotation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedRect {
    pub x: i64,
    pub y: i64,
}

/// Expected vectoring output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedPolar {
    pub magnitude: i64,
    pub phase: FixedAngle,
}

/// Real-valued model of the engine.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceOracle {
    scalar: ScalarFormat,
    angle: AngleFormat,
    processing_gain: f64,
    gain_model: GainModel,
    wrap_model: WrapModel,
}

impl ReferenceOracle {
    pub fn new(engine: &CordicEngine, gain_model: GainModel, wrap_model: WrapModel) -> Self {
        Self {
            scalar: engine.scalar_format(),
            angle: engine.angle_format(),
            processing_gain: engine.processing_gain(),
            gain_model,
            wrap_model,
        }
    }

    pub fn gain_model(&self) -> GainModel {
        self.gain_model
    }

    pub fn wrap_model(&self) -> WrapModel {
        self.wrap_model
    }

    pub fn angle_format(&self) -> AngleFormat {
        self.angle
    }

    /// Output scale factor: 1 or G.
    pub fn scale(&self) -> f64 {
        match self.gain_model {
            GainModel::Compensated => 1.0,
            GainModel::Raw => self.processing_gain,
        }
    }

    /// Round to the nearest integer and reduce to D bits.
    pub fn reduce(&self, value: f64) -> i64 {
        let rounded = value.round() as i64;
        match self.wrap_model {
            WrapModel::TwosComplement => self.scalar.wrap(rounded).raw(),
            WrapModel::Reference => reference_wrap(rounded, self.scalar.bits()),
        }
    }

    /// `(magnitude·cos θ, magnitude·sin θ)` scaled per the gain model.
    pub fn rotation(&self, magnitude: i64, angle: FixedAngle) -> ExpectedRect {
        let v = Complex64::from_polar(magnitude as f64 * self.scale(), self.angle.to_radians(angle));
        ExpectedRect {
            x: self.reduce(v.re),
            y: self.reduce(v.im),
        }
    }

    /// `sqrt(x² + y²)` scaled per the gain model, and `atan2(y, x)` encoded
    /// with the angle codec. `(0, 0)` gives phase 0.
    pub fn vectoring(&self, x: i64, y: i64) -> ExpectedPolar {
        let (r, theta) = Complex64::new(x as f64, y as f64).to_polar();
        // atan2 of finite inputs is finite
        let phase = self.angle.from_radians(theta).unwrap_or(FixedAngle::ZERO);
        ExpectedPolar {
            magnitude: self.reduce(r * self.scale()),
            phase,
        }
    }
}

/// Expected cascade output for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedCascade {
    pub phi: FixedAngle,
    pub theta: FixedAngle,
    pub stage1_magnitude: i64,
    pub feedback_magnitude: i64,
}

/// Real-valued model of the two-stage cascade.
///
/// Tracks the feedback in full precision, so it drifts from the fixed-point
/// cascade by the accumulated truncation of the compensation stages.
#[derive(Debug, Clone)]
pub struct ReferenceCascade {
    oracle: ReferenceOracle,
    lambda: Option<f64>,
    feedback: f64,
}

impl ReferenceCascade {
    /// Cascade magnitudes are always compensated; the oracle's gain model is ignored.
    pub fn new(oracle: ReferenceOracle, lambda: Option<f64>) -> Self {
        Self {
            oracle: ReferenceOracle {
                gain_model: GainModel::Compensated,
                ..oracle
            },
            lambda,
            feedback: 0.0,
        }
    }

    pub fn feedback(&self) -> f64 {
        self.feedback
    }

    pub fn reset(&mut self) {
        self.feedback = 0.0;
    }

    pub fn feed(&mut self, i: i64, q: i64) -> ExpectedCascade {
        let angle = self.oracle.angle;
        let stage1 = Complex64::new(i as f64, q as f64);
        let mag1 = stage1.norm();

        let scaled = self.feedback * self.lambda.unwrap_or(1.0);
        let stage2 = Complex64::new(scaled, mag1);
        self.feedback = stage2.norm();

        ExpectedCascade {
            phi: angle.from_radians(stage1.arg()).unwrap_or(FixedAngle::ZERO),
            theta: angle.from_radians(stage2.arg()).unwrap_or(FixedAngle::ZERO),
            stage1_magnitude: self.oracle.reduce(mag1),
            feedback_magnitude: self.oracle.reduce(self.feedback),
        }
    }
}
