//! Processing-gain compensation
//!
//! Every micro-rotation stretches the vector by `sqrt(1 + 2^-2i)`, so after
//! N iterations the magnitude carries the processing gain
//! `G = ∏ sqrt(1 + 2^-2i)` (≈ 1.6468 for large N). The compensation stage
//! multiplies by `floor(2^(D-1) / G)` and shifts right by `D - 1`.

use crate::fixed::{FixedScalar, ScalarFormat};

/// Processing gain of `iterations` circular micro-rotations.
pub fn processing_gain(iterations: usize) -> f64 {
    (0..iterations).fold(1.0, |gain, i| {
        gain * (1.0 + 0.25f64.powi(i as i32)).sqrt()
    })
}

/// Fixed-point multiplier and shift that cancel the processing gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainConstant {
    multiplier: FixedScalar,
    shift: u32,
    format: ScalarFormat,
}

impl GainConstant {
    /// Derive the constant for `iterations` micro-rotations on `format` words.
    pub fn new(format: ScalarFormat, iterations: usize) -> Self {
        let shift = format.bits() - 1;
        let scale = (1i64 << shift) as f64 / processing_gain(iterations);
        Self {
            multiplier: format.wrap(scale.floor() as i64),
            shift,
            format,
        }
    }

    pub fn multiplier(&self) -> FixedScalar {
        self.multiplier
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// `(raw * multiplier) >> shift`, wrapped back to D bits.
    ///
    /// `raw` is normally a terminal value of the iteration core and may use
    /// its guard bits; the result is a plain D-bit word.
    #[inline]
    pub fn compensate(&self, raw: FixedScalar) -> FixedScalar {
        self.format.mul_shr(raw, self.multiplier, self.shift)
    }

    /// Effective scale applied by [`compensate`](Self::compensate).
    pub fn scale(&self) -> f64 {
        self.multiplier.raw() as f64 / (1i64 << self.shift) as f64
    }

    /// `multiplier * G / 2^shift - 1`: the quantization error of the constant.
    pub fn residual_error(&self, iterations: usize) -> f64 {
        self.scale() * processing_gain(iterations) - 1.0
    }
}

impl std::fmt::Display for GainConstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "multiply by 0x{:X} ({}), then shift right by {}",
            self.multiplier.raw(),
            self.multiplier.raw(),
            self.shift
        )
    }
}
