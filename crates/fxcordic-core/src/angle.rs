//! Fixed-point angles and the angle codec
//!
//! A [`FixedAngle`] is an unsigned A-bit fraction of a full turn: value `v`
//! encodes `v / 2^A` turns. Angle arithmetic wraps modulo 2^A, so 360° and 0°
//! share one code and a negative angle is its positive equivalent (−45° → 315°).
//!
//! ```rust
//! use fxcordic_core::angle::{degrees_to_fixed_angle, fixed_angle_to_degrees};
//!
//! let angle = degrees_to_fixed_angle(-45.0, 32).unwrap();
//! assert_eq!(angle.raw(), 0xE000_0000);
//! assert!((fixed_angle_to_degrees(angle, 32) - 315.0).abs() < 1e-6);
//! ```

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::config::MAX_ANGLE_BITS;
use crate::error::{CordicError, CordicResult};

/// A-bit fraction of a full turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedAngle(pub(crate) u64);

impl FixedAngle {
    pub const ZERO: FixedAngle = FixedAngle(0);

    /// Underlying code.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FixedAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl std::fmt::UpperHex for FixedAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::UpperHex::fmt(&self.0, f)
    }
}

/// Arithmetic context for A-bit angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AngleFormat {
    bits: u32,
}

impl AngleFormat {
    /// Create a format for `bits`-wide angles (1..=64).
    pub fn new(bits: u32) -> CordicResult<Self> {
        if bits == 0 || bits > MAX_ANGLE_BITS {
            return Err(CordicError::InvalidWidth {
                field: "angle_bits",
                value: bits,
                min: 1,
                max: MAX_ANGLE_BITS,
            });
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    #[inline]
    fn mask(&self) -> u64 {
        u64::MAX >> (64 - self.bits)
    }

    /// Number of codes in a full turn, 2^A.
    pub fn full_turn(&self) -> f64 {
        2f64.powi(self.bits as i32)
    }

    pub fn half_turn(&self) -> FixedAngle {
        FixedAngle(1u64 << (self.bits - 1))
    }

    /// Quarter turn; zero for a 1-bit angle, which only codes 0° and 180°.
    pub fn quarter_turn(&self) -> FixedAngle {
        if self.bits < 2 {
            FixedAngle(0)
        } else {
            FixedAngle(1u64 << (self.bits - 2))
        }
    }

    /// Reduce `value` modulo 2^A.
    #[inline]
    pub fn wrap(&self, value: u64) -> FixedAngle {
        FixedAngle(value & self.mask())
    }

    #[inline]
    pub fn add(&self, a: FixedAngle, b: FixedAngle) -> FixedAngle {
        self.wrap(a.0.wrapping_add(b.0))
    }

    #[inline]
    pub fn sub(&self, a: FixedAngle, b: FixedAngle) -> FixedAngle {
        self.wrap(a.0.wrapping_sub(b.0))
    }

    /// True for angles in the upper half turn, i.e. negative when read as signed.
    #[inline]
    pub fn is_negative(&self, a: FixedAngle) -> bool {
        a.0 >= self.half_turn().0
    }

    /// Signed reading of an angle in LSBs, in [-2^(A-1), 2^(A-1)).
    pub fn to_signed(&self, a: FixedAngle) -> i128 {
        if self.is_negative(a) {
            a.0 as i128 - (1i128 << self.bits)
        } else {
            a.0 as i128
        }
    }

    /// Shortest signed distance `a - b` in LSBs, respecting wrap-around.
    pub fn signed_diff(&self, a: FixedAngle, b: FixedAngle) -> i128 {
        self.to_signed(self.sub(a, b))
    }

    /// True if `a` lies within a quarter turn of zero (inclusive).
    #[inline]
    pub fn within_quarter(&self, a: FixedAngle) -> bool {
        let quarter = self.quarter_turn().0;
        self.add(a, FixedAngle(quarter)).0 <= quarter << 1
    }

    /// Encode degrees: wrap to [0, 360), scale by 2^A/360, floor.
    pub fn from_degrees(&self, degrees: f64) -> CordicResult<FixedAngle> {
        if !degrees.is_finite() {
            return Err(CordicError::NonFiniteAngle(degrees));
        }
        Ok(self.from_turns(degrees.rem_euclid(360.0) / 360.0))
    }

    /// Encode radians with the same wrap and floor rules as degrees.
    pub fn from_radians(&self, radians: f64) -> CordicResult<FixedAngle> {
        if !radians.is_finite() {
            return Err(CordicError::NonFiniteAngle(radians));
        }
        Ok(self.from_turns(radians.rem_euclid(TAU) / TAU))
    }

    fn from_turns(&self, turns: f64) -> FixedAngle {
        let scaled = (turns * self.full_turn()).floor();
        // turns just below 1.0 can round up to a full turn
        if scaled >= self.full_turn() {
            return FixedAngle(0);
        }
        self.wrap(scaled as u64)
    }

    /// Decode to degrees in [0, 360).
    pub fn to_degrees(&self, a: FixedAngle) -> f64 {
        a.0 as f64 / self.full_turn() * 360.0
    }

    /// Decode to degrees in [-180, 180).
    pub fn to_signed_degrees(&self, a: FixedAngle) -> f64 {
        self.to_signed(a) as f64 / self.full_turn() * 360.0
    }

    /// Decode to radians in [-π, π).
    pub fn to_radians(&self, a: FixedAngle) -> f64 {
        self.to_signed(a) as f64 / self.full_turn() * TAU
    }
}

/// Encode a real angle in degrees as an `bits`-wide fraction of a turn.
pub fn degrees_to_fixed_angle(angle_degrees: f64, bits: u32) -> CordicResult<FixedAngle> {
    AngleFormat::new(bits)?.from_degrees(angle_degrees)
}

/// Encode a real angle in radians as an `bits`-wide fraction of a turn.
pub fn radians_to_fixed_angle(angle_radians: f64, bits: u32) -> CordicResult<FixedAngle> {
    AngleFormat::new(bits)?.from_radians(angle_radians)
}

/// Decode an angle to degrees in [0, 360). Diagnostics only.
///
/// Widths outside 1..=64 are clamped.
pub fn fixed_angle_to_degrees(angle: FixedAngle, bits: u32) -> f64 {
    let bits = bits.clamp(1, MAX_ANGLE_BITS);
    angle.raw() as f64 / 2f64.powi(bits as i32) * 360.0
}
