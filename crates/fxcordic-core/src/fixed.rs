//! Signed fixed-point data words
//!
//! A [`FixedScalar`] is a D-bit two's-complement integer held in an `i64`.
//! Every operation goes through a [`ScalarFormat`], which reduces the result
//! modulo 2^D: overflow wraps, it never saturates or panics.
//!
//! The iteration core works on a widened format with guard bits above the
//! data word; only terminal outputs are narrowed back to D bits.

use serde::{Deserialize, Serialize};

use crate::config::MAX_DATA_BITS;
use crate::error::{CordicError, CordicResult};

/// D-bit two's-complement value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedScalar(pub(crate) i64);

impl FixedScalar {
    pub const ZERO: FixedScalar = FixedScalar(0);

    /// Underlying integer value.
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for FixedScalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arithmetic context for D-bit data words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarFormat {
    bits: u32,
}

impl ScalarFormat {
    /// Create a format for `bits`-wide words (1..=32).
    pub fn new(bits: u32) -> CordicResult<Self> {
        if bits == 0 || bits > MAX_DATA_BITS {
            return Err(CordicError::InvalidWidth {
                field: "data_bits",
                value: bits,
                min: 1,
                max: MAX_DATA_BITS,
            });
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Same word with `guard` extra high bits. Only used internally, so it
    /// may exceed the configurable data width limit.
    pub(crate) fn widened(&self, guard: u32) -> ScalarFormat {
        ScalarFormat {
            bits: (self.bits + guard).min(63),
        }
    }

    /// Most negative representable value, -2^(D-1).
    pub fn min_value(&self) -> i64 {
        -(1i64 << (self.bits - 1))
    }

    /// Most positive representable value, 2^(D-1) - 1.
    pub fn max_value(&self) -> i64 {
        (1i64 << (self.bits - 1)) - 1
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min_value()..=self.max_value()).contains(&value)
    }

    /// Reduce `value` modulo 2^D into the signed range.
    #[inline]
    pub fn wrap(&self, value: i64) -> FixedScalar {
        let unused = 64 - self.bits;
        FixedScalar((value << unused) >> unused)
    }

    #[inline]
    pub fn add(&self, a: FixedScalar, b: FixedScalar) -> FixedScalar {
        self.wrap(a.0.wrapping_add(b.0))
    }

    #[inline]
    pub fn sub(&self, a: FixedScalar, b: FixedScalar) -> FixedScalar {
        self.wrap(a.0.wrapping_sub(b.0))
    }

    /// Negation; -2^(D-1) wraps onto itself.
    #[inline]
    pub fn neg(&self, a: FixedScalar) -> FixedScalar {
        self.wrap(a.0.wrapping_neg())
    }

    /// Arithmetic (sign-extending) right shift.
    #[inline]
    pub fn shr(&self, a: FixedScalar, shift: u32) -> FixedScalar {
        FixedScalar(a.0 >> shift.min(63))
    }

    /// `(a * b) >> shift` with the product held in 128 bits, truncated back to D bits.
    ///
    /// Operands need not lie in this format; a value from a wider format (or
    /// a deserialized one) still reduces modulo 2^D.
    #[inline]
    pub fn mul_shr(&self, a: FixedScalar, b: FixedScalar, shift: u32) -> FixedScalar {
        let wide = a.0 as i128 * b.0 as i128;
        // Truncating to 64 bits keeps the residue modulo 2^D
        self.wrap((wide >> shift.min(127)) as i64)
    }
}
