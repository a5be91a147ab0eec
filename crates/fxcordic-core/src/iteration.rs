//! CORDIC iteration core
//!
//! The shared shift-add recurrence. One run is a closed sequence of exactly
//! N dependent transitions over an [`IterationState`]; the drivers seed the
//! state, call [`IterationCore::run`] and read the terminal state.
//!
//! ## Rotation mode
//!
//! Direction follows the sign of the residual angle (`d = +1` when the
//! residual, read as signed, is `>= 0`):
//!
//! ```text
//! x' = x - d·(y >> i)
//! y' = y + d·(x >> i)
//! z' = z - d·atan(2^-i)
//! ```
//!
//! ## Vectoring mode
//!
//! Direction follows the sign of `y` (`σ = +1` when `y >= 0`) and the vector
//! is rotated by `-σ·atan(2^-i)`, driving `y` toward zero:
//!
//! ```text
//! x' = x + σ·(y >> i)
//! y' = y - σ·(x >> i)
//! z' = z + σ·atan(2^-i)
//! ```
//!
//! The bare iterations only converge within ±99.88°, so seeding applies a
//! half-turn pre-rotation first (negate the vector, offset the angle by 180°)
//! whenever the target lies outside ±90°.
//!
//! ## Guard bits
//!
//! The vector grows by up to G ≈ 1.65 over a run, and a full-scale input pair
//! has magnitude up to √2·2^(D-1). The recurrence therefore runs on
//! D + [`GUARD_BITS`] bits, which holds every intermediate value of any D-bit
//! input without wrapping. Terminal states keep the guard bits; the drivers
//! narrow them to D bits.

use std::sync::Arc;

use crate::angle::{AngleFormat, FixedAngle};
use crate::fixed::{FixedScalar, ScalarFormat};
use crate::table::MicroStepTable;

/// Operating mode of the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Drive the residual angle to zero: polar → rectangular
    Rotation,
    /// Drive `y` to zero: rectangular → polar
    Vectoring,
}

/// Extra high bits carried by the iteration datapath.
pub const GUARD_BITS: u32 = 2;

/// A pair of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vector2 {
    pub x: FixedScalar,
    pub y: FixedScalar,
}

impl Vector2 {
    pub fn new(x: FixedScalar, y: FixedScalar) -> Self {
        Self { x, y }
    }
}

/// Working state of one CORDIC run.
///
/// `angle` is the residual angle in rotation mode and the accumulated phase
/// in vectoring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationState {
    pub vector: Vector2,
    pub angle: FixedAngle,
    pub step: usize,
}

/// Shift-add recurrence bound to one micro-step table and data format.
#[derive(Debug, Clone)]
pub struct IterationCore {
    table: Arc<MicroStepTable>,
    scalar: ScalarFormat,
    working: ScalarFormat,
    angle: AngleFormat,
}

impl IterationCore {
    pub fn new(table: Arc<MicroStepTable>, scalar: ScalarFormat) -> Self {
        let angle = table.format();
        Self {
            table,
            scalar,
            working: scalar.widened(GUARD_BITS),
            angle,
        }
    }

    /// Number of transitions per run.
    pub fn iterations(&self) -> usize {
        self.table.len()
    }

    /// Format of inputs and driver outputs.
    pub fn scalar_format(&self) -> ScalarFormat {
        self.scalar
    }

    /// Format of the iteration state, D + [`GUARD_BITS`] wide.
    pub fn working_format(&self) -> ScalarFormat {
        self.working
    }

    pub fn angle_format(&self) -> AngleFormat {
        self.angle
    }

    pub fn table(&self) -> &MicroStepTable {
        &self.table
    }

    /// Rotation seed: `(x, y)` rotated by `target`, pre-rotated by a half
    /// turn when `target` is more than a quarter turn away from zero.
    pub fn seed_rotation(&self, vector: Vector2, target: FixedAngle) -> IterationState {
        if self.angle.within_quarter(target) {
            IterationState {
                vector,
                angle: target,
                step: 0,
            }
        } else {
            IterationState {
                vector: self.flip(vector),
                angle: self.angle.sub(target, self.angle.half_turn()),
                step: 0,
            }
        }
    }

    /// Vectoring seed: left half-plane inputs are flipped into the right one
    /// with the accumulator starting at a half turn.
    pub fn seed_vectoring(&self, vector: Vector2) -> IterationState {
        if vector.x.is_negative() {
            IterationState {
                vector: self.flip(vector),
                angle: self.angle.half_turn(),
                step: 0,
            }
        } else {
            IterationState {
                vector,
                angle: FixedAngle::ZERO,
                step: 0,
            }
        }
    }

    fn flip(&self, vector: Vector2) -> Vector2 {
        Vector2::new(self.working.neg(vector.x), self.working.neg(vector.y))
    }

    /// One transition. Returns `false` once all N steps have been taken.
    pub fn step(&self, mode: Mode, state: &mut IterationState) -> bool {
        let i = state.step;
        if i >= self.table.len() {
            return false;
        }

        let s = &self.working;
        let Vector2 { x, y } = state.vector;
        let dx = s.shr(y, i as u32);
        let dy = s.shr(x, i as u32);
        let micro = self.table.step(i);

        // Zero counts as positive in both modes
        let positive = match mode {
            Mode::Rotation => !self.angle.is_negative(state.angle),
            Mode::Vectoring => !y.is_negative(),
        };

        // Counter-clockwise turns subtract the micro-step, clockwise turns add it
        let counter_clockwise = match mode {
            Mode::Rotation => positive,
            Mode::Vectoring => !positive,
        };
        let (x, y, angle) = if counter_clockwise {
            (s.sub(x, dx), s.add(y, dy), self.angle.sub(state.angle, micro))
        } else {
            (s.add(x, dx), s.sub(y, dy), self.angle.add(state.angle, micro))
        };

        state.vector = Vector2::new(x, y);
        state.angle = angle;
        state.step = i + 1;
        true
    }

    /// Run all N transitions from `state`. The terminal vector is in the
    /// working format.
    pub fn run(&self, mode: Mode, mut state: IterationState) -> IterationState {
        while self.step(mode, &mut state) {}
        state
    }
}
