//! Arctangent micro-step table
//!
//! `table[i] = atan(2^-i)` expressed as a [`FixedAngle`], one entry per
//! iteration. Built once per engine and shared read-only by every driver.

use std::f64::consts::TAU;

use crate::angle::{AngleFormat, FixedAngle};

/// Precomputed `atan(2^-i)` micro-steps in the engine's angle format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicroStepTable {
    format: AngleFormat,
    steps: Vec<FixedAngle>,
}

impl MicroStepTable {
    /// Build `iterations` entries, each rounded to the nearest angle LSB.
    pub fn new(format: AngleFormat, iterations: usize) -> Self {
        let full_turn = format.full_turn();
        let steps = (0..iterations)
            .map(|i| {
                let turns = 0.5f64.powi(i as i32).atan() / TAU;
                let code = (turns * full_turn).round();
                // Largest entry is an eighth of a turn, always below 2^A
                format.wrap(code as u64)
            })
            .collect();
        Self { format, steps }
    }

    pub fn format(&self) -> AngleFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Micro-step for iteration `i`.
    #[inline]
    pub fn step(&self, i: usize) -> FixedAngle {
        self.steps[i]
    }

    pub fn as_slice(&self) -> &[FixedAngle] {
        &self.steps
    }

    /// Largest angle the bare iterations can reach: the sum of all micro-steps.
    pub fn convergence_range(&self) -> FixedAngle {
        self.steps
            .iter()
            .fold(FixedAngle::ZERO, |acc, &step| self.format.add(acc, step))
    }

    /// Index of the first entry that has rounded to zero, if any.
    pub fn resolution_limit(&self) -> Option<usize> {
        self.steps.iter().position(|step| step.raw() == 0)
    }
}
