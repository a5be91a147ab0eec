//! Validation reports
//!
//! One [`TrialRecord`] per checked output quantity, grouped into a
//! [`ValidationReport`] per harness test and a [`ValidationSummary`] per run.

use std::collections::BTreeSet;

use fxcordic_core::{CordicConfig, Degeneracy};
use serde::Serialize;

use crate::compare::Comparison;
use crate::error::{HarnessError, HarnessResult};

/// Output quantity checked by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    X,
    Y,
    Magnitude,
    Phase,
    /// Cascade stage-2 angle
    Theta,
    /// Cascade running magnitude
    Feedback,
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::X => write!(f, "x"),
            Quantity::Y => write!(f, "y"),
            Quantity::Magnitude => write!(f, "magnitude"),
            Quantity::Phase => write!(f, "phase"),
            Quantity::Theta => write!(f, "theta"),
            Quantity::Feedback => write!(f, "feedback"),
        }
    }
}

/// One compared output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    /// Trial index within the test
    pub trial: usize,
    /// Stimulus: (magnitude, degrees) for rotation, (x, y) otherwise
    pub input: [f64; 2],
    pub quantity: Quantity,
    /// Scalars in LSBs, angles in degrees
    pub actual: f64,
    pub expected: f64,
    pub comparison: Comparison,
    pub passed: bool,
    pub degeneracy: Option<Degeneracy>,
}

/// Results of one harness test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub test: String,
    pub tolerance_percent: f64,
    pub trials: usize,
    pub records: Vec<TrialRecord>,
}

impl ValidationReport {
    pub fn new(test: impl Into<String>, tolerance_percent: f64, trials: usize, records: Vec<TrialRecord>) -> Self {
        Self {
            test: test.into(),
            tolerance_percent,
            trials,
            records,
        }
    }

    pub fn violations(&self) -> impl Iterator<Item = &TrialRecord> {
        self.records.iter().filter(|r| !r.passed)
    }

    /// Number of trials with at least one failing record.
    pub fn failed_trials(&self) -> usize {
        self.violations().map(|r| r.trial).collect::<BTreeSet<_>>().len()
    }

    /// Records that fell back to the zero-expected check.
    pub fn degenerate(&self) -> impl Iterator<Item = &TrialRecord> {
        self.records.iter().filter(|r| r.degeneracy.is_some())
    }

    /// Largest `|error|` over all records.
    pub fn worst_error(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.comparison.error().abs())
            .fold(0.0, f64::max)
    }

    pub fn passed(&self) -> bool {
        self.records.iter().all(|r| r.passed)
    }

    pub fn into_result(self) -> HarnessResult<Self> {
        if self.passed() {
            return Ok(self);
        }
        Err(HarnessError::ToleranceViolation {
            violations: self.failed_trials(),
            trials: self.trials,
            worst_error: self.worst_error(),
            tolerance: self.tolerance_percent,
            test: self.test,
        })
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<18} {}  trials={:<4} worst={:.4}%  tolerance={}%  degenerate={}",
            self.test,
            if self.passed() { "PASS" } else { "FAIL" },
            self.trials,
            self.worst_error(),
            self.tolerance_percent,
            self.degenerate().count()
        )?;
        for r in self.violations() {
            writeln!(
                f,
                "  trial {:>3} {:<9} input=({:.2}, {:.2}) actual={:.4} expected={:.4} error={:.3}%",
                r.trial,
                r.quantity,
                r.input[0],
                r.input[1],
                r.actual,
                r.expected,
                r.comparison.error()
            )?;
        }
        Ok(())
    }
}

/// All reports of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub engine: CordicConfig,
    pub gain_constant: String,
    pub reports: Vec<ValidationReport>,
}

impl ValidationSummary {
    pub fn passed(&self) -> bool {
        self.reports.iter().all(ValidationReport::passed)
    }

    pub fn failed_trials(&self) -> usize {
        self.reports.iter().map(ValidationReport::failed_trials).sum()
    }

    pub fn report(&self, test: &str) -> Option<&ValidationReport> {
        self.reports.iter().find(|r| r.test == test)
    }

    pub fn to_json(&self) -> HarnessResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| HarnessError::Report(e.to_string()))
    }

    /// First failing report as an error.
    pub fn into_result(self) -> HarnessResult<Self> {
        if let Some(failed) = self.reports.iter().find(|r| !r.passed()) {
            return Err(failed.clone().into_result().err().unwrap_or_else(|| {
                HarnessError::Report(format!("{} failed without violations", failed.test))
            }));
        }
        Ok(self)
    }
}

impl std::fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "fxcordic validation: A={} D={} N={} ({})",
            self.engine.angle_bits,
            self.engine.data_bits,
            self.engine.effective_iterations(),
            self.gain_constant
        )?;
        for report in &self.reports {
            write!(f, "{}", report)?;
        }
        write!(
            f,
            "{}",
            if self.passed() {
                "all tests passed".to_string()
            } else {
                format!("{} failing trials", self.failed_trials())
            }
        )
    }
}
