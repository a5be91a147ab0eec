//! QR-style two-stage vectoring cascade
//!
//! Each sample runs through two vectoring engines:
//!
//! ```text
//!  (I, Q) ──► vectoring #1 ──► (mag1, φ)
//!                                │
//!  (λ·feedback, mag1) ──► vectoring #2 ──► (mag2, θ)
//!                                            │
//!                       feedback ◄───────────┘
//! ```
//!
//! The second stage computes `sqrt(feedback² + mag1²)` with the same engine,
//! so no separate square-root unit is needed. With a forgetting factor
//! `λ < 1` the feedback becomes an exponentially weighted running magnitude,
//! as used by streaming QR/RLS updates.
//!
//! The carried feedback is the only cross-call state in the crate. It lives in
//! an explicit [`CascadeState`] owned by one [`QrCascade`]; independent streams
//! need independent cascades.

use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::angle::FixedAngle;
use crate::driver::{CordicEngine, VectoringDriver};
use crate::error::{CordicError, CordicResult};
use crate::fixed::{FixedScalar, ScalarFormat};

/// Forgetting factor λ in (0, 1), encoded as `floor(λ·2^(D-1))` with D-1 fraction bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForgettingFactor {
    value: FixedScalar,
    frac_bits: u32,
}

impl ForgettingFactor {
    pub fn new(lambda: f64, format: &ScalarFormat) -> CordicResult<Self> {
        if !(lambda > 0.0 && lambda < 1.0) {
            return Err(CordicError::InvalidForgettingFactor(lambda));
        }
        let frac_bits = format.bits() - 1;
        let code = (lambda * (1i64 << frac_bits) as f64).floor() as i64;
        Ok(Self {
            value: format.wrap(code),
            frac_bits,
        })
    }

    /// Encoded factor.
    pub fn value(&self) -> FixedScalar {
        self.value
    }

    pub fn frac_bits(&self) -> u32 {
        self.frac_bits
    }

    /// Real value actually applied after quantization.
    pub fn as_f64(&self) -> f64 {
        self.value.raw() as f64 / (1i64 << self.frac_bits) as f64
    }

    /// `(magnitude · λ) >> frac_bits`.
    #[inline]
    pub fn apply(&self, format: &ScalarFormat, magnitude: FixedScalar) -> FixedScalar {
        format.mul_shr(magnitude, self.value, self.frac_bits)
    }
}

/// State carried between cascade samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CascadeState {
    /// Running magnitude fed back into stage 2
    pub mag_feedback: FixedScalar,
    /// Samples processed since the last reset
    pub samples: u64,
}

/// Result of one cascade sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOutput {
    /// Phase of the input sample, `atan2(Q, I)`
    pub phi: FixedAngle,
    /// Stage-2 rotation angle, `atan2(mag1, λ·feedback)`
    pub theta: FixedAngle,
    /// Stage-1 magnitude `sqrt(I² + Q²)`
    pub stage1_magnitude: FixedScalar,
    /// Updated running magnitude
    pub feedback_magnitude: FixedScalar,
}

impl CascadeOutput {
    pub fn angles(&self) -> (FixedAngle, FixedAngle) {
        (self.phi, self.theta)
    }
}

/// Two chained vectoring drivers with a carried feedback magnitude.
#[derive(Debug, Clone)]
pub struct QrCascade {
    vectoring: VectoringDriver,
    forgetting: Option<ForgettingFactor>,
    state: CascadeState,
}

impl QrCascade {
    /// One-shot decomposition: feedback accumulates without decay.
    pub fn new(engine: &CordicEngine) -> Self {
        Self {
            vectoring: engine.vectoring(),
            forgetting: None,
            state: CascadeState::default(),
        }
    }

    /// Streaming estimation with forgetting factor `lambda`.
    pub fn with_forgetting_factor(engine: &CordicEngine, lambda: f64) -> CordicResult<Self> {
        let factor = ForgettingFactor::new(lambda, &engine.scalar_format())?;
        tracing::debug!(
            lambda,
            encoded = factor.value().raw(),
            frac_bits = factor.frac_bits(),
            "cascade forgetting factor 0x{:X}",
            factor.value().raw()
        );
        Ok(Self {
            vectoring: engine.vectoring(),
            forgetting: Some(factor),
            state: CascadeState::default(),
        })
    }

    /// Resume from a previously captured state. The feedback magnitude is
    /// wrapped to the engine's data width, so a state from another engine or
    /// an external checkpoint cannot carry an out-of-range word.
    pub fn with_state(mut self, state: CascadeState) -> Self {
        let format = self.vectoring.scalar_format();
        self.state = CascadeState {
            mag_feedback: format.wrap(state.mag_feedback.raw()),
            ..state
        };
        self
    }

    pub fn forgetting_factor(&self) -> Option<ForgettingFactor> {
        self.forgetting
    }

    pub fn state(&self) -> CascadeState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = CascadeState::default();
    }

    /// Process one `(I, Q)` sample.
    pub fn feed(&mut self, i: FixedScalar, q: FixedScalar) -> CascadeOutput {
        let format = self.vectoring.scalar_format();

        let stage1 = self.vectoring.run(i, q);

        let feedback = match self.forgetting {
            Some(factor) => factor.apply(&format, self.state.mag_feedback),
            None => self.state.mag_feedback,
        };
        let stage2 = self.vectoring.run(feedback, stage1.magnitude);

        self.state.mag_feedback = stage2.magnitude;
        self.state.samples = self.state.samples.saturating_add(1);

        CascadeOutput {
            phi: stage1.phase,
            theta: stage2.phase,
            stage1_magnitude: stage1.magnitude,
            feedback_magnitude: stage2.magnitude,
        }
    }

    /// Process one complex sample; components are wrapped to the data width.
    pub fn feed_iq(&mut self, sample: Complex<i64>) -> CascadeOutput {
        let format = self.vectoring.scalar_format();
        self.feed(format.wrap(sample.re), format.wrap(sample.im))
    }

    pub fn feed_block(&mut self, samples: &[Complex<i64>]) -> Vec<CascadeOutput> {
        samples.iter().map(|&s| self.feed_iq(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CordicConfig;

    fn engine() -> CordicEngine {
        CordicEngine::new(CordicConfig::new(32, 16)).unwrap()
    }

    #[test]
    fn test_forgetting_factor_encoding() {
        let fmt = ScalarFormat::new(16).unwrap();
        let factor = ForgettingFactor::new(0.99, &fmt).unwrap();
        assert_eq!(factor.value().raw(), 0x7EB8);
        assert_eq!(factor.frac_bits(), 15);
        assert!((factor.as_f64() - 0.99).abs() < 1e-4);
        assert_eq!(factor.apply(&fmt, fmt.wrap(10_000)).raw(), 9899);
    }

    #[test]
    fn test_forgetting_factor_rejects_out_of_range() {
        let fmt = ScalarFormat::new(16).unwrap();
        for lambda in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                ForgettingFactor::new(lambda, &fmt),
                Err(CordicError::InvalidForgettingFactor(_))
            ));
        }
    }

    #[test]
    fn test_first_sample() {
        let engine = engine();
        let s = engine.scalar_format();
        let a = engine.angle_format();
        let mut cascade = QrCascade::new(&engine);

        let out = cascade.feed(s.wrap(4000), s.wrap(-2000));
        assert!((out.stage1_magnitude.raw() - 4472).abs() <= 6, "mag1 = {}", out.stage1_magnitude);
        assert!((a.to_signed_degrees(out.phi) + 26.565).abs() < 0.1);
        // No feedback yet: stage 2 sees (0, mag1)
        assert!((a.to_degrees(out.theta) - 90.0).abs() < 0.1);
        assert!((out.feedback_magnitude.raw() - out.stage1_magnitude.raw()).abs() <= 6);
        assert_eq!(cascade.state().samples, 1);
    }

    #[test]
    fn test_feedback_accumulates() {
        let engine = engine();
        let s = engine.scalar_format();
        let a = engine.angle_format();
        let mut cascade = QrCascade::new(&engine);

        cascade.feed(s.wrap(4000), s.wrap(-2000));
        let out = cascade.feed(s.wrap(4000), s.wrap(-2000));
        // Equal feedback and input magnitudes: 45° and sqrt(2) growth
        assert!((a.to_degrees(out.theta) - 45.0).abs() < 0.2);
        assert!((out.feedback_magnitude.raw() as f64 - 4472.0 * 2f64.sqrt()).abs() < 15.0);
        let (phi, theta) = out.angles();
        assert_eq!(phi, out.phi);
        assert_eq!(theta, out.theta);
    }

    #[test]
    fn test_forgetting_factor_bounds_feedback() {
        let engine = engine();
        let mut cascade = QrCascade::with_forgetting_factor(&engine, 0.9).unwrap();
        let samples = vec![Complex::new(1500, 800); 200];
        let outputs = cascade.feed_block(&samples);

        // Steady state of m = sqrt((λm)² + a²) is a / sqrt(1 - λ²)
        let a = (1500f64.powi(2) + 800f64.powi(2)).sqrt();
        let steady = a / (1.0 - 0.9f64.powi(2)).sqrt();
        let last = outputs.last().unwrap().feedback_magnitude.raw() as f64;
        assert!((last - steady).abs() / steady < 0.03, "last = {}, steady = {}", last, steady);
    }

    #[test]
    fn test_reset_and_restore() {
        let engine = engine();
        let s = engine.scalar_format();
        let mut cascade = QrCascade::new(&engine);
        cascade.feed(s.wrap(1000), s.wrap(1000));
        let saved = cascade.state();
        assert_eq!(saved.samples, 1);

        cascade.reset();
        assert_eq!(cascade.state(), CascadeState::default());

        let mut restored = QrCascade::new(&engine).with_state(saved);
        let a = restored.feed(s.wrap(500), s.wrap(0));
        let mut again = QrCascade::new(&engine).with_state(saved);
        let b = again.feed(s.wrap(500), s.wrap(0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_independent_streams() {
        let engine = engine();
        let s = engine.scalar_format();
        let mut first = QrCascade::new(&engine);
        let mut second = QrCascade::new(&engine);
        first.feed(s.wrap(3000), s.wrap(3000));
        first.feed(s.wrap(3000), s.wrap(3000));
        assert_eq!(second.state().samples, 0);
        let out = second.feed(s.wrap(3000), s.wrap(3000));
        assert!((engine.angle_format().to_degrees(out.theta) - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_restore_out_of_range_state() {
        let engine = engine();
        let s = engine.scalar_format();
        let state: CascadeState = serde_yaml::from_str("mag_feedback: 4611686018427387904\nsamples: 3\n").unwrap();

        let mut cascade = QrCascade::with_forgetting_factor(&engine, 0.99).unwrap().with_state(state);
        // 2^62 reduces to 0 modulo 2^16
        assert_eq!(cascade.state().mag_feedback, FixedScalar::ZERO);
        assert_eq!(cascade.state().samples, 3);

        let out = cascade.feed(s.wrap(100), s.wrap(100));
        let mut fresh = QrCascade::with_forgetting_factor(&engine, 0.99).unwrap();
        assert_eq!(out, fresh.feed(s.wrap(100), s.wrap(100)));
        assert!(s.contains(cascade.state().mag_feedback.raw()));
    }

    #[test]
    fn test_sample_count_saturates() {
        let engine = engine();
        let s = engine.scalar_format();
        let state = CascadeState {
            mag_feedback: FixedScalar::ZERO,
            samples: u64::MAX,
        };
        let mut cascade = QrCascade::new(&engine).with_state(state);
        cascade.feed(s.wrap(1000), s.wrap(0));
        assert_eq!(cascade.state().samples, u64::MAX);
    }

    #[test]
    fn test_state_serde() {
        let state = CascadeState {
            mag_feedback: ScalarFormat::new(16).unwrap().wrap(1234),
            samples: 7,
        };
        let yaml = serde_yaml::to_string(&state).unwrap();
        let parsed: CascadeState = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, state);
    }
}
