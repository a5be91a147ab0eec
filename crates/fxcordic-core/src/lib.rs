//! # Fixed-Point CORDIC Engine
//!
//! Shift-add trigonometry for fixed-point signal paths: no multipliers in the
//! iteration loop, bit-exact and deterministic.
//!
//! - **Angle codec**: degrees/radians ↔ unsigned fractions of a turn ([`angle`])
//! - **Micro-step table**: `atan(2^-i)` per iteration ([`table`])
//! - **Iteration core**: rotation and vectoring recurrences ([`iteration`])
//! - **Gain compensation**: cancels `∏ sqrt(1 + 2^-2i)` ([`gain`])
//! - **Mode drivers**: polar ↔ rectangular ([`driver`])
//! - **Cascade**: two chained vectoring stages for QR-style updates ([`cascade`])
//!
//! ## Signal Flow
//!
//! ```text
//! Rotation:  (mag, angle) → seed → N micro-rotations → gain → (x, y)
//! Vectoring: (x, y)       → seed → N micro-rotations → gain → (mag, phase)
//! ```
//!
//! Data words are D-bit two's complement and wrap on overflow; angles are
//! A-bit fractions of a turn and wrap modulo 2^A.
//!
//! ## Example
//!
//! ```rust
//! use fxcordic_core::{CordicConfig, CordicEngine, QrCascade};
//!
//! let engine = CordicEngine::new(CordicConfig::new(32, 16)).unwrap();
//! let s = engine.scalar_format();
//! let a = engine.angle_format();
//!
//! let rect = engine.rotation().run(s.wrap(5000), a.from_degrees(60.0).unwrap());
//! assert!((rect.x.raw() - 2500).abs() < 75);
//! assert!((rect.y.raw() - 4330).abs() < 130);
//!
//! let mut cascade = QrCascade::new(&engine);
//! let out = cascade.feed(s.wrap(4000), s.wrap(-2000));
//! assert!((a.to_signed_degrees(out.phi) + 26.57).abs() < 0.1);
//! ```

pub mod angle;
pub mod cascade;
pub mod config;
pub mod driver;
pub mod error;
pub mod fixed;
pub mod gain;
pub mod iteration;
pub mod table;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use angle::{degrees_to_fixed_angle, fixed_angle_to_degrees, radians_to_fixed_angle, AngleFormat, FixedAngle};
pub use cascade::{CascadeOutput, CascadeState, ForgettingFactor, QrCascade};
pub use config::CordicConfig;
pub use driver::{CordicEngine, PolarSample, RectSample, RotationDriver, VectoringDriver};
pub use error::{CordicError, CordicResult, Degeneracy};
pub use fixed::{FixedScalar, ScalarFormat};
pub use gain::{processing_gain, GainConstant};
pub use iteration::{IterationCore, IterationState, Mode, Vector2, GUARD_BITS};
pub use table::MicroStepTable;
