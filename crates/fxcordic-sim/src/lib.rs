//! # fxcordic Validation
//!
//! Checks the fixed-point engine in `fxcordic_core` against a real-valued
//! reference:
//!
//! - [`oracle`]: floating-point model of the drivers and the cascade
//! - [`compare`]: percentage-error comparator with zero-expected fallback
//! - [`stimulus`]: seeded sweeps and random inputs
//! - [`harness`]: the validation tests themselves
//! - [`report`]: per-trial records and run summaries
//! - [`config`] / [`logging`]: YAML run configuration and tracing setup
//!
//! ## Example
//!
//! ```rust
//! use fxcordic_sim::{StimulusRange, ValidationConfig, ValidationHarness};
//!
//! let mut config = ValidationConfig::default();
//! config.harness.stimulus_range = StimulusRange::Headroom;
//! let harness = ValidationHarness::from_config(&config).unwrap();
//! assert!(harness.run_all().unwrap().passed());
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod harness;
pub mod logging;
pub mod oracle;
pub mod report;
pub mod stimulus;

pub use compare::{compare_phase, compare_scalar, Comparison};
pub use config::{ConfigError, HarnessConfig, ValidationConfig};
pub use error::{HarnessError, HarnessResult};
pub use harness::ValidationHarness;
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use oracle::{reference_wrap, GainModel, ReferenceCascade, ReferenceOracle, WrapModel};
pub use report::{Quantity, TrialRecord, ValidationReport, ValidationSummary};
pub use stimulus::{angle_sweep, RotationStimulus, StimulusGenerator, StimulusRange, VectoringStimulus};
