//! # Validation Run Configuration
//!
//! YAML configuration for `fxcordic-validate` and [`ValidationHarness`](crate::ValidationHarness):
//!
//! - Engine shape (angle/data widths, iteration count)
//! - Harness parameters (tolerance, trial counts, seed, oracle models)
//! - Logging
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `FXCORDIC_CONFIG` environment variable
//! 2. `./fxcordic.yaml` (current directory)
//! 3. `~/.config/fxcordic/config.yaml` (user config)
//! 4. `/etc/fxcordic/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! engine:
//!   angle_bits: 32
//!   data_bits: 16
//!
//! harness:
//!   tolerance_percent: 3.0
//!   sweep_points: 30
//!   random_trials: 20
//!   forgetting_factor: 0.99
//!   stimulus_range: full
//!   gain_model: raw
//!   wrap_model: reference
//!
//! logging:
//!   level: info
//!   format: compact
//! ```

use std::path::{Path, PathBuf};

use fxcordic_core::CordicConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogConfig;
use crate::oracle::{GainModel, WrapModel};
use crate::stimulus::{StimulusRange, MAX_PHASE_GUARD_DEGREES};

/// Error type for configuration operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadError(String),
    #[error("failed to parse config: {0}")]
    ParseError(String),
    #[error("invalid config: {0}")]
    ValidationError(String),
}

/// Harness parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Pass criterion: `|error| < tolerance_percent`
    pub tolerance_percent: f64,
    /// Points of the inclusive 0..=360° rotation sweep
    pub sweep_points: usize,
    /// Randomized vectoring trials
    pub random_trials: usize,
    /// Samples streamed through the cascade
    pub cascade_samples: usize,
    /// Cascade forgetting factor (None = one-shot accumulation)
    pub forgetting_factor: Option<f64>,
    /// Stimulus seed
    pub seed: u64,
    /// Random phases are drawn from `[phase_guard_degrees, 360)`
    pub phase_guard_degrees: f64,
    /// Range of random magnitudes and vectoring inputs
    pub stimulus_range: StimulusRange,
    pub gain_model: GainModel,
    pub wrap_model: WrapModel,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: 3.0,
            sweep_points: 30,
            random_trials: 20,
            cascade_samples: 32,
            forgetting_factor: Some(0.99),
            seed: 42,
            phase_guard_degrees: 5.0,
            stimulus_range: StimulusRange::Full,
            gain_model: GainModel::Compensated,
            wrap_model: WrapModel::TwosComplement,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance_percent.is_finite() && self.tolerance_percent > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "tolerance_percent must be positive, got {}",
                self.tolerance_percent
            )));
        }

        if self.sweep_points == 0 {
            return Err(ConfigError::ValidationError(
                "sweep_points must be > 0".to_string(),
            ));
        }

        if let Some(lambda) = self.forgetting_factor {
            if !(lambda > 0.0 && lambda < 1.0) {
                return Err(ConfigError::ValidationError(format!(
                    "forgetting_factor must lie in (0, 1), got {}",
                    lambda
                )));
            }
        }

        if !(0.0..=MAX_PHASE_GUARD_DEGREES).contains(&self.phase_guard_degrees) {
            return Err(ConfigError::ValidationError(format!(
                "phase_guard_degrees must lie in [0, {}], got {}",
                MAX_PHASE_GUARD_DEGREES, self.phase_guard_degrees
            )));
        }

        Ok(())
    }
}

/// Complete configuration of a validation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub engine: CordicConfig,
    pub harness: HarnessConfig,
    pub logging: LogConfig,
}

impl ValidationConfig {
    /// Load configuration from the default search path.
    ///
    /// Returns the default config if no file is found.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("FXCORDIC_CONFIG") {
            if Path::new(&path).exists() {
                return Self::load_from(Path::new(&path));
            }
        }

        for path in &Self::config_search_paths() {
            if path.exists() {
                return Self::load_from(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Get configuration search paths.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./fxcordic.yaml")];

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "fxcordic") {
            paths.push(config_dir.config_dir().join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/fxcordic/config.yaml"));

        paths
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.harness.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogFormat, LogLevel};

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert_eq!(config.engine.data_bits, 16);
        assert_eq!(config.harness.tolerance_percent, 3.0);
        assert_eq!(config.harness.sweep_points, 30);
        assert_eq!(config.harness.random_trials, 20);
        assert_eq!(config.harness.forgetting_factor, Some(0.99));
        assert_eq!(config.harness.gain_model, GainModel::Compensated);
        assert_eq!(config.harness.stimulus_range, StimulusRange::Full);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
engine:
  angle_bits: 24
  data_bits: 12

harness:
  tolerance_percent: 5.0
  random_trials: 100
  forgetting_factor: null
  stimulus_range: headroom
  gain_model: raw
  wrap_model: reference

logging:
  level: debug
  format: json
"#;
        let config = ValidationConfig::parse(yaml).unwrap();
        assert_eq!(config.engine.angle_bits, 24);
        assert_eq!(config.engine.effective_iterations(), 12);
        assert_eq!(config.harness.tolerance_percent, 5.0);
        assert_eq!(config.harness.random_trials, 100);
        // Unset fields keep their defaults
        assert_eq!(config.harness.sweep_points, 30);
        assert_eq!(config.harness.forgetting_factor, None);
        assert_eq!(config.harness.gain_model, GainModel::Raw);
        assert_eq!(config.harness.wrap_model, WrapModel::Reference);
        assert_eq!(config.harness.stimulus_range, StimulusRange::Headroom);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validation_failures() {
        let bad_engine = "engine:\n  data_bits: 0\n";
        assert!(matches!(
            ValidationConfig::parse(bad_engine),
            Err(ConfigError::ValidationError(_))
        ));

        let bad_lambda = "harness:\n  forgetting_factor: 1.0\n";
        assert!(matches!(
            ValidationConfig::parse(bad_lambda),
            Err(ConfigError::ValidationError(_))
        ));

        let bad_tolerance = "harness:\n  tolerance_percent: -1.0\n";
        assert!(ValidationConfig::parse(bad_tolerance).is_err());

        let bad_guard = "harness:\n  phase_guard_degrees: 360.0\n";
        assert!(ValidationConfig::parse(bad_guard).is_err());
        // Accepted guards are exactly those the generator honours unclamped
        let past_clamp = "harness:\n  phase_guard_degrees: 359.5\n";
        assert!(ValidationConfig::parse(past_clamp).is_err());
        let at_clamp = "harness:\n  phase_guard_degrees: 359.0\n";
        assert!(ValidationConfig::parse(at_clamp).is_ok());

        let bad_range = "harness:\n  stimulus_range: half\n";
        assert!(matches!(
            ValidationConfig::parse(bad_range),
            Err(ConfigError::ParseError(_))
        ));

        assert!(matches!(
            ValidationConfig::parse("harness: [1, 2"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = ValidationConfig::default();
        config.harness.seed = 7;
        config.harness.wrap_model = WrapModel::Reference;
        let yaml = config.to_yaml().unwrap();
        assert_eq!(ValidationConfig::parse(&yaml).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fxcordic.yaml");
        std::fs::write(&path, "harness:\n  seed: 1234\n").unwrap();
        let config = ValidationConfig::load_from(&path).unwrap();
        assert_eq!(config.harness.seed, 1234);

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            ValidationConfig::load_from(&missing),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn test_search_paths() {
        let paths = ValidationConfig::config_search_paths();
        assert_eq!(paths[0], PathBuf::from("./fxcordic.yaml"));
        assert_eq!(paths.last(), Some(&PathBuf::from("/etc/fxcordic/config.yaml")));
    }
}
