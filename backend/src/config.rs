//! Engine configuration.
//!
//! Every option has a default, so an empty file (or no file at all) yields a
//! working configuration. Values can come from a TOML file with a `[rhythm]`
//! table and be overridden through `RHYTHM_*` environment variables.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No rhythm.toml found in standard locations")]
    NotFound,
}

/// Tunables for period detection and recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmConfig {
    /// Shortest candidate period, in days.
    #[serde(default = "default_min_period")]
    pub min_period: f64,
    /// Longest candidate period, in days (inclusive).
    #[serde(default = "default_max_period")]
    pub max_period: f64,
    /// Sweep resolution, in days.
    #[serde(default = "default_step")]
    pub step: f64,
    /// Minimum composite score for an estimate to be reported.
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,
    /// Histories shorter than this produce an empty result.
    #[serde(default = "default_min_data_points")]
    pub min_data_points: usize,
    /// Number of new samples after which a stored result is recomputed.
    #[serde(default = "default_recompute_cadence")]
    pub recompute_cadence: usize,
    /// Quiet period before a burst of sample changes triggers a refresh.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_min_period() -> f64 {
    7.0
}

fn default_max_period() -> f64 {
    45.0
}

fn default_step() -> f64 {
    0.5
}

fn default_confidence_floor() -> f64 {
    0.25
}

fn default_min_data_points() -> usize {
    1
}

fn default_recompute_cadence() -> usize {
    5
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            min_period: default_min_period(),
            max_period: default_max_period(),
            step: default_step(),
            confidence_floor: default_confidence_floor(),
            min_data_points: default_min_data_points(),
            recompute_cadence: default_recompute_cadence(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    rhythm: Option<RhythmConfig>,
}

impl RhythmConfig {
    /// Parse configuration from TOML text. A missing `[rhythm]` table means
    /// all defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let config = file.rhythm.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `rhythm.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("rhythm.toml"),
            PathBuf::from("backend/rhythm.toml"),
            PathBuf::from("../rhythm.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Apply `RHYTHM_*` environment overrides on top of the current values.
    ///
    /// Recognized keys: `RHYTHM_MIN_PERIOD`, `RHYTHM_MAX_PERIOD`, `RHYTHM_STEP`,
    /// `RHYTHM_CONFIDENCE_FLOOR`, `RHYTHM_MIN_DATA_POINTS`,
    /// `RHYTHM_RECOMPUTE_CADENCE`, `RHYTHM_DEBOUNCE_MS`.
    pub fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        override_from_env("RHYTHM_MIN_PERIOD", &mut self.min_period)?;
        override_from_env("RHYTHM_MAX_PERIOD", &mut self.max_period)?;
        override_from_env("RHYTHM_STEP", &mut self.step)?;
        override_from_env("RHYTHM_CONFIDENCE_FLOOR", &mut self.confidence_floor)?;
        override_from_env("RHYTHM_MIN_DATA_POINTS", &mut self.min_data_points)?;
        override_from_env("RHYTHM_RECOMPUTE_CADENCE", &mut self.recompute_cadence)?;
        override_from_env("RHYTHM_DEBOUNCE_MS", &mut self.debounce_ms)?;
        self.validate()?;
        Ok(self)
    }

    /// Check the options describe a searchable range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "step must be a positive number, got {}",
                self.step
            )));
        }
        if !(self.min_period.is_finite() && self.max_period.is_finite()) {
            return Err(ConfigError::Invalid(
                "period bounds must be finite".to_string(),
            ));
        }
        if self.min_period <= 0.0 || self.min_period > self.max_period {
            return Err(ConfigError::Invalid(format!(
                "period bounds must satisfy 0 < min_period <= max_period, got {}..{}",
                self.min_period, self.max_period
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(ConfigError::Invalid(format!(
                "confidence_floor must lie in [0, 1], got {}",
                self.confidence_floor
            )));
        }
        if self.recompute_cadence == 0 {
            return Err(ConfigError::Invalid(
                "recompute_cadence must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn override_from_env<T: std::str::FromStr>(key: &str, target: &mut T) -> Result<(), ConfigError> {
    if let Ok(raw) = std::env::var(key) {
        *target = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: key.to_string(),
            value: raw.clone(),
        })?;
    }
    Ok(())
}
