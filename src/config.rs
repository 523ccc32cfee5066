//! Configuration management and validation.
//!
//! Provides configuration structures for the aggregation engine, the SR3
//! parser and logging, with layered loading (defaults, TOML file,
//! environment) and validation rules.

use crate::constants::{
    self, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CALIBRATION_FACTOR, DEFAULT_LOG_LEVEL,
    ENV_CALIBRATION_FACTOR, ENV_LOG_LEVEL,
};
use crate::error::{QualityError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Aggregation engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Factor applied to every computed resistance before compliance
    pub calibration_factor: f64,

    /// Days whose average compliance is below this are dropped from the curated daily trend
    pub daily_compliance_floor: f64,

    /// Yields above this are treated as data-entry errors in the volumetric trend
    pub yield_upper_bound: f64,

    /// Minimum muestreos for a (fc, age) group to count towards grouped CV
    pub min_group_muestreos: usize,

    /// Compliance target below which an alert is raised
    pub compliance_target: f64,

    /// Minimum share (0-1) of sampled remisiones before a coverage alert
    pub min_sampling_coverage: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calibration_factor: DEFAULT_CALIBRATION_FACTOR,
            daily_compliance_floor: 98.0,
            yield_upper_bound: 110.0,
            min_group_muestreos: 3,
            compliance_target: 95.0,
            min_sampling_coverage: 0.10,
        }
    }
}

impl EngineConfig {
    /// Create configuration with a custom calibration factor
    pub fn with_calibration_factor(mut self, factor: f64) -> Self {
        self.calibration_factor = factor;
        self
    }

    /// Create configuration with a custom daily trend floor
    pub fn with_daily_compliance_floor(mut self, floor: f64) -> Self {
        self.daily_compliance_floor = floor;
        self
    }

    /// Create configuration with a custom minimum group size
    pub fn with_min_group_muestreos(mut self, min: usize) -> Self {
        self.min_group_muestreos = min;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.calibration_factor.is_finite() || self.calibration_factor <= 0.0 {
            return Err(QualityError::configuration(format!(
                "calibration_factor must be a positive number, got {}",
                self.calibration_factor
            )));
        }
        if !self.yield_upper_bound.is_finite() || self.yield_upper_bound <= 0.0 {
            return Err(QualityError::configuration(
                "yield_upper_bound must be a positive number",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_sampling_coverage) {
            return Err(QualityError::configuration(
                "min_sampling_coverage must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// SR3 lab-file parser settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sr3ParserConfig {
    pub min_total_lines: usize,
    pub max_header_scan_lines: usize,
    pub fallback_header_lines: usize,
    /// A series line needs more than this many numeric tokens
    pub min_series_tokens: usize,
    pub delimiter_sample_lines: usize,
    /// Seconds between synthesised time points for force-only exports
    pub sequential_time_step: f64,
    pub max_declared_force_kg: f64,
}

impl Default for Sr3ParserConfig {
    fn default() -> Self {
        Self {
            min_total_lines: constants::sr3::MIN_TOTAL_LINES,
            max_header_scan_lines: constants::sr3::MAX_HEADER_SCAN_LINES,
            fallback_header_lines: constants::sr3::FALLBACK_HEADER_LINES,
            min_series_tokens: constants::sr3::MIN_SERIES_TOKENS,
            delimiter_sample_lines: constants::sr3::DELIMITER_SAMPLE_LINES,
            sequential_time_step: constants::sr3::SEQUENTIAL_TIME_STEP,
            max_declared_force_kg: constants::sr3::MAX_DECLARED_FORCE_KG,
        }
    }
}

impl Sr3ParserConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_total_lines == 0 {
            return Err(QualityError::configuration(
                "sr3.min_total_lines must be at least 1",
            ));
        }
        if self.delimiter_sample_lines == 0 {
            return Err(QualityError::configuration(
                "sr3.delimiter_sample_lines must be at least 1",
            ));
        }
        if !(self.sequential_time_step > 0.0) {
            return Err(QualityError::configuration(
                "sr3.sequential_time_step must be positive",
            ));
        }
        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Global configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub sr3: Sr3ParserConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Default config file location under the platform config directory
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            QualityError::configuration("Could not determine user config directory")
        })?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load with layered approach: defaults -> file -> environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using the supplied lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_CALIBRATION_FACTOR) {
            let factor = raw.trim().parse::<f64>().map_err(|_| {
                QualityError::configuration(format!(
                    "{} must be a number, got '{}'",
                    ENV_CALIBRATION_FACTOR, raw
                ))
            })?;
            debug!("Calibration factor overridden from environment: {}", factor);
            self.engine.calibration_factor = factor;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level.trim().to_lowercase();
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.sr3.validate()?;
        Ok(())
    }
}
