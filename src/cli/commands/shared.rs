//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading, snapshot loading and the
//! small output helpers used by more than one command.

use crate::cli::args::CommonArgs;
use crate::config::Config;
use crate::quality::{QualityLevel, TrendDirection};
use crate::records::{AnalysisSnapshot, ConvertedSnapshot, convert_snapshot};
use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Statistics reported back to `main` by every command
#[derive(Debug, Clone, Default)]
pub struct CommandStats {
    /// Remisiones that went into an analysis
    pub remisiones_analyzed: usize,
    /// SR3 files parsed successfully
    pub files_parsed: usize,
    /// SR3 files that could not be read or parsed
    pub files_failed: usize,
    pub processing_time: Duration,
}

impl CommandStats {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

/// Set up structured logging on stderr.
///
/// Verbosity flags win over the configured level; `RUST_LOG` wins over both.
pub fn setup_logging(common: &CommonArgs, config: &Config) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = common
        .log_level_override()
        .unwrap_or(config.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("concrete_quality={}", log_level)));

    if common.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Resolve the config file: explicit flag, else the default path when it exists
pub fn resolve_config_file(common: &CommonArgs) -> Option<PathBuf> {
    match &common.config_file {
        Some(path) => Some(path.clone()),
        None => Config::default_config_path()
            .ok()
            .filter(|path| path.exists()),
    }
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(common: &CommonArgs, calibration_factor: Option<f64>) -> Result<Config> {
    let config_file = resolve_config_file(common);

    let mut config = Config::load_layered(config_file.as_deref()).with_context(|| match &config_file {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load default configuration".to_string(),
    })?;

    if let Some(factor) = calibration_factor {
        config.engine.calibration_factor = factor;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Read and convert a JSON snapshot, logging what the conversion dropped
pub async fn load_snapshot(path: &Path) -> Result<ConvertedSnapshot> {
    info!("Loading snapshot from {}", path.display());

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = AnalysisSnapshot::from_json_str(&content)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

    let converted = convert_snapshot(&snapshot);
    let stats = &converted.stats;
    info!(
        "Converted {} recipes and {}/{} remisiones ({:.1}% success)",
        stats.recipes_converted,
        stats.remisiones_converted,
        stats.remisiones_total,
        stats.success_rate()
    );
    if stats.remisiones_skipped > 0 {
        warn!(
            "Skipped {} remisiones with invalid records",
            stats.remisiones_skipped
        );
    }
    if stats.values_normalized > 0 || stats.timestamps_dropped > 0 {
        debug!(
            "Normalized {} numeric values and dropped {} timestamps",
            stats.values_normalized, stats.timestamps_dropped
        );
    }

    Ok(converted)
}

/// Pretty-print any serializable value as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

pub fn colorize_level(level: QualityLevel) -> ColoredString {
    match level {
        QualityLevel::Excelente => level.label().bright_green().bold(),
        QualityLevel::MuyBueno => level.label().green(),
        QualityLevel::Aceptable => level.label().yellow(),
        QualityLevel::Mejorable => level.label().red().bold(),
    }
}

pub fn colorize_trend(trend: TrendDirection) -> ColoredString {
    let label = trend.to_string();
    match trend {
        TrendDirection::Improving => label.green(),
        TrendDirection::Stable => label.normal(),
        TrendDirection::Declining => label.red(),
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}
