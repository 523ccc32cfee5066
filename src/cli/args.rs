//! Command-line argument definitions for the concrete quality tool
//!
//! This module defines the complete CLI interface using the clap derive API.
//! Options shared by every subcommand live in [`CommonArgs`] and are
//! flattened into each command.

use crate::constants::MAX_SR3_JOBS;
use crate::{QualityError, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// CLI arguments for the concrete quality tool
///
/// Analyses concrete compressive-strength records exported as JSON snapshots
/// and parses SR3 exports from compression-testing machines.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "concrete-quality",
    version,
    about = "Concrete quality analysis and SR3 lab-file parsing",
    long_about = "Computes calibrated compliance, recipe summaries, quality levels, trends and \
                  chart series from delivery/sampling/test snapshots, and extracts time/force \
                  curves from SR3 compression-machine exports."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Analyse a snapshot of remisiones and recipes
    Analyze(AnalyzeArgs),
    /// Compare the variants of a master recipe
    Variants(VariantsArgs),
    /// Parse SR3 lab exports
    Sr3(Sr3Args),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct CommonArgs {
    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// <config dir>/concrete-quality/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the analyze command
#[derive(Debug, Clone, Parser)]
pub struct AnalyzeArgs {
    /// JSON snapshot with `recipes` and `remisiones`
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Restrict the analysis to one recipe code
    #[arg(short = 'r', long = "recipe", value_name = "CODE")]
    pub recipe: Option<String>,

    /// Override the calibration factor applied to raw resistance
    #[arg(long = "calibration-factor", value_name = "FACTOR")]
    pub calibration_factor: Option<f64>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the variants command
#[derive(Debug, Clone, Parser)]
pub struct VariantsArgs {
    /// JSON snapshot with `recipes` and `remisiones`
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Master recipe code whose variants are compared
    #[arg(short = 'm', long = "master", value_name = "CODE")]
    pub master: String,

    /// Override the calibration factor applied to raw resistance
    #[arg(long = "calibration-factor", value_name = "FACTOR")]
    pub calibration_factor: Option<f64>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the sr3 command
#[derive(Debug, Clone, Parser)]
pub struct Sr3Args {
    /// Files, directories or glob patterns
    #[arg(value_name = "PATHS", required = true)]
    pub inputs: Vec<String>,

    /// Include parse diagnostics in the output
    #[arg(long = "debug")]
    pub debug: bool,

    /// Number of files parsed concurrently (defaults to the CPU count)
    #[arg(short = 'j', long = "jobs", value_name = "COUNT")]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// JSON for scripting
    Json,
}

impl CommonArgs {
    /// Log level from the verbosity flags, if they set one
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.quiet {
            Some("error")
        } else {
            match self.verbose {
                0 => None,
                1 => Some("info"),
                2 => Some("debug"),
                _ => Some("trace"),
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(QualityError::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }
        Ok(())
    }
}

fn validate_snapshot_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(QualityError::configuration(format!(
            "Snapshot file does not exist: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(QualityError::configuration(format!(
            "Snapshot path is not a file: {}",
            path.display()
        )));
    }
    Ok(())
}

fn validate_calibration_factor(factor: Option<f64>) -> Result<()> {
    match factor {
        Some(factor) if !(factor.is_finite() && factor > 0.0) => Err(QualityError::configuration(
            format!("Calibration factor must be a positive number, got {}", factor),
        )),
        _ => Ok(()),
    }
}

impl AnalyzeArgs {
    pub fn validate(&self) -> Result<()> {
        validate_snapshot_path(&self.snapshot)?;
        validate_calibration_factor(self.calibration_factor)?;
        self.common.validate()
    }
}

impl VariantsArgs {
    pub fn validate(&self) -> Result<()> {
        validate_snapshot_path(&self.snapshot)?;
        validate_calibration_factor(self.calibration_factor)?;
        if self.master.trim().is_empty() {
            return Err(QualityError::configuration("Master code cannot be empty"));
        }
        self.common.validate()
    }
}

impl Sr3Args {
    /// Worker count, defaulting to the number of CPUs
    pub fn worker_count(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err(QualityError::configuration(
                    "Number of jobs must be greater than 0",
                ));
            }
            if jobs > MAX_SR3_JOBS {
                return Err(QualityError::configuration(format!(
                    "Number of jobs cannot exceed {}",
                    MAX_SR3_JOBS
                )));
            }
        }
        self.common.validate()
    }
}
