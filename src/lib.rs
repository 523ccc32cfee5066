//! Concrete Quality Library
//!
//! A Rust library for analysing concrete compressive-strength test records
//! and reading the raw exports of compression-testing machines.
//!
//! This library provides tools for:
//! - Converting loosely-typed delivery, sampling and test records into a
//!   validated remisión → muestreo → muestra → ensayo tree
//! - Computing calibrated resistance, compliance and per-muestreo averages
//! - Recipe summaries, quality levels, trends and variant roll-ups
//! - Chart series for compliance distribution, daily and volumetric trends
//! - Parsing SR3 lab files into equal-length time/force series
//! - Layered configuration from TOML files and the environment

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod quality;
pub mod records;
pub mod sr3;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{Config, EngineConfig, Sr3ParserConfig};
pub use error::{QualityError, Result};
pub use models::{Ensayo, Muestra, Muestreo, Recipe, RecipeCatalog, Remision};
pub use quality::{QualityEngine, QualityReport};
pub use sr3::{Sr3Parser, Sr3Result};
