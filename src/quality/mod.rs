//! Quality aggregation engine for concrete lab results
//!
//! This module turns remisión trees (remisión → muestreo → muestra → ensayo)
//! plus recipe metadata into compliance statistics, quality classifications
//! and chart series. It performs no I/O and never fails on data-quality
//! problems: missing, zero or malformed values degrade to `0`.
//!
//! # Architecture
//!
//! - [`adjustment`] - Calibration factor and compliance formula
//! - [`flatten`] - Single traversal into `(ensayo, muestreo, remisión, recipe)` rows
//! - [`muestreo`] - Muestreo-level averages and site-check detection
//! - [`timing`] - Guarantee-age testing windows and out-of-time detection
//! - [`stats`] - Mean, standard deviation, CV, control limits, grouped CV
//! - [`summary`] - Recipe summary, quality level, trend, totals, alerts
//! - [`variants`] - Per-variant summaries and the master roll-up
//! - [`charts`] - Compliance distribution, daily and volumetric trends, timeline
//! - [`ages`] - Available guarantee-age options
//! - [`engine`] - [`QualityEngine`], the entry point tying it all together
//!
//! # Validity
//!
//! Two ensayo audiences are kept apart:
//!
//! - **Valid ensayos** (`is_edad_garantia && !is_ensayo_fuera_tiempo &&
//!   resistencia_calculada > 0`) feed every mean, deviation and CV.
//! - **Guarantee-age ensayos** (`is_edad_garantia`, out-of-time included)
//!   feed the compliance distribution and [`GuaranteeAgeStats`] only.
//!
//! Recipe statistics weigh every sampling event equally: ensayos are first
//! averaged per muestreo, and the recipe mean, deviation and CV are taken over
//! those muestreo averages.
//!
//! # Example Usage
//!
//! ```rust
//! use concrete_quality::config::EngineConfig;
//! use concrete_quality::models::RecipeCatalog;
//! use concrete_quality::quality::QualityEngine;
//!
//! let engine = QualityEngine::new(EngineConfig::default());
//! let report = engine.analyze(&[], &RecipeCatalog::new());
//! assert!(!report.summary.has_data);
//! assert!(report.site_checks.is_empty());
//! ```

pub mod adjustment;
pub mod ages;
pub mod charts;
pub mod engine;
pub mod flatten;
pub mod muestreo;
pub mod stats;
pub mod summary;
pub mod timing;
pub mod variants;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use adjustment::{adjust_resistance, compute_compliance, Calibration};
pub use ages::AgeOption;
pub use charts::{DailyPoint, DistributionBin, TimelinePoint, YieldPoint};
pub use engine::{QualityEngine, QualityReport};
pub use muestreo::{MuestreoAverage, SiteCheck};
pub use stats::{ControlLimits, GroupedCv, SampleStats};
pub use summary::{
    classify_trend, Alert, AnalysisTotals, GuaranteeAgeStats, QualityLevel, RecipeSummary,
    TrendDirection,
};
pub use timing::{evaluate_timing, tolerance_minutes, OutOfTimeEnsayo, TimingStatus, TimingWindow};
pub use variants::{MasterRollup, VariantComparison, VariantSummary};
