//! Aggregation engine entry point

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::models::{RecipeCatalog, Remision};
use crate::quality::adjustment::Calibration;
use crate::quality::ages::{available_ages, AgeOption};
use crate::quality::charts::{
    compliance_distribution, daily_muestreo_average, daily_trend, daily_trend_unfiltered,
    muestreo_timeline, volumetric_trend, DailyPoint, DistributionBin, TimelinePoint, YieldPoint,
};
use crate::quality::flatten::{flatten, FlatView};
use crate::quality::muestreo::{detect_site_checks, muestreo_averages, MuestreoAverage, SiteCheck};
use crate::quality::stats::{control_limits, grouped_cv, mean, ControlLimits, GroupedCv};
use crate::quality::summary::{
    build_alerts, compute_totals, guarantee_age_stats, summarize, Alert, AnalysisTotals,
    GuaranteeAgeStats, RecipeSummary,
};
use crate::quality::timing::{detect_out_of_time, OutOfTimeEnsayo};
use crate::quality::variants::{self, VariantComparison};

/// Everything derived from one analysis snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub calibration_factor: f64,
    pub summary: RecipeSummary,
    pub totals: AnalysisTotals,
    /// Includes out-of-time ensayos
    pub guarantee_age_stats: GuaranteeAgeStats,
    pub grouped_cv: GroupedCv,
    pub control_limits: Option<ControlLimits>,
    pub alerts: Vec<Alert>,
    pub muestreo_averages: Vec<MuestreoAverage>,
    pub site_checks: Vec<SiteCheck>,
    pub out_of_time: Vec<OutOfTimeEnsayo>,
    /// Includes out-of-time ensayos
    pub compliance_distribution: Vec<DistributionBin>,
    /// Display series: only days at or above the configured compliance floor
    pub daily_trend: Vec<DailyPoint>,
    pub daily_trend_unfiltered: Vec<DailyPoint>,
    pub volumetric_trend: Vec<YieldPoint>,
    pub muestreo_timeline: Vec<TimelinePoint>,
    pub daily_muestreo_average: f64,
    pub available_ages: Vec<AgeOption>,
}

/// Stateless quality aggregation engine
///
/// Every method is a pure function of its arguments and the configuration;
/// the engine can be shared across threads and called concurrently.
#[derive(Debug, Clone, Default)]
pub struct QualityEngine {
    config: EngineConfig,
    calibration: Calibration,
}

impl QualityEngine {
    pub fn new(config: EngineConfig) -> Self {
        let calibration = Calibration::new(config.calibration_factor);
        Self {
            config,
            calibration,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Flatten the remisiones once with this engine's calibration
    pub fn flatten<'a>(&self, remisiones: &'a [Remision], catalog: &'a RecipeCatalog) -> FlatView<'a> {
        flatten(remisiones, catalog, &self.calibration)
    }

    /// Analyse every remisión in the snapshot as one population
    pub fn analyze(&self, remisiones: &[Remision], catalog: &RecipeCatalog) -> QualityReport {
        let view = flatten(remisiones, catalog, &self.calibration);
        self.build_report(&view, catalog)
    }

    /// Analyse only the remisiones of one recipe id
    pub fn analyze_recipe(&self, remisiones: &[Remision], catalog: &RecipeCatalog, recipe_id: &str) -> QualityReport {
        let view = flatten(
            remisiones.iter().filter(|r| r.recipe_id == recipe_id),
            catalog,
            &self.calibration,
        );
        self.build_report(&view, catalog)
    }

    /// Compare the variants grouped under `master_code`
    pub fn compare_variants(&self, remisiones: &[Remision], catalog: &RecipeCatalog, master_code: &str) -> VariantComparison {
        let variants = catalog.variants_of(master_code);
        let view = flatten(
            remisiones
                .iter()
                .filter(|r| variants.iter().any(|v| v.recipe_id == r.recipe_id)),
            catalog,
            &self.calibration,
        );
        let averages = muestreo_averages(&view);
        debug!(
            "Comparing {} variants of {} over {} remisiones",
            variants.len(),
            master_code,
            view.remisiones.len()
        );
        variants::compare_variants(master_code, &variants, &view.remisiones, &averages)
    }

    fn build_report(&self, view: &FlatView<'_>, catalog: &RecipeCatalog) -> QualityReport {
        let averages = muestreo_averages(view);
        let summary = summarize(&averages, &view.remisiones);
        let totals = compute_totals(view, &averages);
        let alerts = build_alerts(&summary, &totals, &self.config);

        let valid: Vec<&MuestreoAverage> = averages.iter().filter(|a| a.has_valid_data()).collect();
        let resistances: Vec<f64> = valid.iter().map(|a| a.avg_resistance).collect();
        let reference_fc = mean(&valid.iter().map(|a| a.strength_fc).collect::<Vec<_>>());

        let timeline = muestreo_timeline(&averages);

        info!(
            "Analysed {} remisiones: {} muestreos ({} site checks), {} valid ensayos, level {}",
            totals.remisiones,
            totals.muestreos,
            totals.site_checks,
            totals.valid_ensayos,
            summary.quality_level
        );

        QualityReport {
            calibration_factor: self.calibration.factor(),
            guarantee_age_stats: guarantee_age_stats(view),
            grouped_cv: grouped_cv(&averages, self.config.min_group_muestreos),
            control_limits: control_limits(&resistances, reference_fc),
            site_checks: detect_site_checks(view),
            out_of_time: detect_out_of_time(view),
            compliance_distribution: compliance_distribution(view),
            daily_trend: daily_trend(view, self.config.daily_compliance_floor),
            daily_trend_unfiltered: daily_trend_unfiltered(view),
            volumetric_trend: volumetric_trend(view, self.config.yield_upper_bound),
            daily_muestreo_average: daily_muestreo_average(&timeline),
            muestreo_timeline: timeline,
            available_ages: available_ages(&view.remisiones, catalog),
            muestreo_averages: averages,
            summary,
            totals,
            alerts,
        }
    }
}
