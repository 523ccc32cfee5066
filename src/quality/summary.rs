//! Recipe-level summaries, classification and report totals

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::constants::guarantee_stats::{COMPLIANT_THRESHOLD, NON_COMPLIANT_THRESHOLD};
use crate::constants::{trend, PERCENT};
use crate::models::Remision;
use crate::quality::adjustment::is_positive;
use crate::quality::flatten::FlatView;
use crate::quality::muestreo::MuestreoAverage;
use crate::quality::stats::{coefficient_of_variation, mean, population_std_dev, sample_std_dev, weighted_average};

/// Quality tier of a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLevel {
    Excelente,
    MuyBueno,
    Aceptable,
    Mejorable,
}

impl QualityLevel {
    /// First matching tier wins
    pub fn classify(compliance: f64, cv: f64, yield_pct: f64) -> Self {
        use crate::constants::quality_tiers::*;

        if compliance >= EXCELENTE_MIN_COMPLIANCE && cv <= EXCELENTE_MAX_CV && yield_pct >= EXCELENTE_MIN_YIELD {
            QualityLevel::Excelente
        } else if compliance >= MUY_BUENO_MIN_COMPLIANCE
            && cv <= MUY_BUENO_MAX_CV
            && yield_pct >= MUY_BUENO_MIN_YIELD
        {
            QualityLevel::MuyBueno
        } else if compliance >= ACEPTABLE_MIN_COMPLIANCE
            && cv <= ACEPTABLE_MAX_CV
            && yield_pct >= ACEPTABLE_MIN_YIELD
        {
            QualityLevel::Aceptable
        } else {
            QualityLevel::Mejorable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityLevel::Excelente => "Excelente",
            QualityLevel::MuyBueno => "Muy Bueno",
            QualityLevel::Aceptable => "Aceptable",
            QualityLevel::Mejorable => "Mejorable",
        }
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        };
        f.write_str(label)
    }
}

/// Classify a date-ordered compliance series by comparing its first and last thirds.
///
/// Asymmetric on purpose: a gain above 0.5 points (or both thirds at or above
/// 95) is improving, while only a drop of more than 3 points is declining.
/// With fewer than three points the overall average decides between
/// improving and stable.
pub fn classify_trend(ordered_compliance: &[f64], overall_avg: f64) -> TrendDirection {
    let n = ordered_compliance.len();
    if n < trend::MIN_POINTS {
        return if overall_avg >= trend::HIGH_PERFORMANCE {
            TrendDirection::Improving
        } else {
            TrendDirection::Stable
        };
    }

    let third = n / 3;
    let first = mean(&ordered_compliance[..third]);
    let last = mean(&ordered_compliance[n - third..]);
    let diff = last - first;

    if diff > trend::IMPROVING_DELTA || (first >= trend::HIGH_PERFORMANCE && last >= trend::HIGH_PERFORMANCE) {
        TrendDirection::Improving
    } else if diff < trend::DECLINING_DELTA {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

/// Statistical summary of a recipe or a group of variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub remisiones: usize,
    pub total_volume: f64,
    /// Muestreos realizados, including site checks
    pub muestreos: usize,
    /// Muestreos with at least one valid ensayo
    pub valid_muestreos: usize,
    pub mean_resistance: f64,
    pub std_dev: f64,
    pub cv: f64,
    pub avg_compliance: f64,
    pub avg_yield: f64,
    pub avg_cost_per_m3: f64,
    pub quality_level: QualityLevel,
    pub trend: TrendDirection,
    /// False when no muestreo had valid data; the level then reads Mejorable
    pub has_data: bool,
}

/// Summarise a recipe from its muestreo averages and remisiones
pub fn summarize(averages: &[MuestreoAverage], remisiones: &[&Remision]) -> RecipeSummary {
    let valid: Vec<&MuestreoAverage> = averages.iter().filter(|a| a.has_valid_data()).collect();
    let resistances: Vec<f64> = valid.iter().map(|a| a.avg_resistance).collect();
    let compliances: Vec<f64> = valid.iter().map(|a| a.avg_compliance).collect();

    let mean_resistance = mean(&resistances);
    let std_dev = sample_std_dev(&resistances);
    let cv = coefficient_of_variation(std_dev, mean_resistance);
    let avg_compliance = mean(&compliances);

    // Per-remisión compliance, keyed by id; only remisiones with valid muestreos contribute
    let mut per_remision: BTreeMap<&str, (NaiveDate, Vec<f64>)> = BTreeMap::new();
    for avg in &valid {
        per_remision
            .entry(avg.remision_id.as_str())
            .or_insert_with(|| (avg.fecha, Vec::new()))
            .1
            .push(avg.avg_compliance);
    }

    let yields: Vec<f64> = remisiones
        .iter()
        .filter(|r| per_remision.contains_key(r.id.as_str()))
        .map(|r| r.rendimiento_volumetrico)
        .filter(|y| is_positive(*y))
        .collect();
    let avg_yield = mean(&yields);

    let avg_cost_per_m3 = weighted_average(remisiones.iter().map(|r| (r.cost_per_m3, r.volume)));
    let total_volume: f64 = remisiones.iter().map(|r| r.volume).sum();

    let mut trend_points: Vec<(NaiveDate, &str, f64)> = per_remision
        .iter()
        .map(|(id, (fecha, values))| (*fecha, *id, mean(values)))
        .filter(|(_, _, compliance)| *compliance > 0.0)
        .collect();
    trend_points.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    let ordered: Vec<f64> = trend_points.iter().map(|p| p.2).collect();

    RecipeSummary {
        remisiones: remisiones.len(),
        total_volume,
        muestreos: averages.len(),
        valid_muestreos: valid.len(),
        mean_resistance,
        std_dev,
        cv,
        avg_compliance,
        avg_yield,
        avg_cost_per_m3,
        quality_level: QualityLevel::classify(avg_compliance, cv, avg_yield),
        trend: classify_trend(&ordered, avg_compliance),
        has_data: !valid.is_empty(),
    }
}

/// Counts and coverage for a report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTotals {
    pub total_volume: f64,
    pub remisiones: usize,
    /// Remisiones with at least one muestreo
    pub remisiones_muestreadas: usize,
    pub muestreos: usize,
    pub site_checks: usize,
    pub ensayos: usize,
    /// Guarantee-age, on-time ensayos with positive resistance
    pub valid_ensayos: usize,
    /// Sampled remisiones over all remisiones, in percent
    pub sampling_coverage: f64,
    /// Muestreos with valid data over all muestreos, in percent
    pub quality_data_coverage: f64,
    /// Ensayos not flagged out-of-time over all ensayos, in percent
    pub on_time_testing_rate: f64,
}

pub fn compute_totals(view: &FlatView<'_>, averages: &[MuestreoAverage]) -> AnalysisTotals {
    let remisiones = view.remisiones.len();
    let remisiones_muestreadas = view
        .remisiones
        .iter()
        .filter(|r| !r.muestreos.is_empty())
        .count();
    let muestreos = averages.len();
    let with_valid = averages.iter().filter(|a| a.has_valid_data()).count();
    let ensayos = view.rows.len();
    let on_time = view
        .rows
        .iter()
        .filter(|row| !row.ensayo.is_ensayo_fuera_tiempo)
        .count();

    AnalysisTotals {
        total_volume: view.remisiones.iter().map(|r| r.volume).sum(),
        remisiones,
        remisiones_muestreadas,
        muestreos,
        site_checks: averages.iter().filter(|a| a.is_site_check()).count(),
        ensayos,
        valid_ensayos: view.valid_rows().count(),
        sampling_coverage: ratio(remisiones_muestreadas, remisiones),
        quality_data_coverage: ratio(with_valid, muestreos),
        on_time_testing_rate: ratio(on_time, ensayos),
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * PERCENT
    }
}

/// Statistics over every guarantee-age ensayo, out-of-time ones included
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeAgeStats {
    pub count: usize,
    /// Ensayos at or above 95% compliance
    pub compliant: usize,
    /// Ensayos below 85% compliance
    pub non_compliant: usize,
    pub out_of_time: usize,
    pub min_compliance: f64,
    pub avg_compliance: f64,
    pub max_compliance: f64,
    pub min_resistance: f64,
    pub avg_resistance: f64,
    pub max_resistance: f64,
    /// Population standard deviation of compliance
    pub compliance_std_dev: f64,
}

pub fn guarantee_age_stats(view: &FlatView<'_>) -> GuaranteeAgeStats {
    let rows: Vec<_> = view
        .guarantee_age_rows()
        .filter(|row| row.adjusted_resistance > 0.0)
        .collect();
    if rows.is_empty() {
        return GuaranteeAgeStats::default();
    }

    let compliances: Vec<f64> = rows.iter().map(|r| r.compliance).collect();
    let resistances: Vec<f64> = rows.iter().map(|r| r.adjusted_resistance).collect();

    GuaranteeAgeStats {
        count: rows.len(),
        compliant: compliances.iter().filter(|c| **c >= COMPLIANT_THRESHOLD).count(),
        non_compliant: compliances.iter().filter(|c| **c < NON_COMPLIANT_THRESHOLD).count(),
        out_of_time: rows.iter().filter(|r| r.ensayo.is_ensayo_fuera_tiempo).count(),
        min_compliance: compliances.iter().copied().fold(f64::INFINITY, f64::min),
        avg_compliance: mean(&compliances),
        max_compliance: compliances.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min_resistance: resistances.iter().copied().fold(f64::INFINITY, f64::min),
        avg_resistance: mean(&resistances),
        max_resistance: resistances.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        compliance_std_dev: population_std_dev(&compliances),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    LowCompliance { value: f64, target: f64 },
    LowSamplingCoverage { value: f64, minimum: f64 },
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::LowCompliance { value, target } => {
                write!(f, "Average compliance {:.1}% is below the {:.0}% target", value, target)
            }
            Alert::LowSamplingCoverage { value, minimum } => {
                write!(f, "Sampling coverage {:.1}% is below the {:.0}% minimum", value, minimum)
            }
        }
    }
}

/// Alerts for a summary; nothing is raised without data
pub fn build_alerts(summary: &RecipeSummary, totals: &AnalysisTotals, config: &EngineConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if summary.has_data && summary.avg_compliance < config.compliance_target {
        alerts.push(Alert::LowCompliance {
            value: summary.avg_compliance,
            target: config.compliance_target,
        });
    }

    let minimum = config.min_sampling_coverage * PERCENT;
    if totals.remisiones > 0 && totals.sampling_coverage < minimum {
        alerts.push(Alert::LowSamplingCoverage {
            value: totals.sampling_coverage,
            minimum,
        });
    }
    alerts
}
