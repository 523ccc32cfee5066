//! Chart series derived from the flat view
//!
//! Grouping uses ordered maps so every series comes out sorted by date and
//! repeated runs over the same input are identical.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{COMPLIANCE_BIN_EDGES, COMPLIANCE_BIN_LABELS};
use crate::quality::adjustment::is_positive;
use crate::quality::flatten::FlatView;
use crate::quality::muestreo::MuestreoAverage;
use crate::quality::stats::mean;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBin {
    pub label: String,
    /// Inclusive lower edge; `None` for the first bin
    pub min: Option<f64>,
    /// Exclusive upper edge; `None` for the last bin
    pub max: Option<f64>,
    pub count: usize,
}

/// Index of the bin a compliance value falls into
pub fn compliance_bin(compliance: f64) -> usize {
    COMPLIANCE_BIN_EDGES
        .iter()
        .position(|edge| compliance < *edge)
        .unwrap_or(COMPLIANCE_BIN_EDGES.len())
}

/// Compliance histogram over every guarantee-age ensayo with a defined
/// recomputed compliance, out-of-time ensayos included.
///
/// Ensayos without a positive resistance or without a known fc are left out
/// rather than counted as 0%.
pub fn compliance_distribution(view: &FlatView<'_>) -> Vec<DistributionBin> {
    let mut counts = vec![0usize; COMPLIANCE_BIN_LABELS.len()];
    for row in view.guarantee_age_rows().filter(|row| row.has_compliance()) {
        counts[compliance_bin(row.compliance)] += 1;
    }

    COMPLIANCE_BIN_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| DistributionBin {
            label: label.to_string(),
            min: i.checked_sub(1).map(|prev| COMPLIANCE_BIN_EDGES[prev]),
            max: COMPLIANCE_BIN_EDGES.get(i).copied(),
            count: counts[i],
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub avg_compliance: f64,
    pub avg_resistance: f64,
    pub ensayos: usize,
}

/// Per-day averages of valid ensayos, grouped by remisión date
pub fn daily_trend_unfiltered(view: &FlatView<'_>) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for row in view.valid_rows() {
        let entry = days.entry(row.remision.fecha).or_default();
        entry.0.push(row.compliance);
        entry.1.push(row.adjusted_resistance);
    }

    days.into_iter()
        .map(|(date, (compliances, resistances))| DailyPoint {
            date,
            avg_compliance: mean(&compliances),
            avg_resistance: mean(&resistances),
            ensayos: compliances.len(),
        })
        .collect()
}

/// Daily trend restricted to days whose average compliance reaches `floor`.
///
/// This is a display filter: days below the floor are dropped even though
/// they hold valid ensayos. Use [`daily_trend_unfiltered`] for analysis.
pub fn daily_trend(view: &FlatView<'_>, floor: f64) -> Vec<DailyPoint> {
    daily_trend_unfiltered(view)
        .into_iter()
        .filter(|point| point.avg_compliance >= floor)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPoint {
    pub date: NaiveDate,
    pub avg_yield: f64,
    pub remisiones: usize,
}

/// Per-day volumetric yield; yields outside (0, upper_bound] are discarded
pub fn volumetric_trend(view: &FlatView<'_>, upper_bound: f64) -> Vec<YieldPoint> {
    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for remision in &view.remisiones {
        let y = remision.rendimiento_volumetrico;
        if is_positive(y) && y <= upper_bound {
            days.entry(remision.fecha).or_default().push(y);
        }
    }

    days.into_iter()
        .map(|(date, yields)| YieldPoint {
            date,
            avg_yield: mean(&yields).min(upper_bound),
            remisiones: yields.len(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub muestreos: usize,
    /// Mean of known yields; 0 when none
    pub avg_yield: f64,
    /// Mean of positive muestreo compliances; 0 when none
    pub avg_compliance: f64,
}

/// Sampling activity per day
pub fn muestreo_timeline(averages: &[MuestreoAverage]) -> Vec<TimelinePoint> {
    let mut days: BTreeMap<NaiveDate, Vec<&MuestreoAverage>> = BTreeMap::new();
    for avg in averages {
        days.entry(avg.sampling_date()).or_default().push(avg);
    }

    days.into_iter()
        .map(|(date, items)| {
            let yields: Vec<f64> = items.iter().filter_map(|a| a.rendimiento_volumetrico).collect();
            let compliances: Vec<f64> = items
                .iter()
                .map(|a| a.avg_compliance)
                .filter(|c| *c > 0.0)
                .collect();
            TimelinePoint {
                date,
                muestreos: items.len(),
                avg_yield: mean(&yields),
                avg_compliance: mean(&compliances),
            }
        })
        .collect()
}

/// Mean muestreos per sampling day
pub fn daily_muestreo_average(timeline: &[TimelinePoint]) -> f64 {
    if timeline.is_empty() {
        return 0.0;
    }
    let total: usize = timeline.iter().map(|p| p.muestreos).sum();
    total as f64 / timeline.len() as f64
}
