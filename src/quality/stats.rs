//! Statistical primitives over muestreo-level averages
//!
//! All functions are total. Empty inputs, a single value or a zero mean
//! give zeros rather than `NaN`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::control_limits::{LOWER_SPEC_RATIO, SIGMA_MULTIPLIER, UPPER_SPEC_RATIO};
use crate::constants::{GROUP_CV_TARGET, PERCENT};
use crate::quality::adjustment::{finite_or_zero, is_positive};
use crate::quality::muestreo::MuestreoAverage;

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    finite_or_zero(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1), 0 when n <= 1
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    finite_or_zero(variance.sqrt())
}

/// Population standard deviation (n), 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    finite_or_zero(variance.sqrt())
}

/// `std_dev / mean * 100`, 0 when the mean is not positive
pub fn coefficient_of_variation(std_dev: f64, mean: f64) -> f64 {
    if is_positive(mean) {
        finite_or_zero(std_dev / mean * PERCENT)
    } else {
        0.0
    }
}

/// `Σ(value·weight) / Σweight` over pairs with positive value and weight
pub fn weighted_average<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (weighted_sum, weight_sum) = pairs
        .into_iter()
        .filter(|(value, weight)| is_positive(*value) && is_positive(*weight))
        .fold((0.0, 0.0), |(ws, w), (value, weight)| (ws + value * weight, w + weight));

    if weight_sum > 0.0 {
        finite_or_zero(weighted_sum / weight_sum)
    } else {
        0.0
    }
}

/// Summary statistics of a sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub cv: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mean = mean(values);
        let std_dev = sample_std_dev(values);
        Self {
            count: values.len(),
            mean,
            std_dev,
            cv: coefficient_of_variation(std_dev, mean),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Control chart limits and process capability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    pub center: f64,
    pub std_dev: f64,
    pub upper_control: f64,
    /// Floored at 0
    pub lower_control: f64,
    pub upper_spec: f64,
    pub lower_spec: f64,
    /// `None` when σ is 0 or the specified strength is unknown
    pub cp: Option<f64>,
    pub cpk: Option<f64>,
}

/// Control limits over muestreo-level resistances for a specified strength
pub fn control_limits(resistances: &[f64], strength_fc: f64) -> Option<ControlLimits> {
    if resistances.is_empty() {
        return None;
    }

    let center = mean(resistances);
    let sigma = sample_std_dev(resistances);
    let upper_spec = strength_fc * UPPER_SPEC_RATIO;
    let lower_spec = strength_fc * LOWER_SPEC_RATIO;

    let (cp, cpk) = if sigma > 0.0 && is_positive(strength_fc) {
        let cp = (upper_spec - lower_spec) / (6.0 * sigma);
        let cpk = (upper_spec - center).min(center - lower_spec) / (3.0 * sigma);
        (Some(finite_or_zero(cp)), Some(finite_or_zero(cpk)))
    } else {
        (None, None)
    };

    Some(ControlLimits {
        center,
        std_dev: sigma,
        upper_control: center + SIGMA_MULTIPLIER * sigma,
        lower_control: (center - SIGMA_MULTIPLIER * sigma).max(0.0),
        upper_spec,
        lower_spec,
        cp,
        cpk,
    })
}

/// Consistency of one (fc, guarantee age) group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConsistency {
    pub strength_fc: f64,
    pub age_label: String,
    pub muestreos: usize,
    pub stats: SampleStats,
}

/// Consistency across comparable groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedCv {
    pub groups: Vec<GroupConsistency>,
    /// CV weighted by group size
    pub weighted_cv: f64,
    /// Share of grouped muestreos whose group CV is within target
    pub pct_within_target: f64,
    /// Muestreos dropped because their group was too small
    pub excluded_muestreos: usize,
}

/// Group valid muestreo averages by (fc, guarantee age) and compute per-group CV
pub fn grouped_cv(averages: &[MuestreoAverage], min_group_muestreos: usize) -> GroupedCv {
    let mut buckets: BTreeMap<(u64, String), (f64, String, Vec<f64>)> = BTreeMap::new();
    for avg in averages.iter().filter(|a| a.has_valid_data()) {
        let (age_key, age_label) = avg
            .guarantee_age
            .map(|age| (age.key(), age.label()))
            .unwrap_or_else(|| ("unknown".to_string(), "sin edad".to_string()));
        buckets
            .entry((avg.strength_fc.to_bits(), age_key))
            .or_insert_with(|| (avg.strength_fc, age_label, Vec::new()))
            .2
            .push(avg.avg_resistance);
    }

    let mut result = GroupedCv::default();
    for (_, (strength_fc, age_label, values)) in buckets {
        if values.len() < min_group_muestreos.max(1) {
            result.excluded_muestreos += values.len();
            continue;
        }
        result.groups.push(GroupConsistency {
            strength_fc,
            age_label,
            muestreos: values.len(),
            stats: SampleStats::from_values(&values),
        });
    }

    let grouped: usize = result.groups.iter().map(|g| g.muestreos).sum();
    if grouped > 0 {
        let cv_sum: f64 = result
            .groups
            .iter()
            .map(|g| g.stats.cv * g.muestreos as f64)
            .sum();
        result.weighted_cv = cv_sum / grouped as f64;

        let within: usize = result
            .groups
            .iter()
            .filter(|g| g.stats.cv <= GROUP_CV_TARGET)
            .map(|g| g.muestreos)
            .sum();
        result.pct_within_target = within as f64 / grouped as f64 * PERCENT;
    }
    result
}
