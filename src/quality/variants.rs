//! Variant comparison under a master recipe
//!
//! Remisiones are grouped by exact recipe id, each variant is summarised on
//! its own, and a volume-weighted roll-up gives the master row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Recipe, Remision};
use crate::quality::muestreo::MuestreoAverage;
use crate::quality::stats::weighted_average;
use crate::quality::summary::{summarize, QualityLevel, RecipeSummary};

/// Statistics of one recipe variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub recipe_id: String,
    pub recipe_code: String,
    pub variant_suffix: Option<String>,
    pub summary: RecipeSummary,
    /// UI hint: this variant carries the largest delivered volume
    pub is_most_used: bool,
}

/// Volume-weighted roll-up across all variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRollup {
    pub total_volume: f64,
    pub remisiones: usize,
    pub muestreos: usize,
    pub valid_muestreos: usize,
    pub mean_resistance: f64,
    pub avg_compliance: f64,
    pub cv: f64,
    pub avg_yield: f64,
    pub avg_cost_per_m3: f64,
    pub quality_level: QualityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantComparison {
    pub master_code: String,
    /// Ordered by total volume, largest first
    pub variants: Vec<VariantSummary>,
    pub master: MasterRollup,
    pub most_used: Option<String>,
}

/// Compare variants given their recipes, remisiones and muestreo averages
///
/// Remisiones and averages for recipes outside `variants` are ignored.
pub fn compare_variants(
    master_code: &str,
    variants: &[&Recipe],
    remisiones: &[&Remision],
    averages: &[MuestreoAverage],
) -> VariantComparison {
    let mut remisiones_by_recipe: BTreeMap<&str, Vec<&Remision>> = BTreeMap::new();
    for remision in remisiones {
        remisiones_by_recipe
            .entry(remision.recipe_id.as_str())
            .or_default()
            .push(*remision);
    }

    let mut averages_by_recipe: BTreeMap<&str, Vec<MuestreoAverage>> = BTreeMap::new();
    for avg in averages {
        averages_by_recipe
            .entry(avg.recipe_id.as_str())
            .or_default()
            .push(avg.clone());
    }

    let mut summaries: Vec<VariantSummary> = variants
        .iter()
        .map(|recipe| {
            let id = recipe.recipe_id.as_str();
            let variant_remisiones = remisiones_by_recipe.get(id).map(Vec::as_slice).unwrap_or(&[]);
            let variant_averages = averages_by_recipe.get(id).map(Vec::as_slice).unwrap_or(&[]);
            VariantSummary {
                recipe_id: recipe.recipe_id.clone(),
                recipe_code: recipe.recipe_code.clone(),
                variant_suffix: recipe.variant_suffix.clone(),
                summary: summarize(variant_averages, variant_remisiones),
                is_most_used: false,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.summary
            .total_volume
            .total_cmp(&a.summary.total_volume)
            .then_with(|| a.recipe_id.cmp(&b.recipe_id))
    });

    let most_used = summaries
        .first()
        .filter(|v| v.summary.total_volume > 0.0)
        .map(|v| v.recipe_id.clone());
    if let Some(first) = summaries.first_mut() {
        first.is_most_used = most_used.is_some();
    }

    let included: Vec<&Remision> = summaries
        .iter()
        .flat_map(|v| remisiones_by_recipe.get(v.recipe_id.as_str()))
        .flatten()
        .copied()
        .collect();

    VariantComparison {
        master_code: master_code.to_string(),
        master: roll_up(&summaries, &included),
        variants: summaries,
        most_used,
    }
}

fn roll_up(variants: &[VariantSummary], remisiones: &[&Remision]) -> MasterRollup {
    // Variants without valid muestreos carry no statistics to weigh
    let with_data: Vec<&RecipeSummary> = variants
        .iter()
        .map(|v| &v.summary)
        .filter(|s| s.has_data && s.total_volume > 0.0)
        .collect();
    let data_volume: f64 = with_data.iter().map(|s| s.total_volume).sum();
    let weighted = |metric: fn(&RecipeSummary) -> f64| {
        if data_volume > 0.0 {
            with_data.iter().map(|s| metric(s) * s.total_volume).sum::<f64>() / data_volume
        } else {
            0.0
        }
    };

    let avg_compliance = weighted(|s| s.avg_compliance);
    let cv = weighted(|s| s.cv);
    let avg_yield = weighted_average(with_data.iter().map(|s| (s.avg_yield, s.total_volume)));

    MasterRollup {
        total_volume: variants.iter().map(|v| v.summary.total_volume).sum(),
        remisiones: variants.iter().map(|v| v.summary.remisiones).sum(),
        muestreos: variants.iter().map(|v| v.summary.muestreos).sum(),
        valid_muestreos: variants.iter().map(|v| v.summary.valid_muestreos).sum(),
        mean_resistance: weighted(|s| s.mean_resistance),
        avg_compliance,
        cv,
        avg_yield,
        avg_cost_per_m3: weighted_average(remisiones.iter().map(|r| (r.cost_per_m3, r.volume))),
        quality_level: QualityLevel::classify(avg_compliance, cv, avg_yield),
    }
}
