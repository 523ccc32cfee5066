//! Guarantee-age filter options derived from a candidate set

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{AgeUnit, RecipeCatalog, Remision};

/// One selectable guarantee age
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeOption {
    /// Stable key, e.g. "28_D"
    pub key: String,
    pub value: f64,
    pub unit: AgeUnit,
    /// Display label, e.g. "28 días"
    pub label: String,
    pub sort_days: f64,
}

/// Distinct guarantee ages present in the candidate remisiones, shortest first
///
/// A muestreo's own age wins over its recipe's; remisiones without
/// muestreos contribute their recipe's age.
pub fn available_ages(remisiones: &[&Remision], catalog: &RecipeCatalog) -> Vec<AgeOption> {
    let mut options: BTreeMap<String, AgeOption> = BTreeMap::new();

    for remision in remisiones {
        let recipe_age = catalog.get(&remision.recipe_id).map(|r| r.guarantee_age);
        let muestreo_ages = remision.muestreos.iter().filter_map(|m| m.guarantee_age.or(recipe_age));
        let ages: Vec<_> = if remision.muestreos.is_empty() {
            recipe_age.into_iter().collect()
        } else {
            muestreo_ages.collect()
        };

        for age in ages {
            options.entry(age.key()).or_insert_with(|| AgeOption {
                key: age.key(),
                value: age.value,
                unit: age.unit,
                label: age.label(),
                sort_days: age.sort_key_days(),
            });
        }
    }

    let mut result: Vec<AgeOption> = options.into_values().collect();
    result.sort_by(|a, b| a.sort_days.total_cmp(&b.sort_days).then_with(|| a.key.cmp(&b.key)));
    result
}
