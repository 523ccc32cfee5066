//! Core domain structures for quality analysis.
//!
//! Defines the closed, validated shape of the test-record tree
//! (remisión → muestreo → muestra → ensayo) and the recipe catalog. Values
//! here have already passed through [`crate::records`], so numeric fields
//! are finite and non-negative.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::UNKNOWN_AGE_SORT_DAYS;

/// Physical specimen shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TipoMuestra {
    Cilindro,
    Viga,
    Cubo,
}

impl TipoMuestra {
    /// Lenient parse of the stored specimen type
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "CILINDRO" => Some(TipoMuestra::Cilindro),
            "VIGA" => Some(TipoMuestra::Viga),
            "CUBO" => Some(TipoMuestra::Cubo),
            _ => None,
        }
    }
}

/// Unit of a guarantee age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeUnit {
    Hours,
    Days,
}

impl AgeUnit {
    /// Parse the unit codes used by the catalog ("HORA", "H", "DÍA", "D")
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "HORA" | "HORAS" | "H" => Some(AgeUnit::Hours),
            "DÍA" | "DIA" | "DÍAS" | "DIAS" | "D" => Some(AgeUnit::Days),
            _ => None,
        }
    }
}

/// Contractual age at which compliance is measured
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeAge {
    pub value: f64,
    pub unit: AgeUnit,
}

impl GuaranteeAge {
    pub fn days(value: f64) -> Self {
        Self {
            value,
            unit: AgeUnit::Days,
        }
    }

    pub fn hours(value: f64) -> Self {
        Self {
            value,
            unit: AgeUnit::Hours,
        }
    }

    pub fn in_hours(&self) -> f64 {
        match self.unit {
            AgeUnit::Hours => self.value,
            AgeUnit::Days => self.value * 24.0,
        }
    }

    pub fn in_days(&self) -> f64 {
        match self.unit {
            AgeUnit::Hours => self.value / 24.0,
            AgeUnit::Days => self.value,
        }
    }

    /// Sort key in days; non-positive ages sort with the default age
    pub fn sort_key_days(&self) -> f64 {
        let days = self.in_days();
        if days > 0.0 { days } else { UNKNOWN_AGE_SORT_DAYS }
    }

    /// Human label, e.g. "1 día", "28 días", "12 horas"
    pub fn label(&self) -> String {
        let value = format_age_value(self.value);
        let singular = self.value == 1.0;
        match (self.unit, singular) {
            (AgeUnit::Hours, true) => format!("{} hora", value),
            (AgeUnit::Hours, false) => format!("{} horas", value),
            (AgeUnit::Days, true) => format!("{} día", value),
            (AgeUnit::Days, false) => format!("{} días", value),
        }
    }

    /// Stable filter key, e.g. "28_D", "12_H"
    pub fn key(&self) -> String {
        let unit = match self.unit {
            AgeUnit::Hours => "H",
            AgeUnit::Days => "D",
        };
        format!("{}_{}", format_age_value(self.value), unit)
    }
}

fn format_age_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// A concrete/mortar formulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: String,
    pub recipe_code: String,
    /// Specified strength (kg/cm²)
    pub strength_fc: f64,
    pub guarantee_age: GuaranteeAge,
    /// Nominal product code shared by variants
    pub master_code: Option<String>,
    pub variant_suffix: Option<String>,
}

impl Recipe {
    pub fn age_days(&self) -> f64 {
        self.guarantee_age.in_days()
    }

    /// Code used to group variants; falls back to the recipe code
    pub fn grouping_code(&self) -> &str {
        self.master_code.as_deref().unwrap_or(&self.recipe_code)
    }
}

/// Recipe lookup by id
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: HashMap<String, Recipe>,
}

impl RecipeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.recipe_id.clone(), recipe);
    }

    pub fn get(&self, recipe_id: &str) -> Option<&Recipe> {
        self.recipes.get(recipe_id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes whose grouping code matches `master_code`, ordered by id
    pub fn variants_of(&self, master_code: &str) -> Vec<&Recipe> {
        let mut variants: Vec<&Recipe> = self
            .recipes
            .values()
            .filter(|r| r.grouping_code() == master_code)
            .collect();
        variants.sort_by(|a, b| a.recipe_id.cmp(&b.recipe_id));
        variants
    }

    /// Recipe whose code matches exactly
    pub fn find_by_code(&self, recipe_code: &str) -> Option<&Recipe> {
        self.recipes.values().find(|r| r.recipe_code == recipe_code)
    }
}

impl FromIterator<Recipe> for RecipeCatalog {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        let mut catalog = RecipeCatalog::new();
        for recipe in iter {
            catalog.insert(recipe);
        }
        catalog
    }
}

/// One lab test (break)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensayo {
    pub id: String,
    pub fecha_ensayo: Option<DateTime<Utc>>,
    pub carga_kg: f64,
    /// Raw computed resistance, before calibration
    pub resistencia_calculada: f64,
    /// Raw stored compliance; `None` when never computed
    pub porcentaje_cumplimiento: Option<f64>,
    pub is_edad_garantia: bool,
    pub is_ensayo_fuera_tiempo: bool,
}

impl Ensayo {
    /// Counts towards compliance statistics: guarantee age, on time, positive resistance
    pub fn is_valid_for_compliance(&self) -> bool {
        self.is_edad_garantia && !self.is_ensayo_fuera_tiempo && self.resistencia_calculada > 0.0
    }

    /// Counts towards the broader "all guarantee-age" views (includes out-of-time)
    pub fn is_guarantee_age(&self) -> bool {
        self.is_edad_garantia
    }
}

/// One physical specimen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Muestra {
    pub id: String,
    pub tipo_muestra: Option<TipoMuestra>,
    pub fecha_programada_ensayo: Option<DateTime<Utc>>,
    pub diametro_cm: Option<f64>,
    pub lado_cm: Option<f64>,
    pub ensayos: Vec<Ensayo>,
}

/// One on-site sampling event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Muestreo {
    pub id: String,
    pub fecha_muestreo: Option<DateTime<Utc>>,
    pub masa_unitaria: f64,
    pub rendimiento_volumetrico: Option<f64>,
    /// Age from the sampling's concrete specs, overriding the recipe's
    pub guarantee_age: Option<GuaranteeAge>,
    pub muestras: Vec<Muestra>,
}

impl Muestreo {
    /// True iff any muestra has any ensayo, valid or not
    pub fn has_ensayos(&self) -> bool {
        self.muestras.iter().any(|m| !m.ensayos.is_empty())
    }

    /// All ensayos of the muestreo, flattened
    pub fn ensayos(&self) -> impl Iterator<Item = &Ensayo> {
        self.muestras.iter().flat_map(|m| m.ensayos.iter())
    }
}

/// One concrete delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remision {
    pub id: String,
    pub remision_number: String,
    pub fecha: NaiveDate,
    /// Delivered volume (m³)
    pub volume: f64,
    pub recipe_id: String,
    pub construction_site: String,
    pub client_id: Option<String>,
    /// Volumetric yield (%); 0 when unknown
    pub rendimiento_volumetrico: f64,
    /// Cost per m³; 0 when unknown
    pub cost_per_m3: f64,
    pub muestreos: Vec<Muestreo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_unit_parse() {
        assert_eq!(AgeUnit::parse("HORA"), Some(AgeUnit::Hours));
        assert_eq!(AgeUnit::parse("h"), Some(AgeUnit::Hours));
        assert_eq!(AgeUnit::parse("DÍA"), Some(AgeUnit::Days));
        assert_eq!(AgeUnit::parse("D"), Some(AgeUnit::Days));
        assert_eq!(AgeUnit::parse("SEMANA"), None);
    }

    #[test]
    fn test_guarantee_age_normalization() {
        let hours = GuaranteeAge::hours(12.0);
        assert_eq!(hours.in_hours(), 12.0);
        assert_eq!(hours.in_days(), 0.5);
        assert_eq!(hours.label(), "12 horas");
        assert_eq!(hours.key(), "12_H");

        let days = GuaranteeAge::days(28.0);
        assert_eq!(days.in_hours(), 672.0);
        assert_eq!(days.label(), "28 días");
        assert_eq!(GuaranteeAge::days(1.0).label(), "1 día");
    }

    #[test]
    fn test_ensayo_validity() {
        let mut ensayo = Ensayo {
            id: "e1".to_string(),
            fecha_ensayo: None,
            carga_kg: 0.0,
            resistencia_calculada: 250.0,
            porcentaje_cumplimiento: Some(100.0),
            is_edad_garantia: true,
            is_ensayo_fuera_tiempo: false,
        };
        assert!(ensayo.is_valid_for_compliance());

        ensayo.is_ensayo_fuera_tiempo = true;
        assert!(!ensayo.is_valid_for_compliance());
        assert!(ensayo.is_guarantee_age());

        ensayo.is_ensayo_fuera_tiempo = false;
        ensayo.resistencia_calculada = 0.0;
        assert!(!ensayo.is_valid_for_compliance());
    }

    #[test]
    fn test_catalog_variants() {
        let base = Recipe {
            recipe_id: "r1".to_string(),
            recipe_code: "250-10-B".to_string(),
            strength_fc: 250.0,
            guarantee_age: GuaranteeAge::days(28.0),
            master_code: Some("250-10".to_string()),
            variant_suffix: Some("B".to_string()),
        };
        let other = Recipe {
            recipe_id: "r0".to_string(),
            recipe_code: "250-10-A".to_string(),
            variant_suffix: Some("A".to_string()),
            ..base.clone()
        };
        let unrelated = Recipe {
            recipe_id: "r9".to_string(),
            recipe_code: "300-14".to_string(),
            master_code: None,
            ..base.clone()
        };

        let catalog: RecipeCatalog = vec![base, other, unrelated].into_iter().collect();
        let variants = catalog.variants_of("250-10");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].recipe_id, "r0");
        assert_eq!(catalog.variants_of("300-14").len(), 1);
        assert!(catalog.find_by_code("300-14").is_some());
    }
}
