//! Tests for the quality aggregation engine
//!
//! Fixture builders shared by the per-component test files.

pub mod adjustment_tests;
pub mod summary_tests;
pub mod timing_tests;

use crate::constants::DEFAULT_CALIBRATION_FACTOR;
use crate::models::{
    Ensayo, GuaranteeAge, Muestra, Muestreo, Recipe, RecipeCatalog, Remision, TipoMuestra,
};
use crate::quality::muestreo::MuestreoAverage;
use chrono::{NaiveDate, TimeZone, Utc};

pub const TEST_FC: f64 = 250.0;

/// Assert two floats are equal within 1e-6
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

pub fn test_date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

/// Raw resistance that yields `compliance` percent against `fc` after calibration
pub fn raw_for_compliance(compliance: f64, fc: f64) -> f64 {
    compliance / 100.0 * fc / DEFAULT_CALIBRATION_FACTOR
}

/// Create a test recipe with a 28-day guarantee age
pub fn create_test_recipe(recipe_id: &str, recipe_code: &str, strength_fc: f64) -> Recipe {
    Recipe {
        recipe_id: recipe_id.to_string(),
        recipe_code: recipe_code.to_string(),
        strength_fc,
        guarantee_age: GuaranteeAge::days(28.0),
        master_code: None,
        variant_suffix: None,
    }
}

/// Create a variant recipe under a master code
pub fn create_variant_recipe(recipe_id: &str, master_code: &str, suffix: &str) -> Recipe {
    Recipe {
        master_code: Some(master_code.to_string()),
        variant_suffix: Some(suffix.to_string()),
        ..create_test_recipe(recipe_id, &format!("{}-{}", master_code, suffix), TEST_FC)
    }
}

pub fn create_test_catalog(recipes: Vec<Recipe>) -> RecipeCatalog {
    recipes.into_iter().collect()
}

/// Create a valid guarantee-age ensayo with the given raw resistance
pub fn create_test_ensayo(id: &str, raw_resistance: f64) -> Ensayo {
    Ensayo {
        id: id.to_string(),
        fecha_ensayo: None,
        carga_kg: 0.0,
        resistencia_calculada: raw_resistance,
        porcentaje_cumplimiento: Some(raw_resistance / TEST_FC * 100.0),
        is_edad_garantia: true,
        is_ensayo_fuera_tiempo: false,
    }
}

/// Create a valid ensayo whose adjusted compliance against [`TEST_FC`] is `compliance`
pub fn create_compliance_ensayo(id: &str, compliance: f64) -> Ensayo {
    create_test_ensayo(id, raw_for_compliance(compliance, TEST_FC))
}

/// Create a guarantee-age ensayo flagged out of time
pub fn create_out_of_time_ensayo(id: &str, raw_resistance: f64) -> Ensayo {
    Ensayo {
        is_ensayo_fuera_tiempo: true,
        ..create_test_ensayo(id, raw_resistance)
    }
}

/// Create a muestreo with one cylinder per ensayo
pub fn create_test_muestreo(id: &str, ensayos: Vec<Ensayo>) -> Muestreo {
    let muestras = ensayos
        .into_iter()
        .enumerate()
        .map(|(i, ensayo)| Muestra {
            id: format!("{}-s{}", id, i),
            tipo_muestra: Some(TipoMuestra::Cilindro),
            fecha_programada_ensayo: None,
            diametro_cm: Some(15.0),
            lado_cm: None,
            ensayos: vec![ensayo],
        })
        .collect();

    Muestreo {
        id: id.to_string(),
        fecha_muestreo: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
        masa_unitaria: 2350.0,
        rendimiento_volumetrico: None,
        guarantee_age: None,
        muestras,
    }
}

/// Create a muestreo whose specimens were never tested
pub fn create_site_check_muestreo(id: &str) -> Muestreo {
    Muestreo {
        muestras: vec![Muestra {
            id: format!("{}-s0", id),
            tipo_muestra: Some(TipoMuestra::Cilindro),
            fecha_programada_ensayo: None,
            diametro_cm: Some(15.0),
            lado_cm: None,
            ensayos: Vec::new(),
        }],
        ..create_test_muestreo(id, Vec::new())
    }
}

/// Create a remisión delivered on 2024-03-`day`
pub fn create_test_remision(
    id: &str,
    recipe_id: &str,
    day: u32,
    volume: f64,
    muestreos: Vec<Muestreo>,
) -> Remision {
    Remision {
        id: id.to_string(),
        remision_number: format!("R-{}", id),
        fecha: test_date(day),
        volume,
        recipe_id: recipe_id.to_string(),
        construction_site: "Obra Centro".to_string(),
        client_id: Some("client-1".to_string()),
        rendimiento_volumetrico: 99.5,
        cost_per_m3: 0.0,
        muestreos,
    }
}

/// Create a remisión with one muestreo holding one ensayo per compliance value
pub fn create_compliance_remision(id: &str, recipe_id: &str, day: u32, compliances: &[f64]) -> Remision {
    let ensayos = compliances
        .iter()
        .enumerate()
        .map(|(i, c)| create_compliance_ensayo(&format!("{}-e{}", id, i), *c))
        .collect();
    create_test_remision(
        id,
        recipe_id,
        day,
        7.0,
        vec![create_test_muestreo(&format!("{}-m", id), ensayos)],
    )
}

/// Create a muestreo average directly, for statistics that start from averages
pub fn create_test_average(remision_id: &str, day: u32, avg_resistance: f64, avg_compliance: f64) -> MuestreoAverage {
    MuestreoAverage {
        muestreo_id: format!("{}-m", remision_id),
        remision_id: remision_id.to_string(),
        recipe_id: "r1".to_string(),
        fecha: test_date(day),
        fecha_muestreo: None,
        strength_fc: TEST_FC,
        guarantee_age: Some(GuaranteeAge::days(28.0)),
        rendimiento_volumetrico: None,
        avg_resistance,
        avg_compliance,
        valid_ensayos: if avg_resistance > 0.0 { 1 } else { 0 },
        total_ensayos: 1,
    }
}
