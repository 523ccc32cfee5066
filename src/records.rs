//! Boundary conversion from raw data-layer rows to the domain tree
//!
//! The data-fetch collaborator hands over loosely typed rows: optional
//! numbers, string timestamps in several formats, free-text units. This
//! module validates and normalises them once so the aggregation engine only
//! ever sees the closed shapes in [`crate::models`].
//!
//! Normalisation policy: missing, NaN, infinite or negative numerics become
//! `0`; a remisión whose date cannot be parsed is skipped and counted, never
//! aborting the batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QualityError, Result};
use crate::models::{
    AgeUnit, Ensayo, GuaranteeAge, Muestra, Muestreo, Recipe, RecipeCatalog, Remision,
    TipoMuestra,
};

const DEFAULT_GUARANTEE_DAYS: f64 = 28.0;

/// Recipe row from the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeRecord {
    pub id: String,
    pub recipe_code: Option<String>,
    pub strength_fc: Option<f64>,
    pub age_days: Option<f64>,
    pub age_hours: Option<f64>,
    pub master_code: Option<String>,
    pub variant_suffix: Option<String>,
}

/// Concrete specs attached to a muestreo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcreteSpecsRecord {
    pub valor_edad: Option<f64>,
    pub unidad_edad: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsayoRecord {
    pub id: String,
    pub fecha_ensayo: Option<String>,
    pub carga_kg: Option<f64>,
    pub resistencia_calculada: Option<f64>,
    pub porcentaje_cumplimiento: Option<f64>,
    pub is_edad_garantia: Option<bool>,
    pub is_ensayo_fuera_tiempo: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MuestraRecord {
    pub id: String,
    pub tipo_muestra: Option<String>,
    pub fecha_programada_ensayo: Option<String>,
    pub diametro_cm: Option<f64>,
    pub lado_cm: Option<f64>,
    pub ensayos: Vec<EnsayoRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MuestreoRecord {
    pub id: String,
    pub fecha_muestreo: Option<String>,
    pub masa_unitaria: Option<f64>,
    pub rendimiento_volumetrico: Option<f64>,
    pub concrete_specs: Option<ConcreteSpecsRecord>,
    pub muestras: Vec<MuestraRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemisionRecord {
    pub id: String,
    pub remision_number: Option<String>,
    pub fecha: Option<String>,
    pub volume: Option<f64>,
    pub recipe_id: Option<String>,
    pub construction_site: Option<String>,
    pub client_id: Option<String>,
    pub rendimiento_volumetrico: Option<f64>,
    pub cost_per_m3: Option<f64>,
    pub muestreos: Vec<MuestreoRecord>,
}

/// Input snapshot as delivered by the data layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSnapshot {
    pub recipes: Vec<RecipeRecord>,
    pub remisiones: Vec<RemisionRecord>,
}

impl AnalysisSnapshot {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Conversion statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub recipes_converted: usize,
    pub remisiones_total: usize,
    pub remisiones_converted: usize,
    pub remisiones_skipped: usize,
    /// Present numeric fields that were NaN, infinite or negative and became 0.
    /// Missing fields also become 0 but are not counted.
    pub values_normalized: usize,
    /// Optional timestamps that could not be parsed and were dropped
    pub timestamps_dropped: usize,
    pub errors: Vec<String>,
}

impl ConversionStats {
    pub fn success_rate(&self) -> f64 {
        if self.remisiones_total == 0 {
            100.0
        } else {
            (self.remisiones_converted as f64 / self.remisiones_total as f64) * 100.0
        }
    }
}

/// Converted, validated input
#[derive(Debug, Clone, Default)]
pub struct ConvertedSnapshot {
    pub catalog: RecipeCatalog,
    pub remisiones: Vec<Remision>,
    pub stats: ConversionStats,
}

/// Convert a raw snapshot into the domain tree
pub fn convert_snapshot(snapshot: &AnalysisSnapshot) -> ConvertedSnapshot {
    let mut stats = ConversionStats {
        remisiones_total: snapshot.remisiones.len(),
        ..Default::default()
    };

    let catalog: RecipeCatalog = snapshot
        .recipes
        .iter()
        .map(|record| convert_recipe(record, &mut stats))
        .collect();
    stats.recipes_converted = catalog.len();

    let mut remisiones = Vec::with_capacity(snapshot.remisiones.len());
    for record in &snapshot.remisiones {
        match convert_remision(record, &mut stats) {
            Ok(remision) => {
                stats.remisiones_converted += 1;
                remisiones.push(remision);
            }
            Err(e) => {
                warn!("Skipping remision: {}", e);
                stats.remisiones_skipped += 1;
                stats.errors.push(e.to_string());
            }
        }
    }

    debug!(
        "Converted {} recipes and {}/{} remisiones ({} values normalized)",
        stats.recipes_converted,
        stats.remisiones_converted,
        stats.remisiones_total,
        stats.values_normalized
    );

    ConvertedSnapshot {
        catalog,
        remisiones,
        stats,
    }
}

/// Convert a recipe row; never fails, missing values fall back with a warning
pub fn convert_recipe(record: &RecipeRecord, stats: &mut ConversionStats) -> Recipe {
    let strength_fc = normalize_number(record.strength_fc, stats);
    if strength_fc == 0.0 {
        warn!(
            "Recipe {} has no specified strength, compliance will be 0",
            record.id
        );
    }

    let guarantee_age = match (record.age_hours, record.age_days) {
        (Some(hours), _) if hours.is_finite() && hours > 0.0 => GuaranteeAge::hours(hours),
        (_, Some(days)) if days.is_finite() && days > 0.0 => GuaranteeAge::days(days),
        _ => {
            warn!(
                "Recipe {} has no guarantee age, assuming {} days",
                record.id, DEFAULT_GUARANTEE_DAYS
            );
            GuaranteeAge::days(DEFAULT_GUARANTEE_DAYS)
        }
    };

    Recipe {
        recipe_id: record.id.clone(),
        recipe_code: record
            .recipe_code
            .clone()
            .unwrap_or_else(|| record.id.clone()),
        strength_fc,
        guarantee_age,
        master_code: non_empty(record.master_code.as_deref()),
        variant_suffix: non_empty(record.variant_suffix.as_deref()),
    }
}

/// Convert a remisión row and its subtree
pub fn convert_remision(record: &RemisionRecord, stats: &mut ConversionStats) -> Result<Remision> {
    if record.id.trim().is_empty() {
        return Err(QualityError::invalid_record(
            "remision",
            "<empty>",
            "missing id",
        ));
    }

    let fecha_raw = record.fecha.as_deref().ok_or_else(|| {
        QualityError::invalid_record("remision", record.id.as_str(), "missing fecha")
    })?;
    let fecha = parse_date(fecha_raw).map_err(|e| {
        QualityError::invalid_record("remision", record.id.as_str(), e.to_string())
    })?;

    let recipe_id = non_empty(record.recipe_id.as_deref()).ok_or_else(|| {
        QualityError::invalid_record("remision", record.id.as_str(), "missing recipe_id")
    })?;

    let muestreos = record
        .muestreos
        .iter()
        .map(|m| convert_muestreo(m, stats))
        .collect();

    Ok(Remision {
        id: record.id.clone(),
        remision_number: record
            .remision_number
            .clone()
            .unwrap_or_else(|| record.id.clone()),
        fecha,
        volume: normalize_number(record.volume, stats),
        recipe_id,
        construction_site: record.construction_site.clone().unwrap_or_default(),
        client_id: non_empty(record.client_id.as_deref()),
        rendimiento_volumetrico: normalize_number(record.rendimiento_volumetrico, stats),
        cost_per_m3: normalize_number(record.cost_per_m3, stats),
        muestreos,
    })
}

fn convert_muestreo(record: &MuestreoRecord, stats: &mut ConversionStats) -> Muestreo {
    let guarantee_age = record.concrete_specs.as_ref().and_then(|specs| {
        let value = specs.valor_edad.filter(|v| v.is_finite() && *v > 0.0)?;
        let unit = specs.unidad_edad.as_deref().and_then(AgeUnit::parse)?;
        Some(GuaranteeAge { value, unit })
    });

    Muestreo {
        id: record.id.clone(),
        fecha_muestreo: optional_timestamp(record.fecha_muestreo.as_deref(), stats),
        masa_unitaria: normalize_number(record.masa_unitaria, stats),
        rendimiento_volumetrico: record
            .rendimiento_volumetrico
            .filter(|v| v.is_finite() && *v > 0.0),
        guarantee_age,
        muestras: record
            .muestras
            .iter()
            .map(|m| convert_muestra(m, stats))
            .collect(),
    }
}

fn convert_muestra(record: &MuestraRecord, stats: &mut ConversionStats) -> Muestra {
    Muestra {
        id: record.id.clone(),
        tipo_muestra: record.tipo_muestra.as_deref().and_then(TipoMuestra::parse),
        fecha_programada_ensayo: optional_timestamp(
            record.fecha_programada_ensayo.as_deref(),
            stats,
        ),
        diametro_cm: record.diametro_cm.filter(|v| v.is_finite() && *v > 0.0),
        lado_cm: record.lado_cm.filter(|v| v.is_finite() && *v > 0.0),
        ensayos: record
            .ensayos
            .iter()
            .map(|e| convert_ensayo(e, stats))
            .collect(),
    }
}

fn convert_ensayo(record: &EnsayoRecord, stats: &mut ConversionStats) -> Ensayo {
    Ensayo {
        id: record.id.clone(),
        fecha_ensayo: optional_timestamp(record.fecha_ensayo.as_deref(), stats),
        carga_kg: normalize_number(record.carga_kg, stats),
        resistencia_calculada: normalize_number(record.resistencia_calculada, stats),
        porcentaje_cumplimiento: record.porcentaje_cumplimiento.filter(|v| v.is_finite()),
        is_edad_garantia: record.is_edad_garantia.unwrap_or(false),
        is_ensayo_fuera_tiempo: record.is_ensayo_fuera_tiempo.unwrap_or(false),
    }
}

/// Missing, NaN, infinite and negative values become 0
pub fn normalize_number(value: Option<f64>, stats: &mut ConversionStats) -> f64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(_) => {
            stats.values_normalized += 1;
            0.0
        }
        None => 0.0,
    }
}

fn optional_timestamp(value: Option<&str>, stats: &mut ConversionStats) -> Option<DateTime<Utc>> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match parse_timestamp(raw) {
        Ok(ts) => Some(ts),
        Err(e) => {
            debug!("Dropping unparseable timestamp '{}': {}", raw, e);
            stats.timestamps_dropped += 1;
            None
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a timestamp in any of the formats the data layer produces
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]`
/// (both read as UTC) and date-only values (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }

    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Ok(DateTime::<Utc>::from_naive_utc_and_offset(
            date.and_time(chrono::NaiveTime::MIN),
            Utc,
        )),
        Err(e) => Err(QualityError::datetime_parsing(
            format!(
                "Invalid timestamp '{}' (expected RFC 3339, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD')",
                value
            ),
            e,
        )),
    }
}

/// Parse a calendar date, accepting full timestamps as well
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => parse_timestamp(value).map(|ts| ts.date_naive()),
    }
}
