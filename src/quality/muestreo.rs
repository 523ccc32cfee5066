//! Muestreo-level aggregation and site-check detection

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GuaranteeAge, Muestreo};
use crate::quality::adjustment::Calibration;
use crate::quality::flatten::FlatView;

/// Averages of one sampling event over its valid ensayos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuestreoAverage {
    pub muestreo_id: String,
    pub remision_id: String,
    pub recipe_id: String,
    /// Delivery date of the parent remisión
    pub fecha: NaiveDate,
    pub fecha_muestreo: Option<DateTime<Utc>>,
    pub strength_fc: f64,
    pub guarantee_age: Option<GuaranteeAge>,
    /// Yield of the muestreo, else of its remisión; `None` when unknown
    pub rendimiento_volumetrico: Option<f64>,
    pub avg_resistance: f64,
    pub avg_compliance: f64,
    pub valid_ensayos: usize,
    pub total_ensayos: usize,
}

impl MuestreoAverage {
    /// Produced at least one valid ensayo, so it enters the statistics
    pub fn has_valid_data(&self) -> bool {
        self.valid_ensayos > 0
    }

    /// Sampling event with no lab result at all
    pub fn is_site_check(&self) -> bool {
        self.total_ensayos == 0
    }

    /// Calendar day of sampling, falling back to the delivery date
    pub fn sampling_date(&self) -> NaiveDate {
        self.fecha_muestreo
            .map(|ts| ts.date_naive())
            .unwrap_or(self.fecha)
    }
}

/// A sampling event that produced no lab result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteCheck {
    pub muestreo_id: String,
    pub remision_id: String,
    pub remision_number: String,
    pub fecha_muestreo: Option<DateTime<Utc>>,
    pub construction_site: String,
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    resistance_sum: f64,
    compliance_sum: f64,
    valid: usize,
    total: usize,
}

impl Accumulator {
    fn add(&mut self, adjusted_resistance: f64, compliance: f64, valid: bool) {
        self.total += 1;
        if valid {
            self.resistance_sum += adjusted_resistance;
            self.compliance_sum += compliance;
            self.valid += 1;
        }
    }

    fn averages(&self) -> (f64, f64) {
        if self.valid == 0 {
            (0.0, 0.0)
        } else {
            let n = self.valid as f64;
            (self.resistance_sum / n, self.compliance_sum / n)
        }
    }
}

/// Average one muestreo directly: (avg_resistance, avg_compliance, valid ensayos)
///
/// Ensayos are flattened across muestras before averaging, so a muestra with
/// two breaks weighs twice as much as one with a single break.
pub fn average_muestreo(muestreo: &Muestreo, strength_fc: f64, calibration: &Calibration) -> (f64, f64, usize) {
    let mut acc = Accumulator::default();
    for ensayo in muestreo.ensayos() {
        let (adjusted, compliance) =
            calibration.adjusted_compliance(ensayo.resistencia_calculada, strength_fc);
        acc.add(adjusted, compliance, ensayo.is_valid_for_compliance());
    }
    let (avg_resistance, avg_compliance) = acc.averages();
    (avg_resistance, avg_compliance, acc.valid)
}

/// Muestreo averages for every muestreo of the view, in input order
pub fn muestreo_averages(view: &FlatView<'_>) -> Vec<MuestreoAverage> {
    let mut accumulators = vec![Accumulator::default(); view.muestreos.len()];
    for row in &view.rows {
        accumulators[row.muestreo_index].add(row.adjusted_resistance, row.compliance, row.is_valid());
    }

    view.muestreos
        .iter()
        .zip(accumulators)
        .map(|(ctx, acc)| {
            let (avg_resistance, avg_compliance) = acc.averages();
            let rendimiento_volumetrico = ctx
                .muestreo
                .rendimiento_volumetrico
                .filter(|y| *y > 0.0)
                .or_else(|| {
                    Some(ctx.remision.rendimiento_volumetrico).filter(|y| *y > 0.0)
                });
            MuestreoAverage {
                muestreo_id: ctx.muestreo.id.clone(),
                remision_id: ctx.remision.id.clone(),
                recipe_id: ctx.remision.recipe_id.clone(),
                fecha: ctx.remision.fecha,
                fecha_muestreo: ctx.muestreo.fecha_muestreo,
                strength_fc: ctx.strength_fc(),
                guarantee_age: ctx.guarantee_age(),
                rendimiento_volumetrico,
                avg_resistance,
                avg_compliance,
                valid_ensayos: acc.valid,
                total_ensayos: acc.total,
            }
        })
        .collect()
}

/// Muestreos without any ensayo, valid or not
pub fn detect_site_checks(view: &FlatView<'_>) -> Vec<SiteCheck> {
    view.muestreos
        .iter()
        .filter(|ctx| !ctx.muestreo.has_ensayos())
        .map(|ctx| SiteCheck {
            muestreo_id: ctx.muestreo.id.clone(),
            remision_id: ctx.remision.id.clone(),
            remision_number: ctx.remision.remision_number.clone(),
            fecha_muestreo: ctx.muestreo.fecha_muestreo,
            construction_site: ctx.remision.construction_site.clone(),
        })
        .collect()
}
