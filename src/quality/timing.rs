//! Guarantee-age testing windows
//!
//! An ensayo at guarantee age must be broken within a tolerance around the
//! instant `fecha_muestreo + guarantee age`. The tolerance widens with the
//! age, following [`crate::constants::TOLERANCE_TABLE`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{TOLERANCE_MAX_MINUTES, TOLERANCE_TABLE};
use crate::models::GuaranteeAge;
use crate::quality::flatten::FlatView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingStatus {
    TooEarly,
    OnTime,
    OutOfTime,
}

impl TimingStatus {
    pub fn is_outside_window(&self) -> bool {
        !matches!(self, TimingStatus::OnTime)
    }
}

/// Valid testing window for one ensayo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingWindow {
    pub guarantee_at: DateTime<Utc>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub tolerance_minutes: i64,
    pub status: TimingStatus,
}

/// Tolerance in minutes for a guarantee age given in hours
pub fn tolerance_minutes(age_hours: f64) -> i64 {
    TOLERANCE_TABLE
        .iter()
        .find(|(max_hours, _)| age_hours <= *max_hours)
        .map(|(_, minutes)| *minutes)
        .unwrap_or(TOLERANCE_MAX_MINUTES)
}

/// Compute the testing window and classify the actual test instant
pub fn evaluate_timing(
    fecha_muestreo: DateTime<Utc>,
    fecha_ensayo: DateTime<Utc>,
    age: &GuaranteeAge,
) -> TimingWindow {
    let age_hours = age.in_hours();
    let tolerance = tolerance_minutes(age_hours);
    let guarantee_at = fecha_muestreo + Duration::minutes((age_hours * 60.0).round() as i64);
    let window_start = guarantee_at - Duration::minutes(tolerance);
    let window_end = guarantee_at + Duration::minutes(tolerance);

    let status = if fecha_ensayo < window_start {
        TimingStatus::TooEarly
    } else if fecha_ensayo > window_end {
        TimingStatus::OutOfTime
    } else {
        TimingStatus::OnTime
    };

    TimingWindow {
        guarantee_at,
        window_start,
        window_end,
        tolerance_minutes: tolerance,
        status,
    }
}

/// Guarantee-age ensayo tested outside its window or flagged as such
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutOfTimeEnsayo {
    pub ensayo_id: String,
    pub muestreo_id: String,
    pub remision_id: String,
    /// Stored `is_ensayo_fuera_tiempo` flag
    pub flagged: bool,
    /// Computed window, when both timestamps and an age are known
    pub window: Option<TimingWindow>,
    /// The computed status contradicts the stored flag
    pub flag_mismatch: bool,
}

/// List flagged out-of-time ensayos and those whose timestamps fall outside the window
pub fn detect_out_of_time(view: &FlatView<'_>) -> Vec<OutOfTimeEnsayo> {
    view.guarantee_age_rows()
        .filter_map(|row| {
            let ctx = &view.muestreos[row.muestreo_index];
            let window = match (row.muestreo.fecha_muestreo, row.ensayo.fecha_ensayo, ctx.guarantee_age()) {
                (Some(sampled), Some(tested), Some(age)) => Some(evaluate_timing(sampled, tested, &age)),
                _ => None,
            };

            let flagged = row.ensayo.is_ensayo_fuera_tiempo;
            let computed_outside = window.as_ref().map(|w| w.status.is_outside_window());
            let flag_mismatch = computed_outside.is_some_and(|outside| outside != flagged);

            (flagged || computed_outside == Some(true)).then(|| OutOfTimeEnsayo {
                ensayo_id: row.ensayo.id.clone(),
                muestreo_id: row.muestreo.id.clone(),
                remision_id: row.remision.id.clone(),
                flagged,
                window,
                flag_mismatch,
            })
        })
        .collect()
}
