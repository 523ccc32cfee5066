//! Resistance calibration and compliance
//!
//! The only place the calibration factor and the compliance formula live.
//! Both functions are total: any non-finite or non-positive input yields `0`.

use crate::constants::{DEFAULT_CALIBRATION_FACTOR, PERCENT};
use serde::{Deserialize, Serialize};

/// Scale a raw resistance by the reference calibration factor
pub fn adjust_resistance(raw: f64) -> f64 {
    Calibration::default().adjust(raw)
}

/// Compliance of an adjusted resistance against the specified strength, in percent
pub fn compute_compliance(adjusted_resistance: f64, specified_fc: f64) -> f64 {
    if !is_positive(adjusted_resistance) || !is_positive(specified_fc) {
        return 0.0;
    }
    finite_or_zero(adjusted_resistance / specified_fc * PERCENT)
}

/// Calibration applied to every computed resistance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    factor: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            factor: DEFAULT_CALIBRATION_FACTOR,
        }
    }
}

impl Calibration {
    /// Non-finite or non-positive factors fall back to the reference value
    pub fn new(factor: f64) -> Self {
        if is_positive(factor) {
            Self { factor }
        } else {
            Self::default()
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn adjust(&self, raw: f64) -> f64 {
        if is_positive(raw) {
            finite_or_zero(raw * self.factor)
        } else {
            0.0
        }
    }

    /// Adjust a raw resistance and compute its compliance in one step
    pub fn adjusted_compliance(&self, raw: f64, specified_fc: f64) -> (f64, f64) {
        let adjusted = self.adjust(raw);
        (adjusted, compute_compliance(adjusted, specified_fc))
    }
}

pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
