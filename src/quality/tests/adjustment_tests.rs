//! Tests for calibration and compliance

use super::*;
use crate::quality::adjustment::{adjust_resistance, compute_compliance, Calibration};

#[test]
fn test_adjust_resistance_positive() {
    for raw in [0.001, 1.0, 250.0, 312.5, 10_000.0] {
        assert_close(adjust_resistance(raw), raw * 0.92);
    }
}

#[test]
fn test_adjust_resistance_non_positive() {
    assert_eq!(adjust_resistance(0.0), 0.0);
    assert_eq!(adjust_resistance(-12.0), 0.0);
    assert_eq!(adjust_resistance(f64::NAN), 0.0);
    assert_eq!(adjust_resistance(f64::INFINITY), 0.0);
}

#[test]
fn test_compute_compliance() {
    assert_close(compute_compliance(230.0, 250.0), 92.0);
    assert_close(compute_compliance(250.0, 250.0), 100.0);

    // Guarded denominators and numerators
    assert_eq!(compute_compliance(230.0, 0.0), 0.0);
    assert_eq!(compute_compliance(0.0, 250.0), 0.0);
    assert_eq!(compute_compliance(-5.0, 250.0), 0.0);
    assert_eq!(compute_compliance(230.0, -250.0), 0.0);
    assert_eq!(compute_compliance(f64::NAN, 250.0), 0.0);
    assert_eq!(compute_compliance(230.0, f64::NAN), 0.0);
}

#[test]
fn test_custom_calibration() {
    let calibration = Calibration::new(1.0);
    assert_eq!(calibration.factor(), 1.0);
    assert_eq!(calibration.adjust(250.0), 250.0);

    let (adjusted, compliance) = calibration.adjusted_compliance(275.0, 250.0);
    assert_eq!(adjusted, 275.0);
    assert_close(compliance, 110.0);
}

#[test]
fn test_invalid_calibration_falls_back() {
    assert_eq!(Calibration::new(0.0), Calibration::default());
    assert_eq!(Calibration::new(f64::NAN).factor(), 0.92);
}
