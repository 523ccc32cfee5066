//! Tests for guarantee-age testing windows

use super::*;
use crate::quality::adjustment::Calibration;
use crate::quality::flatten::flatten;
use crate::quality::timing::{detect_out_of_time, evaluate_timing, tolerance_minutes, TimingStatus};
use chrono::{DateTime, Duration};

fn sampled_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

#[test]
fn test_tolerance_table() {
    assert_eq!(tolerance_minutes(12.0), 30);
    assert_eq!(tolerance_minutes(24.0), 30);
    assert_eq!(tolerance_minutes(25.0), 120);
    assert_eq!(tolerance_minutes(72.0), 120);
    assert_eq!(tolerance_minutes(168.0), 360);
    assert_eq!(tolerance_minutes(336.0), 720);
    assert_eq!(tolerance_minutes(672.0), 1200);
    assert_eq!(tolerance_minutes(673.0), 2880);
}

#[test]
fn test_evaluate_timing_28_days() {
    let age = GuaranteeAge::days(28.0);
    let guarantee_at = sampled_at() + Duration::days(28);

    let on_time = evaluate_timing(sampled_at(), guarantee_at + Duration::hours(15), &age);
    assert_eq!(on_time.guarantee_at, guarantee_at);
    assert_eq!(on_time.tolerance_minutes, 1200);
    assert_eq!(on_time.status, TimingStatus::OnTime);

    let late = evaluate_timing(sampled_at(), guarantee_at + Duration::hours(21), &age);
    assert_eq!(late.status, TimingStatus::OutOfTime);

    let early = evaluate_timing(sampled_at(), guarantee_at - Duration::hours(21), &age);
    assert_eq!(early.status, TimingStatus::TooEarly);
    assert!(early.status.is_outside_window());
}

#[test]
fn test_evaluate_timing_window_edges_are_inclusive() {
    let age = GuaranteeAge::hours(12.0);
    let guarantee_at = sampled_at() + Duration::hours(12);

    let window = evaluate_timing(sampled_at(), guarantee_at + Duration::minutes(30), &age);
    assert_eq!(window.status, TimingStatus::OnTime);
    assert_eq!(window.window_end, guarantee_at + Duration::minutes(30));

    let window = evaluate_timing(sampled_at(), guarantee_at + Duration::minutes(31), &age);
    assert_eq!(window.status, TimingStatus::OutOfTime);
}

#[test]
fn test_detect_out_of_time() {
    let guarantee_at = sampled_at() + Duration::days(28);

    let mut flagged_late = create_out_of_time_ensayo("late", 260.0);
    flagged_late.fecha_ensayo = Some(guarantee_at + Duration::days(2));

    let mut unflagged_late = create_test_ensayo("unflagged", 260.0);
    unflagged_late.fecha_ensayo = Some(guarantee_at + Duration::days(3));

    let mut on_time = create_test_ensayo("ok", 260.0);
    on_time.fecha_ensayo = Some(guarantee_at);

    // Flagged but no timestamp to check against
    let flagged_undated = create_out_of_time_ensayo("undated", 260.0);

    let remisiones = vec![create_test_remision(
        "rem1",
        "r1",
        1,
        7.0,
        vec![create_test_muestreo(
            "m1",
            vec![flagged_late, unflagged_late, on_time, flagged_undated],
        )],
    )];
    let catalog = create_test_catalog(vec![create_test_recipe("r1", "250-28", TEST_FC)]);
    let view = flatten(&remisiones, &catalog, &Calibration::default());

    let detected = detect_out_of_time(&view);
    let ids: Vec<&str> = detected.iter().map(|d| d.ensayo_id.as_str()).collect();
    assert_eq!(ids, vec!["late", "unflagged", "undated"]);

    assert!(detected[0].flagged);
    assert!(!detected[0].flag_mismatch);
    assert!(!detected[1].flagged);
    assert!(detected[1].flag_mismatch);
    assert!(detected[2].window.is_none());
    assert!(!detected[2].flag_mismatch);
}

#[test]
fn test_muestreo_age_overrides_recipe_age() {
    let mut muestreo = create_test_muestreo("m1", Vec::new());
    muestreo.guarantee_age = Some(GuaranteeAge::days(7.0));
    let mut ensayo = create_test_ensayo("e1", 200.0);
    // On time for 7 days, far too early for the recipe's 28
    ensayo.fecha_ensayo = Some(sampled_at() + Duration::days(7));
    muestreo.muestras.push(crate::models::Muestra {
        id: "s1".to_string(),
        tipo_muestra: None,
        fecha_programada_ensayo: None,
        diametro_cm: None,
        lado_cm: None,
        ensayos: vec![ensayo],
    });

    let remisiones = vec![create_test_remision("rem1", "r1", 1, 7.0, vec![muestreo])];
    let catalog = create_test_catalog(vec![create_test_recipe("r1", "250-28", TEST_FC)]);
    let view = flatten(&remisiones, &catalog, &Calibration::default());
    assert!(detect_out_of_time(&view).is_empty());
}
