//! Tests for recipe summaries, classification and totals

use super::*;
use crate::config::EngineConfig;
use crate::quality::adjustment::Calibration;
use crate::quality::flatten::flatten;
use crate::quality::muestreo::muestreo_averages;
use crate::quality::summary::{
    build_alerts, classify_trend, compute_totals, guarantee_age_stats, summarize, Alert,
    QualityLevel, TrendDirection,
};

#[test]
fn test_quality_classification() {
    assert_eq!(QualityLevel::classify(100.0, 5.0, 99.0), QualityLevel::Excelente);
    assert_eq!(QualityLevel::classify(96.0, 9.5, 98.0), QualityLevel::MuyBueno);
    assert_eq!(QualityLevel::classify(92.0, 11.0, 97.5), QualityLevel::Aceptable);

    // Low compliance regardless of other metrics
    assert_eq!(QualityLevel::classify(80.0, 0.0, 100.0), QualityLevel::Mejorable);

    // Excellent compliance, but yield drags the tier down
    assert_eq!(QualityLevel::classify(105.0, 5.0, 98.5), QualityLevel::MuyBueno);
    assert_eq!(QualityLevel::classify(105.0, 5.0, 0.0), QualityLevel::Mejorable);
}

#[test]
fn test_quality_level_labels() {
    assert_eq!(QualityLevel::MuyBueno.label(), "Muy Bueno");
    assert_eq!(QualityLevel::Excelente.to_string(), "Excelente");
}

#[test]
fn test_trend_improving() {
    let series = [90.0, 90.0, 90.0, 95.0, 95.0, 95.0];
    assert_eq!(classify_trend(&series, 92.5), TrendDirection::Improving);

    // A small gain is already improving
    let series = [90.0, 90.0, 90.6];
    assert_eq!(classify_trend(&series, 90.2), TrendDirection::Improving);
}

#[test]
fn test_trend_high_performance_is_improving() {
    // Drop of 4 points, but both thirds stay at or above 95
    let series = [100.0, 100.0, 100.0, 96.0, 96.0, 96.0];
    assert_eq!(classify_trend(&series, 98.0), TrendDirection::Improving);
}

#[test]
fn test_trend_declining_and_stable() {
    let series = [100.0, 92.0, 90.0];
    assert_eq!(classify_trend(&series, 94.0), TrendDirection::Declining);

    // Drop of 2.5 points is tolerated
    let series = [92.5, 91.0, 90.0];
    assert_eq!(classify_trend(&series, 91.2), TrendDirection::Stable);

    // Drop of exactly 3 points is not declining
    let series = [93.0, 91.0, 90.0];
    assert_eq!(classify_trend(&series, 91.3), TrendDirection::Stable);
}

#[test]
fn test_trend_with_few_points() {
    assert_eq!(classify_trend(&[96.0, 97.0], 96.5), TrendDirection::Improving);
    assert_eq!(classify_trend(&[90.0], 90.0), TrendDirection::Stable);

    // Empty case
    assert_eq!(classify_trend(&[], 0.0), TrendDirection::Stable);
}

#[test]
fn test_summary_statistics_over_muestreo_averages() {
    let averages = vec![
        create_test_average("a", 1, 280.0, 112.0),
        create_test_average("b", 2, 300.0, 120.0),
        create_test_average("c", 3, 320.0, 128.0),
        // Site check: counted as realised, excluded from statistics
        MuestreoAverage {
            total_ensayos: 0,
            ..create_test_average("d", 4, 0.0, 0.0)
        },
    ];
    let remisiones: Vec<Remision> = ["a", "b", "c", "d"]
        .iter()
        .enumerate()
        .map(|(i, id)| create_test_remision(id, "r1", i as u32 + 1, 5.0, Vec::new()))
        .collect();
    let refs: Vec<&Remision> = remisiones.iter().collect();

    let summary = summarize(&averages, &refs);
    assert_eq!(summary.muestreos, 4);
    assert_eq!(summary.valid_muestreos, 3);
    assert_close(summary.mean_resistance, 300.0);
    assert_close(summary.std_dev, 20.0);
    assert_close(summary.cv, 20.0 / 3.0);
    assert_close(summary.avg_compliance, 120.0);
    assert_close(summary.total_volume, 20.0);
    assert!(summary.has_data);
}

#[test]
fn test_summary_weighs_muestreos_not_ensayos() {
    // One muestreo with three breaks at 90%, one with a single break at 110%
    let heavy = create_test_muestreo(
        "m1",
        vec![
            create_compliance_ensayo("e1", 90.0),
            create_compliance_ensayo("e2", 90.0),
            create_compliance_ensayo("e3", 90.0),
        ],
    );
    let light = create_test_muestreo("m2", vec![create_compliance_ensayo("e4", 110.0)]);
    let remisiones = vec![create_test_remision("rem1", "r1", 1, 7.0, vec![heavy, light])];
    let catalog = create_test_catalog(vec![create_test_recipe("r1", "250-28", TEST_FC)]);

    let view = flatten(&remisiones, &catalog, &Calibration::default());
    let averages = muestreo_averages(&view);
    let summary = summarize(&averages, &view.remisiones);
    assert_close(summary.avg_compliance, 100.0);
}

#[test]
fn test_volume_weighted_cost() {
    let mut cheap = create_test_remision("a", "r1", 1, 10.0, Vec::new());
    cheap.cost_per_m3 = 100.0;
    let mut expensive = create_test_remision("b", "r1", 2, 30.0, Vec::new());
    expensive.cost_per_m3 = 200.0;
    let mut unpriced = create_test_remision("c", "r1", 3, 50.0, Vec::new());
    unpriced.cost_per_m3 = 0.0;

    let summary = summarize(&[], &[&cheap, &expensive, &unpriced]);
    assert_close(summary.avg_cost_per_m3, 175.0);
    assert!(!summary.has_data);
    assert_eq!(summary.quality_level, QualityLevel::Mejorable);
}

#[test]
fn test_yield_average_uses_contributing_remisiones() {
    let mut a = create_test_remision("a", "r1", 1, 5.0, Vec::new());
    a.rendimiento_volumetrico = 98.0;
    let mut b = create_test_remision("b", "r1", 2, 5.0, Vec::new());
    b.rendimiento_volumetrico = 0.0;
    let mut c = create_test_remision("c", "r1", 3, 5.0, Vec::new());
    c.rendimiento_volumetrico = 100.0;
    // No valid muestreo: its yield does not contribute
    let mut d = create_test_remision("d", "r1", 4, 5.0, Vec::new());
    d.rendimiento_volumetrico = 80.0;

    let averages = vec![
        create_test_average("a", 1, 250.0, 100.0),
        create_test_average("b", 2, 250.0, 100.0),
        create_test_average("c", 3, 250.0, 100.0),
    ];
    let summary = summarize(&averages, &[&a, &b, &c, &d]);
    assert_close(summary.avg_yield, 99.0);
}

#[test]
fn test_totals_and_coverage() {
    let remisiones = vec![
        create_test_remision(
            "rem1",
            "r1",
            1,
            7.0,
            vec![
                create_test_muestreo(
                    "m1",
                    vec![
                        create_test_ensayo("e1", 260.0),
                        create_out_of_time_ensayo("e2", 255.0),
                    ],
                ),
                create_site_check_muestreo("m2"),
            ],
        ),
        create_test_remision("rem2", "r1", 2, 3.0, Vec::new()),
    ];
    let catalog = create_test_catalog(vec![create_test_recipe("r1", "250-28", TEST_FC)]);
    let view = flatten(&remisiones, &catalog, &Calibration::default());
    let averages = muestreo_averages(&view);

    let totals = compute_totals(&view, &averages);
    assert_eq!(totals.total_volume, 10.0);
    assert_eq!(totals.remisiones, 2);
    assert_eq!(totals.remisiones_muestreadas, 1);
    assert_eq!(totals.muestreos, 2);
    assert_eq!(totals.site_checks, 1);
    assert_eq!(totals.ensayos, 2);
    assert_eq!(totals.valid_ensayos, 1);
    assert_eq!(totals.sampling_coverage, 50.0);
    assert_eq!(totals.quality_data_coverage, 50.0);
    assert_eq!(totals.on_time_testing_rate, 50.0);
}

#[test]
fn test_guarantee_age_stats_include_out_of_time() {
    let remisiones = vec![create_test_remision(
        "rem1",
        "r1",
        1,
        7.0,
        vec![create_test_muestreo(
            "m1",
            vec![
                create_compliance_ensayo("e1", 100.0),
                Ensayo {
                    is_ensayo_fuera_tiempo: true,
                    ..create_compliance_ensayo("e2", 80.0)
                },
                create_compliance_ensayo("e3", 90.0),
            ],
        )],
    )];
    let catalog = create_test_catalog(vec![create_test_recipe("r1", "250-28", TEST_FC)]);
    let view = flatten(&remisiones, &catalog, &Calibration::default());

    let stats = guarantee_age_stats(&view);
    assert_eq!(stats.count, 3);
    assert_eq!(stats.compliant, 1);
    assert_eq!(stats.non_compliant, 1);
    assert_eq!(stats.out_of_time, 1);
    assert_close(stats.min_compliance, 80.0);
    assert_close(stats.avg_compliance, 90.0);
    assert_close(stats.max_compliance, 100.0);
    assert_close(stats.compliance_std_dev, (200.0f64 / 3.0).sqrt());
}

#[test]
fn test_alerts() {
    let config = EngineConfig::default();
    let averages = vec![create_test_average("a", 1, 225.0, 90.0)];
    let sampled = create_test_remision("a", "r1", 1, 5.0, vec![create_site_check_muestreo("m")]);
    let unsampled: Vec<Remision> = (0..10)
        .map(|i| create_test_remision(&format!("u{}", i), "r1", 2, 5.0, Vec::new()))
        .collect();
    let mut refs: Vec<&Remision> = vec![&sampled];
    refs.extend(unsampled.iter());

    let summary = summarize(&averages, &refs);
    let catalog = create_test_catalog(vec![create_test_recipe("r1", "250-28", TEST_FC)]);
    let view = flatten(refs.iter().copied(), &catalog, &Calibration::default());
    let totals = compute_totals(&view, &muestreo_averages(&view));

    let alerts = build_alerts(&summary, &totals, &config);
    assert_eq!(alerts.len(), 2);
    assert!(matches!(alerts[0], Alert::LowCompliance { target, .. } if target == 95.0));
    assert!(matches!(alerts[1], Alert::LowSamplingCoverage { .. }));
    assert!(alerts[0].to_string().contains("90.0%"));
}

#[test]
fn test_no_alerts_without_data() {
    let config = EngineConfig::default();
    let summary = summarize(&[], &[]);
    let catalog = create_test_catalog(Vec::new());
    let view = flatten(std::iter::empty(), &catalog, &Calibration::default());
    let totals = compute_totals(&view, &[]);
    assert!(build_alerts(&summary, &totals, &config).is_empty());
}
