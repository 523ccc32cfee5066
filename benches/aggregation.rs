use chrono::{Duration, NaiveDate, TimeZone, Utc};
use concrete_quality::models::{
    Ensayo, GuaranteeAge, Muestra, Muestreo, Recipe, RecipeCatalog, Remision, TipoMuestra,
};
use concrete_quality::{QualityEngine, Sr3Parser, Sr3ParserConfig};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

const RECIPES: usize = 12;
const REMISIONES: usize = 5_000;

fn build_catalog() -> RecipeCatalog {
    (0..RECIPES)
        .map(|i| Recipe {
            recipe_id: format!("r{}", i),
            recipe_code: format!("{}-28-{}", 200 + (i / 3) * 50, i % 3),
            strength_fc: 200.0 + (i / 3) as f64 * 50.0,
            guarantee_age: GuaranteeAge::days(28.0),
            master_code: Some(format!("{}-28", 200 + (i / 3) * 50)),
            variant_suffix: Some((i % 3).to_string()),
        })
        .collect()
}

fn build_remisiones() -> Vec<Remision> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");

    (0..REMISIONES)
        .map(|i| {
            let fecha = start + Duration::days((i % 180) as i64);
            let sampled = Utc.from_utc_datetime(&fecha.and_hms_opt(9, 0, 0).expect("valid time"));
            let muestreos = if i % 4 == 0 {
                Vec::new()
            } else {
                vec![Muestreo {
                    id: format!("m{}", i),
                    fecha_muestreo: Some(sampled),
                    masa_unitaria: 2350.0,
                    rendimiento_volumetrico: Some(98.0 + (i % 5) as f64 * 0.5),
                    guarantee_age: None,
                    muestras: (0..3)
                        .map(|k| Muestra {
                            id: format!("s{}-{}", i, k),
                            tipo_muestra: Some(TipoMuestra::Cilindro),
                            fecha_programada_ensayo: None,
                            diametro_cm: Some(15.0),
                            lado_cm: None,
                            ensayos: vec![Ensayo {
                                id: format!("e{}-{}", i, k),
                                fecha_ensayo: Some(sampled + Duration::days(28) + Duration::hours(k)),
                                carga_kg: 50_000.0,
                                resistencia_calculada: 220.0 + ((i * 7 + k as usize * 13) % 120) as f64,
                                porcentaje_cumplimiento: None,
                                is_edad_garantia: k != 0,
                                is_ensayo_fuera_tiempo: i % 37 == 0,
                            }],
                        })
                        .collect(),
                }]
            };

            Remision {
                id: format!("rem{}", i),
                remision_number: format!("{:06}", i),
                fecha,
                volume: 5.0 + (i % 4) as f64,
                recipe_id: format!("r{}", i % RECIPES),
                construction_site: format!("site-{}", i % 20),
                client_id: Some(format!("client-{}", i % 9)),
                rendimiento_volumetrico: 99.0,
                cost_per_m3: 1500.0 + (i % 10) as f64 * 25.0,
                muestreos,
            }
        })
        .collect()
}

fn bench_quality_engine(c: &mut Criterion) {
    let catalog = build_catalog();
    let remisiones = build_remisiones();
    let engine = QualityEngine::default();

    c.bench_function("analyze_full_snapshot", |b| {
        b.iter(|| engine.analyze(black_box(&remisiones), black_box(&catalog)))
    });

    c.bench_function("compare_variants", |b| {
        b.iter(|| engine.compare_variants(black_box(&remisiones), black_box(&catalog), "250-28"))
    });
}

fn bench_sr3_parser(c: &mut Criterion) {
    let force: String = (0..4_000).map(|i| format!("{:.1};", i as f64 * 12.5)).collect();
    let time: String = (0..4_000).map(|i| format!("{:.2};", i as f64 * 0.05)).collect();
    let content = format!(
        "TEST DATA REPORT\nMACHINE: SR3-2000;\nMAX LOAD: 50.0 tf;\nOVERSAMPLING READINGS\n{}\n{}\n\n\n\n\n",
        force, time
    );

    let parser = Sr3Parser::new(Sr3ParserConfig::default()).expect("parser");

    c.bench_function("parse_semicolon_series", |b| {
        b.iter(|| parser.parse(black_box(&content), false))
    });
}

criterion_group!(benches, bench_quality_engine, bench_sr3_parser);
criterion_main!(benches);
