//! Variants command implementation

use super::shared::{
    CommandStats, colorize_level, format_percent, load_configuration, load_snapshot, print_json,
    setup_logging,
};
use crate::cli::args::{OutputFormat, VariantsArgs};
use crate::quality::{QualityEngine, VariantComparison};
use anyhow::{Result, bail};
use colored::Colorize;
use std::time::Instant;
use tracing::info;

/// Variants command runner
pub async fn run_variants(args: VariantsArgs) -> Result<CommandStats> {
    let start_time = Instant::now();

    args.validate()?;
    let config = load_configuration(&args.common, args.calibration_factor)?;
    setup_logging(&args.common, &config)?;

    let snapshot = load_snapshot(&args.snapshot).await?;
    let master_code = args.master.trim();
    if snapshot.catalog.variants_of(master_code).is_empty() {
        bail!("No recipe variants found for master '{}'", master_code);
    }

    let engine = QualityEngine::new(config.engine.clone());
    let comparison = engine.compare_variants(&snapshot.remisiones, &snapshot.catalog, master_code);
    info!(
        "Compared {} variants of {}",
        comparison.variants.len(),
        comparison.master_code
    );

    match args.common.output_format {
        OutputFormat::Table => print_comparison(&comparison),
        OutputFormat::Json => print_json(&comparison)?,
    }

    Ok(CommandStats {
        remisiones_analyzed: comparison.master.remisiones,
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

fn print_comparison(comparison: &VariantComparison) {
    println!();
    println!(
        "{}",
        format!("Variants of {}", comparison.master_code)
            .bright_cyan()
            .bold()
    );
    println!("{}", "━".repeat(86));
    println!(
        "{:<18} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}  {}",
        "Recipe", "Volume", "Muestreos", "Compl.", "Mean", "CV", "Yield", "Level"
    );

    for variant in &comparison.variants {
        let summary = &variant.summary;
        let marker = if variant.is_most_used { " ★" } else { "" };
        println!(
            "{:<18} {:>10.1} {:>10} {:>10} {:>10.1} {:>8} {:>8}  {}{}",
            variant.recipe_code,
            summary.total_volume,
            summary.valid_muestreos,
            format_percent(summary.avg_compliance),
            summary.mean_resistance,
            format_percent(summary.cv),
            format_percent(summary.avg_yield),
            colorize_level(summary.quality_level),
            marker.yellow()
        );
    }

    let master = &comparison.master;
    println!("{}", "─".repeat(86));
    println!(
        "{:<18} {:>10.1} {:>10} {:>10} {:>10.1} {:>8} {:>8}  {}",
        "Master",
        master.total_volume,
        master.valid_muestreos,
        format_percent(master.avg_compliance),
        master.mean_resistance,
        format_percent(master.cv),
        format_percent(master.avg_yield),
        colorize_level(master.quality_level)
    );
    println!("Average cost per m³: {:.2}", master.avg_cost_per_m3);
    println!();
}
