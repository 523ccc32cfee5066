//! Analyze command implementation
//!
//! Loads a snapshot, runs the quality engine over all remisiones or a single
//! recipe, and prints the report as a colored summary or as JSON.

use super::shared::{
    CommandStats, colorize_level, colorize_trend, format_percent, load_configuration,
    load_snapshot, print_json, setup_logging,
};
use crate::cli::args::{AnalyzeArgs, OutputFormat};
use crate::quality::{QualityEngine, QualityReport};
use anyhow::{Result, bail};
use colored::Colorize;
use std::time::Instant;
use tracing::{debug, info};

/// Analyze command runner
pub async fn run_analyze(args: AnalyzeArgs) -> Result<CommandStats> {
    let start_time = Instant::now();

    args.validate()?;
    let config = load_configuration(&args.common, args.calibration_factor)?;
    setup_logging(&args.common, &config)?;
    debug!("Loaded configuration: {:?}", config);

    let snapshot = load_snapshot(&args.snapshot).await?;
    let engine = QualityEngine::new(config.engine.clone());

    let (title, report) = match &args.recipe {
        Some(code) => {
            let Some(recipe) = snapshot.catalog.find_by_code(code) else {
                bail!("Recipe '{}' not found in snapshot", code);
            };
            info!("Analyzing recipe {} ({})", recipe.recipe_code, recipe.recipe_id);
            (
                format!("Recipe {}", recipe.recipe_code),
                engine.analyze_recipe(&snapshot.remisiones, &snapshot.catalog, &recipe.recipe_id),
            )
        }
        None => {
            info!("Analyzing {} remisiones", snapshot.remisiones.len());
            (
                "All recipes".to_string(),
                engine.analyze(&snapshot.remisiones, &snapshot.catalog),
            )
        }
    };

    match args.common.output_format {
        OutputFormat::Table => print_report(&title, &report),
        OutputFormat::Json => print_json(&report)?,
    }

    Ok(CommandStats {
        remisiones_analyzed: report.totals.remisiones,
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

fn print_report(title: &str, report: &QualityReport) {
    let summary = &report.summary;
    let totals = &report.totals;

    println!();
    println!("{}", format!("Quality report: {}", title).bright_cyan().bold());
    println!("{}", "━".repeat(48));

    if !summary.has_data {
        println!("{}", "No valid guarantee-age results in this selection".yellow());
    }

    println!("Quality level:        {}", colorize_level(summary.quality_level));
    println!("Trend:                {}", colorize_trend(summary.trend));
    println!("Average compliance:   {}", format_percent(summary.avg_compliance));
    println!("Mean resistance:      {:.1} kg/cm²", summary.mean_resistance);
    println!("Std deviation:        {:.2}", summary.std_dev);
    println!("CV:                   {}", format_percent(summary.cv));
    println!("Average yield:        {}", format_percent(summary.avg_yield));
    println!("Average cost per m³:  {:.2}", summary.avg_cost_per_m3);
    println!("Calibration factor:   {}", report.calibration_factor);

    println!();
    println!("{}", "Coverage".bold());
    println!(
        "  Remisiones:         {} ({} sampled, {:.1} m³)",
        totals.remisiones, totals.remisiones_muestreadas, totals.total_volume
    );
    println!(
        "  Muestreos:          {} ({} valid, {} site checks)",
        totals.muestreos, summary.valid_muestreos, totals.site_checks
    );
    println!(
        "  Ensayos:            {} ({} valid)",
        totals.ensayos, totals.valid_ensayos
    );
    println!("  Sampling coverage:  {}", format_percent(totals.sampling_coverage));
    println!("  Quality data:       {}", format_percent(totals.quality_data_coverage));
    println!("  On-time testing:    {}", format_percent(totals.on_time_testing_rate));

    let age_stats = &report.guarantee_age_stats;
    if age_stats.count > 0 {
        println!();
        println!("{}", "Guarantee age (out-of-time included)".bold());
        println!(
            "  {} ensayos, {} compliant, {} below 85%, {} out of time",
            age_stats.count, age_stats.compliant, age_stats.non_compliant, age_stats.out_of_time
        );
        println!(
            "  Compliance min/avg/max: {:.1} / {:.1} / {:.1}",
            age_stats.min_compliance, age_stats.avg_compliance, age_stats.max_compliance
        );
    }

    println!();
    println!("{}", "Compliance distribution".bold());
    for bin in &report.compliance_distribution {
        println!("  {:>8}  {:>5}  {}", bin.label, bin.count, "▇".repeat(bin.count.min(40)));
    }

    if let Some(limits) = &report.control_limits {
        println!();
        println!("{}", "Control limits".bold());
        println!(
            "  Center {:.1}, UCL {:.1}, LCL {:.1}, USL {:.1}, LSL {:.1}",
            limits.center,
            limits.upper_control,
            limits.lower_control,
            limits.upper_spec,
            limits.lower_spec
        );
        if let (Some(cp), Some(cpk)) = (limits.cp, limits.cpk) {
            println!("  Cp {:.2}, Cpk {:.2}", cp, cpk);
        }
    }

    if !report.grouped_cv.groups.is_empty() {
        println!();
        println!(
            "Grouped CV: {} weighted, {} of muestreos within target",
            format_percent(report.grouped_cv.weighted_cv),
            format_percent(report.grouped_cv.pct_within_target)
        );
    }

    if !report.out_of_time.is_empty() {
        println!();
        println!(
            "{}",
            format!("{} ensayos tested outside their window", report.out_of_time.len()).yellow()
        );
    }

    if !report.alerts.is_empty() {
        println!();
        for alert in &report.alerts {
            println!("{} {}", "⚠".yellow().bold(), alert);
        }
    }
    println!();
}
