//! SR3 command implementation
//!
//! Expands the input arguments into a file list, parses the files
//! concurrently and reports one line (or JSON object) per file. A file that
//! fails to parse is reported and counted; it never stops the batch.

use super::shared::{CommandStats, create_progress_bar, load_configuration, print_json, setup_logging};
use crate::cli::args::{OutputFormat, Sr3Args};
use crate::constants::SR3_FILE_EXTENSIONS;
use crate::sr3::{Sr3Parser, Sr3Result};
use anyhow::{Context, Result, bail};
use colored::Colorize;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Outcome of parsing one file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Sr3Result>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_some()
    }
}

/// SR3 command runner
pub async fn run_sr3(args: Sr3Args) -> Result<CommandStats> {
    let start_time = Instant::now();

    args.validate()?;
    let config = load_configuration(&args.common, None)?;
    setup_logging(&args.common, &config)?;

    let files = collect_input_files(&args.inputs)?;
    if files.is_empty() {
        bail!("No SR3 files matched the given inputs");
    }

    let workers = args.worker_count();
    info!("Parsing {} files with {} workers", files.len(), workers);

    let parser = Arc::new(Sr3Parser::new(config.sr3.clone()).context("Failed to build SR3 parser")?);
    let outcomes = parse_files(
        parser,
        files,
        workers,
        args.debug,
        args.common.show_progress() && args.common.output_format == OutputFormat::Table,
    )
    .await?;

    let files_parsed = outcomes.iter().filter(|o| o.is_ok()).count();
    let files_failed = outcomes.len() - files_parsed;

    match args.common.output_format {
        OutputFormat::Table => print_outcomes(&outcomes, args.debug),
        OutputFormat::Json => print_json(&outcomes)?,
    }

    Ok(CommandStats {
        files_parsed,
        files_failed,
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

/// Expand files, directories and glob patterns into a sorted, de-duplicated list
pub fn collect_input_files(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.insert(path.to_path_buf());
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && has_sr3_extension(entry.path()) {
                    files.insert(entry.into_path());
                }
            }
        } else {
            let matches = glob::glob(input)
                .with_context(|| format!("Invalid glob pattern '{}'", input))?;
            let before = files.len();
            for entry in matches {
                match entry {
                    Ok(path) if path.is_file() => {
                        files.insert(path);
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable path: {}", e),
                }
            }
            if files.len() == before {
                warn!("No files matched '{}'", input);
            }
        }
    }

    debug!("Collected {} input files", files.len());
    Ok(files.into_iter().collect())
}

fn has_sr3_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SR3_FILE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Parse files concurrently; outcomes come back in path order
pub async fn parse_files(
    parser: Arc<Sr3Parser>,
    files: Vec<PathBuf>,
    workers: usize,
    debug: bool,
    show_progress: bool,
) -> Result<Vec<FileOutcome>> {
    let progress_bar = if show_progress {
        Some(create_progress_bar(files.len() as u64, "Parsing SR3 files")?)
    } else {
        None
    };

    let mut outcomes: Vec<FileOutcome> = stream::iter(files)
        .map(|file| {
            let parser = parser.clone();
            async move { parse_one(parser, file, debug).await }
        })
        .buffer_unordered(workers.max(1))
        .inspect(|_| {
            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        })
        .collect()
        .await;

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Parsing complete");
    }

    outcomes.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(outcomes)
}

async fn parse_one(parser: Arc<Sr3Parser>, file: PathBuf, debug: bool) -> FileOutcome {
    let bytes = match tokio::fs::read(&file).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read {}: {}", file.display(), e);
            return FileOutcome {
                file,
                result: None,
                error: Some(format!("Failed to read file: {}", e)),
            };
        }
    };

    let parsed = task::spawn_blocking(move || parser.parse_bytes(&bytes, debug)).await;
    match parsed {
        Ok(Ok(result)) => {
            debug!(
                "{}: {} points, max force {:.1} kg",
                file.display(),
                result.len(),
                result.max_force
            );
            FileOutcome {
                file,
                result: Some(result),
                error: None,
            }
        }
        Ok(Err(e)) => {
            warn!("Failed to parse {}: {}", file.display(), e);
            let message = if debug { e.to_string() } else { e.user_message() };
            FileOutcome {
                file,
                result: None,
                error: Some(message),
            }
        }
        Err(e) => FileOutcome {
            file,
            result: None,
            error: Some(format!("Parse task failed: {}", e)),
        },
    }
}

fn print_outcomes(outcomes: &[FileOutcome], debug: bool) {
    println!();
    for outcome in outcomes {
        match (&outcome.result, &outcome.error) {
            (Some(result), _) => {
                println!(
                    "{} {}  {} points, max force {:.1} kg, format {}",
                    "✓".green().bold(),
                    outcome.file.display(),
                    result.len(),
                    result.max_force,
                    result.metadata.file_format.tag()
                );
                if let Some(info) = result.debug.as_ref().filter(|_| debug) {
                    for line in &info.processing_log {
                        println!("    {}", line.bright_black());
                    }
                    for line in &info.failed_lines {
                        println!("    {}", line.yellow());
                    }
                }
            }
            (None, error) => {
                println!(
                    "{} {}  {}",
                    "✗".red().bold(),
                    outcome.file.display(),
                    error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }

    let parsed = outcomes.iter().filter(|o| o.is_ok()).count();
    println!();
    println!(
        "Parsed {} of {} files{}",
        parsed,
        outcomes.len(),
        if parsed < outcomes.len() {
            format!(", {} failed", outcomes.len() - parsed).red().to_string()
        } else {
            String::new()
        }
    );
    println!();
}
