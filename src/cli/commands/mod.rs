//! Command implementations for the concrete quality CLI
//!
//! Each command is implemented in its own module; shared logging,
//! configuration and output helpers live in [`shared`].

pub mod analyze;
pub mod shared;
pub mod sr3;
pub mod variants;

pub use shared::CommandStats;

use crate::cli::args::Commands;
use anyhow::Result;

/// Main command runner
///
/// Dispatches to the subcommand handler:
/// - `analyze`: quality report for a snapshot or a single recipe
/// - `variants`: per-variant comparison and master roll-up
/// - `sr3`: concurrent parsing of lab exports
pub async fn run(command: Commands) -> Result<CommandStats> {
    match command {
        Commands::Analyze(args) => analyze::run_analyze(args).await,
        Commands::Variants(args) => variants::run_variants(args).await,
        Commands::Sr3(args) => sr3::run_sr3(args).await,
    }
}
