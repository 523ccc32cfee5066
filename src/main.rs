use clap::Parser;
use concrete_quality::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = commands::run(command) => result,
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::anyhow!("Interrupted by user"))
            }
        }
    });

    match result {
        Ok(stats) if stats.has_failures() => {
            eprintln!("{} files could not be parsed", stats.files_failed);
            process::exit(2);
        }
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Concrete Quality - compressive-strength analysis and SR3 parsing");
    println!("================================================================");
    println!();
    println!("USAGE:");
    println!("    concrete-quality <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    analyze     Quality report for a JSON snapshot of remisiones and recipes");
    println!("    variants    Compare the variants of a master recipe");
    println!("    sr3         Parse SR3 exports from compression-testing machines");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    concrete-quality analyze snapshot.json");
    println!("    concrete-quality analyze snapshot.json --recipe 250-28 --format json");
    println!("    concrete-quality variants snapshot.json --master 250-28");
    println!("    concrete-quality sr3 lab/ 'uploads/*.sr3' --jobs 8");
    println!();
    println!("For detailed help on any command, use:");
    println!("    concrete-quality <COMMAND> --help");
}
