//! DistDiff CLI
//!
//! Command-line interface for comparing two server distributions

use clap::{Parser, Subcommand};

mod commands;

/// Exit code for runs that could not complete
const EXIT_FATAL: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "distdiff")]
#[command(about = "DistDiff - Patch-aware distribution comparison", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare distribution A against distribution B
    Compare(commands::compare::CompareArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare(args) => commands::compare::execute(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_FATAL);
        }
    }
}
