//! Compare command
//!
//! Usage: distdiff compare -a <DIR> -b <DIR> [-p [--improved-hashing]] [-i]

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use distdiff_core::logging_facility::{init, Profile};
use distdiff_core::{DiffConfig, HashMode};
use distdiff_engine::commands::compare::{compare, RunResult};

/// Exit code when unexpected states or error events were found
const EXIT_UNEXPECTED: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `STATUS: relative/path` lines of unexpected artifacts
    Text,
    /// The full run result as JSON
    Json,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Root of the reference distribution
    #[arg(short = 'a', long)]
    pub folder_a: Option<PathBuf>,

    /// Root of the distribution under test
    #[arg(short = 'b', long)]
    pub folder_b: Option<PathBuf>,

    /// Reconcile patch overlays of distribution B
    #[arg(short = 'p', long)]
    pub patching: bool,

    /// Compare module directories structurally instead of byte-wise
    #[arg(long, requires = "patching")]
    pub improved_hashing: bool,

    /// Drop artifacts that are the same on both sides
    #[arg(short = 'i', long)]
    pub ignore_same_items: bool,

    /// Do not treat line-break-only differences as unexpected
    #[arg(long)]
    pub ignore_line_breaks: bool,

    /// TOML run configuration; flags given here override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Phase to run (repeatable); replaces the detected profile
    #[arg(long = "phase")]
    pub phases: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

/// Run a comparison and print it; returns the process exit code.
pub fn execute(args: CompareArgs) -> Result<i32, Box<dyn std::error::Error>> {
    init(if args.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let config = build_config(&args)?;
    let result = compare(config)?;

    match args.format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => println!("{}", result.to_json_pretty()?),
    }

    if result.has_unexpected_states() || result.has_errors() {
        Ok(EXIT_UNEXPECTED)
    } else {
        Ok(0)
    }
}

fn build_config(args: &CompareArgs) -> Result<DiffConfig, Box<dyn std::error::Error>> {
    let mut config = match (&args.config, &args.folder_a, &args.folder_b) {
        (Some(path), _, _) => DiffConfig::load(path)?,
        (None, Some(a), Some(b)) => DiffConfig::new(a, b),
        _ => return Err("Must specify --folder-a and --folder-b, or --config".into()),
    };

    if let Some(a) = &args.folder_a {
        config.folder_a = a.clone();
    }
    if let Some(b) = &args.folder_b {
        config.folder_b = b.clone();
    }
    config.patch_aware |= args.patching;
    if args.improved_hashing {
        config.hash_mode = HashMode::Improved;
    }
    config.ignore_same_items |= args.ignore_same_items;
    config.ignore_line_breaks |= args.ignore_line_breaks;
    if !args.phases.is_empty() {
        config.phases = Some(args.phases.clone());
    }
    Ok(config)
}

fn print_text(result: &RunResult) {
    for line in result.unexpected_lines() {
        println!("{}", line);
    }
    for module in &result.added_modules {
        println!("ADDED MODULE: {}", module);
    }
    for module in &result.removed_modules {
        println!("REMOVED MODULE: {}", module);
    }
    for event in &result.errors {
        eprintln!("error event: {}", event.message);
    }
}
