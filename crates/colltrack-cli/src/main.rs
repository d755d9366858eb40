//! colltrack CLI
//!
//! Command-line interface for tracking API collection documents

use clap::{Parser, Subcommand};
use colltrack_core::logging_facility::init;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "colltrack")]
#[command(about = "colltrack - API collection change tracking", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: commands::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Store a new snapshot of a collection and record its changes
    Track(commands::track::TrackArgs),
    /// Diff two documents without touching the database
    Diff(commands::diff::DiffArgs),
    /// List recorded changes
    Changes(commands::query::ChangesArgs),
    /// Show recorded changes as a folder tree
    Hierarchy(commands::query::ScopeArgs),
    /// Classify recorded changes by impact
    Impact(commands::query::ScopeArgs),
    /// Rank frequently changing paths and endpoints
    Frequency(commands::query::FrequencyArgs),
    /// Summarize one snapshot pair
    Compare(commands::query::CompareArgs),
    /// List stored snapshots of a collection
    Snapshots(commands::query::SnapshotsArgs),
}

fn main() {
    let cli = Cli::parse();
    init(cli.global.log_profile);

    let result = match cli.command {
        Commands::Track(args) => commands::track::execute(&cli.global, args),
        Commands::Diff(args) => commands::diff::execute(&cli.global, args),
        Commands::Changes(args) => commands::query::execute_changes(&cli.global, args),
        Commands::Hierarchy(args) => commands::query::execute_hierarchy(&cli.global, args),
        Commands::Impact(args) => commands::query::execute_impact(&cli.global, args),
        Commands::Frequency(args) => commands::query::execute_frequency(&cli.global, args),
        Commands::Compare(args) => commands::query::execute_compare(&cli.global, args),
        Commands::Snapshots(args) => commands::query::execute_snapshots(&cli.global, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
