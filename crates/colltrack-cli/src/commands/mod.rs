//! Subcommand implementations and the arguments they share.

pub mod diff;
pub mod query;
pub mod track;

use std::path::{Path, PathBuf};

use clap::Args;
use colltrack_core::config::TrackerConfig;
use colltrack_core::logging_facility::Profile;
use colltrack_store::SqliteTrackerStore;
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// SQLite database holding snapshots and change records
    #[arg(long, global = true, default_value = ".colltrack/track.db")]
    pub db: PathBuf,

    /// TOML configuration file (defaults apply when absent)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging profile: dev, prod or test
    #[arg(long, global = true, default_value = "prod", value_parser = parse_profile)]
    pub log_profile: Profile,
}

fn parse_profile(s: &str) -> Result<Profile, String> {
    s.parse::<Profile>().map_err(|e| e.message().to_string())
}

impl GlobalArgs {
    pub fn load_config(&self) -> Result<TrackerConfig, Box<dyn std::error::Error>> {
        match &self.config {
            Some(path) => Ok(TrackerConfig::load(path)?),
            None => Ok(TrackerConfig::default()),
        }
    }

    /// Open the database, creating its directory on first use.
    pub fn open_store(&self) -> Result<SqliteTrackerStore, Box<dyn std::error::Error>> {
        if let Some(parent) = self.db.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(SqliteTrackerStore::open(&self.db)?)
    }

    /// Open an existing database without creating it.
    pub fn open_existing_store(&self) -> Result<SqliteTrackerStore, Box<dyn std::error::Error>> {
        if !Path::new(&self.db).exists() {
            return Err(format!("database not found: {}", self.db.display()).into());
        }
        Ok(SqliteTrackerStore::open(&self.db)?)
    }
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
