//! `colltrack track`

use std::path::PathBuf;

use clap::Args;
use colltrack_engine::commands::track::track_from_source;
use colltrack_engine::FsDocumentSource;

use super::{print_json, CliResult, GlobalArgs};

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Collection the document belongs to
    #[arg(long)]
    pub collection: String,

    /// Document file to store as the newest snapshot
    pub file: PathBuf,
}

pub fn execute(global: &GlobalArgs, args: TrackArgs) -> CliResult {
    let config = global.load_config()?;
    let mut store = global.open_store()?;
    let source = FsDocumentSource::default();

    let external_id = args.file.to_string_lossy();
    let outcome = track_from_source(&mut store, &source, &external_id, &args.collection, &config)?;
    print_json(&outcome)
}
