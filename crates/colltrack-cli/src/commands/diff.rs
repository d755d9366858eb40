//! `colltrack diff`: compare two files, no database involved

use std::path::PathBuf;

use clap::Args;
use colltrack_core::collaborators::DocumentSource;
use colltrack_engine::commands::document_diff::compare_documents;
use colltrack_engine::FsDocumentSource;

use super::{print_json, CliResult, GlobalArgs};

#[derive(Debug, Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,

    /// Print only the change list
    #[arg(long)]
    pub changes_only: bool,
}

pub fn execute(global: &GlobalArgs, args: DiffArgs) -> CliResult {
    let config = global.load_config()?;
    let source = FsDocumentSource::default();

    let old_id = args.old.to_string_lossy();
    let new_id = args.new.to_string_lossy();
    let old = source.fetch(&old_id)?;
    let new = source.fetch(&new_id)?;

    let result = compare_documents(&old_id, &old, &new_id, &new, &config)?;
    if args.changes_only {
        print_json(&result.changes)
    } else {
        print_json(&result)
    }
}
