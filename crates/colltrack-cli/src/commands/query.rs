//! Read-only subcommands backed by `apply_engine_query`

use chrono::{DateTime, Duration, Utc};
use clap::{Args, ValueEnum};
use colltrack_core::analytics::TimeWindow;
use colltrack_core::collaborators::ChangeFilter;
use colltrack_core::diff::model::ChangeType;
use colltrack_engine::commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
use colltrack_engine::commands::read_tools::DEFAULT_LIST_LIMIT;

use super::{print_json, CliResult, GlobalArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChangeTypeArg {
    Added,
    Deleted,
    Modified,
}

impl From<ChangeTypeArg> for ChangeType {
    fn from(arg: ChangeTypeArg) -> Self {
        match arg {
            ChangeTypeArg::Added => ChangeType::Added,
            ChangeTypeArg::Deleted => ChangeType::Deleted,
            ChangeTypeArg::Modified => ChangeType::Modified,
        }
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

/// Collection scope shared by the record-set queries.
#[derive(Debug, Args)]
pub struct ScopeArgs {
    #[arg(long)]
    pub collection: String,

    /// Only records whose old or new snapshot is this id
    #[arg(long)]
    pub snapshot: Option<String>,
}

impl ScopeArgs {
    fn filter(&self) -> ChangeFilter {
        let filter = ChangeFilter::for_collection(&self.collection);
        match &self.snapshot {
            Some(id) => filter.with_snapshot(id),
            None => filter,
        }
    }
}

#[derive(Debug, Args)]
pub struct ChangesArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Restrict to these change types (repeatable)
    #[arg(long = "type", value_enum)]
    pub change_types: Vec<ChangeTypeArg>,

    /// Substring of the change path
    #[arg(long)]
    pub path: Option<String>,

    #[arg(long, value_parser = parse_timestamp)]
    pub since: Option<DateTime<Utc>>,

    #[arg(long, value_parser = parse_timestamp)]
    pub until: Option<DateTime<Utc>>,

    /// Page size; 0 returns every match
    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(Debug, Args)]
pub struct FrequencyArgs {
    #[arg(long)]
    pub collection: String,

    /// Only the last N days; all history when omitted
    #[arg(long)]
    pub days: Option<i64>,

    /// Keep the N highest ranked entries
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[arg(long)]
    pub collection: String,

    /// Older snapshot (defaults to the predecessor of --new)
    #[arg(long)]
    pub old: Option<String>,

    /// Newer snapshot (defaults to the latest)
    #[arg(long)]
    pub new: Option<String>,

    /// Print the Markdown summary instead of JSON
    #[arg(long)]
    pub markdown: bool,
}

#[derive(Debug, Args)]
pub struct SnapshotsArgs {
    #[arg(long)]
    pub collection: String,
}

fn run(global: &GlobalArgs, query: EngineQuery) -> Result<EngineQueryResult, Box<dyn std::error::Error>> {
    let config = global.load_config()?;
    let store = global.open_existing_store()?;
    Ok(apply_engine_query(query, &store, &config)?)
}

pub fn execute_changes(global: &GlobalArgs, args: ChangesArgs) -> CliResult {
    let filter = args
        .scope
        .filter()
        .with_change_types(args.change_types.into_iter().map(ChangeType::from).collect())
        .with_window(args.since, args.until)
        .with_page(args.limit, args.offset);
    let filter = match &args.path {
        Some(fragment) => filter.with_path_contains(fragment),
        None => filter,
    };
    print_json(&run(global, EngineQuery::Changes { filter })?)
}

pub fn execute_hierarchy(global: &GlobalArgs, args: ScopeArgs) -> CliResult {
    let filter = args.filter();
    print_json(&run(global, EngineQuery::Hierarchy { filter })?)
}

pub fn execute_impact(global: &GlobalArgs, args: ScopeArgs) -> CliResult {
    let filter = args.filter();
    print_json(&run(global, EngineQuery::Impact { filter })?)
}

pub fn execute_frequency(global: &GlobalArgs, args: FrequencyArgs) -> CliResult {
    let window = match args.days {
        Some(days) if days > 0 => TimeWindow::last(Duration::days(days), Utc::now()),
        Some(days) => return Err(format!("--days must be positive, got {days}").into()),
        None => TimeWindow::all(),
    };
    let query = EngineQuery::Frequency {
        collection_id: args.collection,
        window,
        top_n: args.top,
    };
    print_json(&run(global, query)?)
}

pub fn execute_compare(global: &GlobalArgs, args: CompareArgs) -> CliResult {
    let query = EngineQuery::Compare {
        collection_id: args.collection,
        old_snapshot_id: args.old,
        new_snapshot_id: args.new,
    };
    let result = run(global, query)?;
    match (&result, args.markdown) {
        (EngineQueryResult::Compare(r), true) => {
            println!("{}", r.human_summary);
            Ok(())
        }
        _ => print_json(&result),
    }
}

pub fn execute_snapshots(global: &GlobalArgs, args: SnapshotsArgs) -> CliResult {
    let query = EngineQuery::SnapshotList {
        collection_id: args.collection,
    };
    print_json(&run(global, query)?)
}
