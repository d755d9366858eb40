//! Engine-level read-only query surface.
//!
//! `apply_engine_query` is the single entry point for queries that span the
//! stores and the analytics core. It takes the store by shared reference and
//! never writes.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use serde::Serialize;

use colltrack_core::analytics::{
    analyze_frequency, analyze_impact, summarize, FrequencyReport, ImpactReport, TimeWindow,
};
use colltrack_core::collaborators::{ChangeFilter, ChangeStore, SnapshotStore};
use colltrack_core::config::TrackerConfig;
use colltrack_core::diff::{decode_document, diff_with, render_human_summary};
use colltrack_core::enrich::enrich_all;
use colltrack_core::errors::{ExError, ExErrorKind, Result, TrackError};
use colltrack_core::hierarchy::{build_hierarchy_with, ChangeNode};
use colltrack_core::identity::ItemIdentity;
use colltrack_core::model::{ChangeRecord, Snapshot, SnapshotInfo};
use colltrack_core::{log_op_end, log_op_error, log_op_start};

use crate::commands::read_tools::{ChangePage, CompareResult, CompareSource};
use crate::commands::run_timestamp;

// ---------------------------------------------------------------------------
// EngineQuery
// ---------------------------------------------------------------------------

/// Read-only queries supported by the engine.
#[derive(Debug, Clone)]
pub enum EngineQuery {
    /// Enriched change records, paged by the filter's `limit`/`offset`.
    Changes { filter: ChangeFilter },
    /// Folder/change tree over every record matching the filter (paging ignored).
    Hierarchy { filter: ChangeFilter },
    /// Impact classification of every record matching the filter (paging ignored).
    Impact { filter: ChangeFilter },
    /// Hot paths and volatile endpoints of a collection within a window.
    Frequency {
        collection_id: String,
        window: TimeWindow,
        top_n: Option<usize>,
    },
    /// Summary of one snapshot pair.
    ///
    /// `new_snapshot_id = None` selects the collection's latest snapshot;
    /// `old_snapshot_id = None` selects the chronological predecessor of the
    /// new one.
    Compare {
        collection_id: String,
        old_snapshot_id: Option<String>,
        new_snapshot_id: Option<String>,
    },
    /// Snapshot metadata of a collection, oldest first.
    SnapshotList { collection_id: String },
}

impl EngineQuery {
    fn op(&self) -> &'static str {
        match self {
            EngineQuery::Changes { .. } => "query_changes",
            EngineQuery::Hierarchy { .. } => "query_hierarchy",
            EngineQuery::Impact { .. } => "query_impact",
            EngineQuery::Frequency { .. } => "query_frequency",
            EngineQuery::Compare { .. } => "query_compare",
            EngineQuery::SnapshotList { .. } => "query_snapshot_list",
        }
    }
}

// ---------------------------------------------------------------------------
// EngineQueryResult
// ---------------------------------------------------------------------------

/// All possible results from `apply_engine_query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EngineQueryResult {
    Changes(ChangePage),
    Hierarchy(ChangeNode),
    Impact(ImpactReport),
    Frequency(FrequencyReport),
    Compare(Box<CompareResult>),
    SnapshotList(Vec<SnapshotInfo>),
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Every record matching `filter`, ignoring its paging.
fn all_matching<S>(store: &S, filter: &ChangeFilter) -> Result<Vec<ChangeRecord>>
where
    S: ChangeStore + ?Sized,
{
    let unpaged = filter.clone().with_page(0, 0);
    let (records, _) = store.query_changes(&unpaged)?;
    Ok(records)
}

/// Load a snapshot and check it belongs to `collection_id`.
fn snapshot_of<S>(store: &S, collection_id: &str, snapshot_id: &str) -> Result<Snapshot>
where
    S: SnapshotStore + ?Sized,
{
    let snapshot = store.get_snapshot(snapshot_id)?;
    if snapshot.collection_id != collection_id {
        return Err(ExError::from(TrackError::SnapshotNotFound {
            snapshot_id: snapshot_id.to_string(),
        })
        .with_op("query_compare")
        .with_message(format!(
            "Snapshot {} does not belong to collection {}",
            snapshot_id, collection_id
        )));
    }
    Ok(snapshot)
}

fn compare<S>(
    store: &S,
    config: &TrackerConfig,
    identity: &dyn ItemIdentity,
    collection_id: &str,
    old_snapshot_id: Option<&str>,
    new_snapshot_id: Option<&str>,
) -> Result<CompareResult>
where
    S: SnapshotStore + ChangeStore + ?Sized,
{
    let new = match new_snapshot_id {
        Some(id) => snapshot_of(store, collection_id, id)?,
        None => store.latest_snapshot(collection_id)?.ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op("query_compare")
                .with_entity_id(collection_id)
                .with_message("collection has no snapshots")
        })?,
    };
    let predecessor = store.get_previous_snapshot(collection_id, &new.snapshot_id)?;

    let old = match old_snapshot_id {
        Some(id) => Some(snapshot_of(store, collection_id, id)?),
        None => predecessor.clone(),
    };
    let old_id = old.as_ref().map(|s| s.snapshot_id.as_str());
    let consecutive = old_id == predecessor.as_ref().map(|s| s.snapshot_id.as_str());

    let (records, source) = if consecutive {
        let filter = ChangeFilter::for_collection(collection_id).with_snapshot(&new.snapshot_id);
        let records: Vec<ChangeRecord> = all_matching(store, &filter)?
            .into_iter()
            .filter(|r| r.old_snapshot_id.as_deref() == old_id && r.new_snapshot_id == new.snapshot_id)
            .collect();
        (records, CompareSource::Stored)
    } else {
        let old_doc = match &old {
            Some(s) => decode_document("old", &s.content)?,
            None => serde_json::Value::Null,
        };
        let new_doc = decode_document("new", &new.content)?;
        let created_at = run_timestamp();
        let records = diff_with(&old_doc, &new_doc, &config.diff, identity)
            .into_iter()
            .map(|c| ChangeRecord::from_change(collection_id, old_id, &new.snapshot_id, c, created_at))
            .collect();
        (records, CompareSource::Computed)
    };

    let summary = summarize(collection_id, old_id, &new.snapshot_id, &records);
    let impact = analyze_impact(&records, identity);
    let human_summary = render_human_summary(&summary, Some(&impact));

    Ok(CompareResult {
        summary,
        impact,
        source,
        human_summary,
    })
}

// ---------------------------------------------------------------------------
// apply_engine_query
// ---------------------------------------------------------------------------

/// Apply a read-only engine query.
///
/// # Errors
///
/// Store errors propagate unchanged; `Compare` additionally returns
/// `NotFound` for unknown snapshots or an empty collection.
pub fn apply_engine_query<S>(
    query: EngineQuery,
    store: &S,
    config: &TrackerConfig,
) -> Result<EngineQueryResult>
where
    S: SnapshotStore + ChangeStore + ?Sized,
{
    let op = query.op();
    log_op_start!(op);
    let start = Instant::now();

    let identity = config.identity();

    let result = (|| -> Result<EngineQueryResult> {
        match query {
            EngineQuery::Changes { filter } => {
                let (records, total) = store.query_changes(&filter)?;
                let items = enrich_all(&records, &identity);
                Ok(EngineQueryResult::Changes(ChangePage::new(
                    items,
                    total,
                    filter.limit,
                    filter.offset,
                )))
            }

            EngineQuery::Hierarchy { filter } => {
                let records = all_matching(store, &filter)?;
                Ok(EngineQueryResult::Hierarchy(build_hierarchy_with(
                    &records, &identity,
                )))
            }

            EngineQuery::Impact { filter } => {
                let records = all_matching(store, &filter)?;
                Ok(EngineQueryResult::Impact(analyze_impact(&records, &identity)))
            }

            EngineQuery::Frequency {
                collection_id,
                window,
                top_n,
            } => {
                let filter = ChangeFilter::for_collection(&collection_id)
                    .with_window(window.since, window.until);
                let records = all_matching(store, &filter)?;
                Ok(EngineQueryResult::Frequency(analyze_frequency(
                    &records, window, top_n, &identity,
                )))
            }

            EngineQuery::Compare {
                collection_id,
                old_snapshot_id,
                new_snapshot_id,
            } => compare(
                store,
                config,
                &identity,
                &collection_id,
                old_snapshot_id.as_deref(),
                new_snapshot_id.as_deref(),
            )
            .map(|r| EngineQueryResult::Compare(Box::new(r))),

            EngineQuery::SnapshotList { collection_id } => Ok(EngineQueryResult::SnapshotList(
                store.list_snapshots(&collection_id)?,
            )),
        }
    })();

    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => log_op_end!(op, duration_ms = elapsed),
        Err(e) => {
            let e_clone = e.clone();
            log_op_error!(op, e_clone, duration_ms = elapsed);
        }
    }
    result
}
