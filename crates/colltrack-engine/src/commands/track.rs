//! Snapshot tracking orchestration.
//!
//! ## Pipeline (in order):
//! 1. Validate the collection id and decode the new document (no writes on failure)
//! 2. Unchanged short-circuit when `tracking.skip_unchanged` is set
//! 3. Inside one store unit of work:
//!    store the snapshot, load its chronological predecessor, diff, persist
//!    the change records
//!
//! The first snapshot of a collection has no predecessor and yields no changes.

#![allow(clippy::result_large_err)]

use serde::Serialize;
use std::time::Instant;

use colltrack_core::collaborators::{DocumentSource, TrackerStore};
use colltrack_core::colltrack_core_types::RunId;
use colltrack_core::config::TrackerConfig;
use colltrack_core::diff::{decode_document, diff_with};
use colltrack_core::errors::{ExError, ExErrorKind, Result};
use colltrack_core::model::{content_hash, ChangeRecord, SnapshotInfo};
use colltrack_core::{log_op_end, log_op_error, log_op_start};

use crate::commands::run_timestamp;

/// A snapshot that was stored by a tracking run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackResult {
    pub collection_id: String,
    pub snapshot: SnapshotInfo,
    pub previous_snapshot_id: Option<String>,
    pub change_count: usize,
}

/// Outcome of [`track_snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrackOutcome {
    /// First snapshot of the collection; nothing to compare against.
    First(TrackResult),
    /// Snapshot stored and compared with its predecessor.
    Tracked(TrackResult),
    /// Content hash equals the latest snapshot's; nothing was stored.
    Unchanged {
        collection_id: String,
        latest_snapshot_id: String,
    },
}

impl TrackOutcome {
    pub fn change_count(&self) -> usize {
        match self {
            TrackOutcome::First(r) | TrackOutcome::Tracked(r) => r.change_count,
            TrackOutcome::Unchanged { .. } => 0,
        }
    }

    /// Id of the snapshot this run stored, if any.
    pub fn stored_snapshot_id(&self) -> Option<&str> {
        match self {
            TrackOutcome::First(r) | TrackOutcome::Tracked(r) => Some(&r.snapshot.snapshot_id),
            TrackOutcome::Unchanged { .. } => None,
        }
    }
}

/// Store `content` as the newest snapshot of `collection_id` and record its
/// differences from the previous snapshot.
///
/// # Errors
///
/// - `InvalidInput`: empty collection id
/// - `Decode`: `content` (or the stored predecessor) is not a JSON document
/// - `Persistence`: the store failed; neither the snapshot nor any change is kept
pub fn track_snapshot<S: TrackerStore>(
    store: &mut S,
    collection_id: &str,
    content: &[u8],
    config: &TrackerConfig,
) -> Result<TrackOutcome> {
    let run_id = RunId::new();
    log_op_start!(
        "track_snapshot",
        collection_id = collection_id,
        run_id = %run_id
    );
    let start = Instant::now();

    let result = track_inner(store, collection_id, content, config);

    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(outcome) => log_op_end!(
            "track_snapshot",
            duration_ms = elapsed,
            run_id = %run_id,
            change_count = outcome.change_count()
        ),
        Err(e) => {
            let e_clone = e.clone();
            log_op_error!("track_snapshot", e_clone, duration_ms = elapsed, run_id = %run_id);
        }
    }
    result
}

fn track_inner<S: TrackerStore>(
    store: &mut S,
    collection_id: &str,
    content: &[u8],
    config: &TrackerConfig,
) -> Result<TrackOutcome> {
    if collection_id.trim().is_empty() {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("track_snapshot")
            .with_message("collection id must not be empty"));
    }

    let new_doc = decode_document("new", content)?;

    if config.tracking.skip_unchanged {
        if let Some(latest) = store.latest_snapshot(collection_id)? {
            if latest.content_hash == content_hash(content) {
                tracing::debug!(
                    collection_id,
                    snapshot_id = %latest.snapshot_id,
                    "Content unchanged; snapshot skipped"
                );
                return Ok(TrackOutcome::Unchanged {
                    collection_id: collection_id.to_string(),
                    latest_snapshot_id: latest.snapshot_id,
                });
            }
        }
    }

    let identity = config.identity();

    store.atomically(|s| {
        let snapshot = s.create_snapshot(collection_id, content)?;

        let Some(previous) = s.get_previous_snapshot(collection_id, &snapshot.snapshot_id)? else {
            return Ok(TrackOutcome::First(TrackResult {
                collection_id: collection_id.to_string(),
                snapshot: snapshot.info(),
                previous_snapshot_id: None,
                change_count: 0,
            }));
        };

        let old_doc = decode_document("old", &previous.content)?;
        let changes = diff_with(&old_doc, &new_doc, &config.diff, &identity);

        let created_at = run_timestamp();
        let records: Vec<ChangeRecord> = changes
            .into_iter()
            .map(|change| {
                ChangeRecord::from_change(
                    collection_id,
                    Some(&previous.snapshot_id),
                    &snapshot.snapshot_id,
                    change,
                    created_at,
                )
            })
            .collect();

        let change_count = s.insert_changes(
            collection_id,
            Some(&previous.snapshot_id),
            &snapshot.snapshot_id,
            &records,
        )?;

        Ok(TrackOutcome::Tracked(TrackResult {
            collection_id: collection_id.to_string(),
            snapshot: snapshot.info(),
            previous_snapshot_id: Some(previous.snapshot_id),
            change_count,
        }))
    })
}

/// Fetch `external_id` from `source` and track it under `collection_id`.
///
/// # Errors
///
/// `Io` when the source cannot deliver the document, otherwise as
/// [`track_snapshot`].
pub fn track_from_source<S, D>(
    store: &mut S,
    source: &D,
    external_id: &str,
    collection_id: &str,
    config: &TrackerConfig,
) -> Result<TrackOutcome>
where
    S: TrackerStore,
    D: DocumentSource + ?Sized,
{
    let content = source.fetch(external_id).map_err(|e| {
        tracing::warn!(external_id, error = %e, "Document fetch failed");
        e
    })?;
    tracing::debug!(external_id, size_bytes = content.len(), "Fetched document");
    track_snapshot(store, collection_id, &content, config)
}
