//! Snapshot persistence operations.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::snapshot::query::fetch_latest_snapshot;
use colltrack_core::errors::{ExError, ExErrorKind};
use colltrack_core::model::Snapshot;
use rusqlite::Connection;

/// Insert a fully built snapshot row.
///
/// ## Errors
///
/// - `ExErrorKind::Persistence`: insert failed (including a duplicate id)
pub fn insert_snapshot(conn: &Connection, snapshot: &Snapshot) -> Result<()> {
    conn.execute(
        "INSERT INTO snapshots (snapshot_id, collection_id, snapshot_time, content, content_hash)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            snapshot.snapshot_id,
            snapshot.collection_id,
            snapshot.snapshot_time,
            snapshot.content,
            snapshot.content_hash,
        ],
    )
    .map_err(|e| {
        ExError::new(ExErrorKind::Persistence)
            .with_op("insert_snapshot")
            .with_entity_id(snapshot.snapshot_id.clone())
            .with_message(e.to_string())
    })?;

    tracing::debug!(
        snapshot_id = %snapshot.snapshot_id,
        collection_id = %snapshot.collection_id,
        size_bytes = snapshot.content.len(),
        "Stored snapshot"
    );
    Ok(())
}

/// Store `content` as the newest snapshot of `collection_id`.
///
/// The snapshot time is the current time, bumped past the latest stored
/// snapshot of the collection when the clock has not advanced.
pub fn create_snapshot(conn: &Connection, collection_id: &str, content: &[u8]) -> Result<Snapshot> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let snapshot_time = match fetch_latest_snapshot(conn, collection_id)? {
        Some(latest) if latest.snapshot_time >= now_ms => latest.snapshot_time + 1,
        _ => now_ms,
    };

    let snapshot = Snapshot::new(collection_id, content.to_vec(), snapshot_time);
    insert_snapshot(conn, &snapshot)?;
    Ok(snapshot)
}
