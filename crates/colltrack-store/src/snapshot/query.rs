//! Read-only snapshot query operations.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use colltrack_core::errors::{ExError, TrackError};
use colltrack_core::model::{Snapshot, SnapshotInfo};
use rusqlite::{Connection, OptionalExtension, Row};

const SNAPSHOT_COLUMNS: &str = "snapshot_id, collection_id, snapshot_time, content, content_hash";

fn row_to_snapshot(row: &Row<'_>) -> rusqlite::Result<Snapshot> {
    Ok(Snapshot {
        snapshot_id: row.get(0)?,
        collection_id: row.get(1)?,
        snapshot_time: row.get(2)?,
        content: row.get(3)?,
        content_hash: row.get(4)?,
    })
}

fn read_error(op: &str, e: rusqlite::Error) -> ExError {
    from_rusqlite(e).with_op(op.to_string())
}

fn not_found(op: &str, snapshot_id: &str) -> ExError {
    ExError::from(TrackError::SnapshotNotFound {
        snapshot_id: snapshot_id.to_string(),
    })
    .with_op(op.to_string())
}

/// Fetch a snapshot by id.
///
/// # Errors
///
/// - `NotFound`: no row with `snapshot_id = ?`
/// - `Persistence`: SQLite query failed
pub fn fetch_snapshot(conn: &Connection, snapshot_id: &str) -> Result<Snapshot> {
    conn.query_row(
        &format!("SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE snapshot_id = ?1"),
        [snapshot_id],
        row_to_snapshot,
    )
    .optional()
    .map_err(|e| read_error("fetch_snapshot", e))?
    .ok_or_else(|| not_found("fetch_snapshot", snapshot_id))
}

/// Newest snapshot of a collection, `None` when it has none.
pub fn fetch_latest_snapshot(conn: &Connection, collection_id: &str) -> Result<Option<Snapshot>> {
    conn.query_row(
        &format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
             WHERE collection_id = ?1
             ORDER BY snapshot_time DESC, snapshot_id DESC
             LIMIT 1"
        ),
        [collection_id],
        row_to_snapshot,
    )
    .optional()
    .map_err(|e| read_error("fetch_latest_snapshot", e))
}

/// Chronological predecessor of `snapshot_id` within its collection.
///
/// # Errors
///
/// - `NotFound`: `snapshot_id` is not stored
pub fn fetch_previous_snapshot(
    conn: &Connection,
    collection_id: &str,
    snapshot_id: &str,
) -> Result<Option<Snapshot>> {
    let time: i64 = conn
        .query_row(
            "SELECT snapshot_time FROM snapshots WHERE snapshot_id = ?1 AND collection_id = ?2",
            [snapshot_id, collection_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| read_error("fetch_previous_snapshot", e))?
        .ok_or_else(|| not_found("fetch_previous_snapshot", snapshot_id))?;

    conn.query_row(
        &format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots
             WHERE collection_id = ?1
               AND (snapshot_time < ?2 OR (snapshot_time = ?2 AND snapshot_id < ?3))
             ORDER BY snapshot_time DESC, snapshot_id DESC
             LIMIT 1"
        ),
        rusqlite::params![collection_id, time, snapshot_id],
        row_to_snapshot,
    )
    .optional()
    .map_err(|e| read_error("fetch_previous_snapshot", e))
}

/// Snapshot metadata of a collection, oldest first.
pub fn list_snapshots(conn: &Connection, collection_id: &str) -> Result<Vec<SnapshotInfo>> {
    let mut stmt = conn
        .prepare(
            "SELECT snapshot_id, collection_id, snapshot_time, content_hash, length(content)
             FROM snapshots
             WHERE collection_id = ?1
             ORDER BY snapshot_time, snapshot_id",
        )
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([collection_id], |row| {
            Ok(SnapshotInfo {
                snapshot_id: row.get(0)?,
                collection_id: row.get(1)?,
                snapshot_time: row.get(2)?,
                content_hash: row.get(3)?,
                size_bytes: row.get::<_, i64>(4)? as usize,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}
