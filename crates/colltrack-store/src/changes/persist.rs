//! Change record writes.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use colltrack_core::errors::{ExError, ExErrorKind};
use colltrack_core::model::ChangeRecord;
use rusqlite::Connection;

/// Insert records of one comparison run.
///
/// Runs on whatever transaction `conn` is in; callers that need the batch to
/// be atomic open one first.
///
/// ## Errors
///
/// - `ExErrorKind::Persistence`: insert failed, including a second record
///   for the same `(collection, old, new, path)`
pub fn insert_changes(conn: &Connection, records: &[ChangeRecord]) -> Result<usize> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO changes (
                collection_id, old_snapshot_id, new_snapshot_id,
                change_type, path, modification, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(from_rusqlite)?;

    for record in records {
        stmt.execute(rusqlite::params![
            record.collection_id,
            record.old_snapshot_id,
            record.new_snapshot_id,
            record.change_type.as_str(),
            record.path,
            record.modification,
            record.created_at.timestamp_millis(),
        ])
        .map_err(|e| {
            ExError::new(ExErrorKind::Persistence)
                .with_op("insert_changes")
                .with_entity_id(record.path.clone())
                .with_message(e.to_string())
        })?;
    }

    tracing::debug!(count = records.len(), "Stored change records");
    Ok(records.len())
}
