//! SQLite-backed implementation of the tracker's storage collaborators.

#![allow(clippy::result_large_err)]

use crate::changes;
use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use crate::snapshot;
use colltrack_core::collaborators::{ChangeFilter, ChangeStore, SnapshotStore, TrackerStore};
use colltrack_core::errors::{ExError, ExErrorKind};
use colltrack_core::model::{ChangeRecord, Snapshot, SnapshotInfo};
use rusqlite::Connection;
use std::path::Path;

const TRACK_SAVEPOINT: &str = "colltrack_track";

/// Snapshot and change storage in one SQLite database.
pub struct SqliteTrackerStore {
    conn: Connection,
}

impl SqliteTrackerStore {
    /// Open (creating if needed) and migrate the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            conn: db::open_and_migrate(path)?,
        })
    }

    /// Fresh migrated in-memory database.
    pub fn in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(from_rusqlite)?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// Wrap an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl SnapshotStore for SqliteTrackerStore {
    fn create_snapshot(&mut self, collection_id: &str, content: &[u8]) -> Result<Snapshot> {
        snapshot::create_snapshot(&self.conn, collection_id, content)
    }

    fn latest_snapshot(&self, collection_id: &str) -> Result<Option<Snapshot>> {
        snapshot::fetch_latest_snapshot(&self.conn, collection_id)
    }

    fn get_previous_snapshot(
        &self,
        collection_id: &str,
        excluding_id: &str,
    ) -> Result<Option<Snapshot>> {
        snapshot::fetch_previous_snapshot(&self.conn, collection_id, excluding_id)
    }

    fn get_snapshot(&self, snapshot_id: &str) -> Result<Snapshot> {
        snapshot::fetch_snapshot(&self.conn, snapshot_id)
    }

    fn list_snapshots(&self, collection_id: &str) -> Result<Vec<SnapshotInfo>> {
        snapshot::list_snapshots(&self.conn, collection_id)
    }
}

impl ChangeStore for SqliteTrackerStore {
    /// # Errors
    ///
    /// - `InvalidInput`: a record belongs to another collection or snapshot pair
    /// - `Persistence`: an insert failed; nothing from the batch is kept
    fn insert_changes(
        &mut self,
        collection_id: &str,
        old_snapshot_id: Option<&str>,
        new_snapshot_id: &str,
        records: &[ChangeRecord],
    ) -> Result<usize> {
        if let Some(stray) = records.iter().find(|r| {
            r.collection_id != collection_id
                || r.old_snapshot_id.as_deref() != old_snapshot_id
                || r.new_snapshot_id != new_snapshot_id
        }) {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("insert_changes")
                .with_entity_id(stray.path.clone())
                .with_message(format!(
                    "record does not belong to run {} -> {} of collection {}",
                    old_snapshot_id.unwrap_or("(none)"),
                    new_snapshot_id,
                    collection_id
                )));
        }

        let sp = self.conn.savepoint().map_err(from_rusqlite)?;
        let inserted = changes::insert_changes(&sp, records)?;
        sp.commit().map_err(from_rusqlite)?;
        Ok(inserted)
    }

    fn query_changes(&self, filter: &ChangeFilter) -> Result<(Vec<ChangeRecord>, usize)> {
        changes::query_changes(&self.conn, filter)
    }
}

impl TrackerStore for SqliteTrackerStore {
    fn atomically<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.conn
            .execute_batch(&format!("SAVEPOINT {TRACK_SAVEPOINT}"))
            .map_err(from_rusqlite)?;

        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch(&format!("RELEASE {TRACK_SAVEPOINT}"))
                    .map_err(from_rusqlite)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch(&format!(
                    "ROLLBACK TO {TRACK_SAVEPOINT}; RELEASE {TRACK_SAVEPOINT}"
                )) {
                    tracing::warn!(error = %rollback, "Rollback of tracking unit failed");
                }
                Err(err)
            }
        }
    }
}
