//! Contracts for the system's external collaborators.
//!
//! The diff core never talks to storage or the network itself; the engine
//! wires these traits to concrete implementations (SQLite in
//! `colltrack-store`, the file system for the CLI).

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::model::ChangeType;
use crate::errors::Result;
use crate::model::{ChangeRecord, Snapshot, SnapshotInfo};

/// Delivers the raw bytes of a collection document.
pub trait DocumentSource {
    /// # Errors
    ///
    /// `Io` when the document cannot be fetched.
    fn fetch(&self, external_id: &str) -> Result<Vec<u8>>;
}

/// Immutable snapshot storage.
pub trait SnapshotStore {
    /// Store `content` as the newest snapshot of `collection_id`.
    ///
    /// The snapshot time never precedes the collection's latest snapshot.
    fn create_snapshot(&mut self, collection_id: &str, content: &[u8]) -> Result<Snapshot>;

    /// Newest snapshot of the collection.
    fn latest_snapshot(&self, collection_id: &str) -> Result<Option<Snapshot>>;

    /// Chronological predecessor of the stored snapshot `excluding_id`.
    fn get_previous_snapshot(
        &self,
        collection_id: &str,
        excluding_id: &str,
    ) -> Result<Option<Snapshot>>;

    /// # Errors
    ///
    /// `NotFound` when no snapshot has this id.
    fn get_snapshot(&self, snapshot_id: &str) -> Result<Snapshot>;

    /// All snapshots of a collection ordered by `(snapshot_time, snapshot_id)`.
    fn list_snapshots(&self, collection_id: &str) -> Result<Vec<SnapshotInfo>>;
}

/// Change record storage.
pub trait ChangeStore {
    /// Insert all records of one comparison run. Either every record is
    /// stored or none is.
    fn insert_changes(
        &mut self,
        collection_id: &str,
        old_snapshot_id: Option<&str>,
        new_snapshot_id: &str,
        records: &[ChangeRecord],
    ) -> Result<usize>;

    /// Matching records (paged) and the total match count before paging.
    fn query_changes(&self, filter: &ChangeFilter) -> Result<(Vec<ChangeRecord>, usize)>;
}

/// Storage that can group snapshot and change writes into one unit.
pub trait TrackerStore: SnapshotStore + ChangeStore {
    /// Run `f` so that every write it makes through the store commits
    /// together or not at all. An error from `f` rolls back.
    fn atomically<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>;
}

/// Selection criteria for [`ChangeStore::query_changes`].
///
/// Unset fields do not constrain the result. `limit = 0` means no limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeFilter {
    pub collection_id: Option<String>,
    /// Matches records whose old or new snapshot is this id
    pub snapshot_id: Option<String>,
    pub change_types: Vec<ChangeType>,
    /// Substring of the record path
    pub path_contains: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: usize,
    pub offset: usize,
}

impl ChangeFilter {
    pub fn for_collection(collection_id: &str) -> Self {
        Self {
            collection_id: Some(collection_id.to_string()),
            ..Self::default()
        }
    }

    pub fn with_snapshot(mut self, snapshot_id: &str) -> Self {
        self.snapshot_id = Some(snapshot_id.to_string());
        self
    }

    pub fn with_change_types(mut self, change_types: Vec<ChangeType>) -> Self {
        self.change_types = change_types;
        self
    }

    pub fn with_path_contains(mut self, fragment: &str) -> Self {
        self.path_contains = Some(fragment.to_string());
        self
    }

    pub fn with_window(mut self, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Self {
        self.since = since;
        self.until = until;
        self
    }

    pub fn with_page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// In-memory evaluation of the filter, ignoring paging.
    pub fn matches(&self, record: &ChangeRecord) -> bool {
        self.collection_id
            .as_deref()
            .map_or(true, |c| record.collection_id == c)
            && self.snapshot_id.as_deref().map_or(true, |s| {
                record.new_snapshot_id == s || record.old_snapshot_id.as_deref() == Some(s)
            })
            && (self.change_types.is_empty() || self.change_types.contains(&record.change_type))
            && self
                .path_contains
                .as_deref()
                .map_or(true, |p| record.path.contains(p))
            && self.since.map_or(true, |s| record.created_at >= s)
            && self.until.map_or(true, |u| record.created_at < u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::Change;

    fn record(old: Option<&str>, new: &str, path: &str) -> ChangeRecord {
        ChangeRecord::from_change(
            "col",
            old,
            new,
            Change {
                change_type: ChangeType::Modified,
                path: path.to_string(),
                modification: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_default_filter_matches_everything() {
        assert!(ChangeFilter::default().matches(&record(None, "s1", "a")));
    }

    #[test]
    fn test_snapshot_matches_either_side() {
        let f = ChangeFilter::for_collection("col").with_snapshot("s2");
        assert!(f.matches(&record(Some("s1"), "s2", "a")));
        assert!(f.matches(&record(Some("s2"), "s3", "a")));
        assert!(!f.matches(&record(Some("s3"), "s4", "a")));
    }

    #[test]
    fn test_type_and_path_constraints() {
        let f = ChangeFilter::default()
            .with_change_types(vec![ChangeType::Added])
            .with_path_contains("header");
        assert!(!f.matches(&record(None, "s1", "item[0].request.header[0]")));
        let f = ChangeFilter::default().with_path_contains("header");
        assert!(f.matches(&record(None, "s1", "item[0].request.header[0]")));
        assert!(!ChangeFilter::for_collection("other").matches(&record(None, "s1", "a")));
    }
}
