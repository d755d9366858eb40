// Snapshot persistence: creation, chronology and lookups

use colltrack_core::collaborators::SnapshotStore;
use colltrack_core::errors::ExErrorKind;
use colltrack_core::model::{content_hash, Snapshot};
use colltrack_store::snapshot::insert_snapshot;
use colltrack_store::SqliteTrackerStore;
use tempfile::TempDir;

fn store() -> SqliteTrackerStore {
    SqliteTrackerStore::in_memory().unwrap()
}

#[test]
fn test_create_and_get_round_trips_content() {
    let mut store = store();
    let content = br#"{"info":{"name":"API"}}"#;
    let snap = store.create_snapshot("col", content).unwrap();

    let loaded = store.get_snapshot(&snap.snapshot_id).unwrap();
    assert_eq!(loaded.content, content.to_vec());
    assert_eq!(loaded.content_hash, content_hash(content));
    assert_eq!(loaded.collection_id, "col");
}

#[test]
fn test_snapshot_times_strictly_increase() {
    let mut store = store();
    let a = store.create_snapshot("col", b"{}").unwrap();
    let b = store.create_snapshot("col", b"{}").unwrap();
    let c = store.create_snapshot("col", b"{}").unwrap();
    assert!(a.snapshot_time < b.snapshot_time);
    assert!(b.snapshot_time < c.snapshot_time);
}

#[test]
fn test_latest_and_previous_follow_time_order() {
    let mut store = store();
    assert!(store.latest_snapshot("col").unwrap().is_none());

    let a = store.create_snapshot("col", b"{\"v\":1}").unwrap();
    let b = store.create_snapshot("col", b"{\"v\":2}").unwrap();
    store.create_snapshot("other", b"{}").unwrap();

    let latest = store.latest_snapshot("col").unwrap().unwrap();
    assert_eq!(latest.snapshot_id, b.snapshot_id);

    let prev = store
        .get_previous_snapshot("col", &b.snapshot_id)
        .unwrap()
        .unwrap();
    assert_eq!(prev.snapshot_id, a.snapshot_id);
    assert!(store
        .get_previous_snapshot("col", &a.snapshot_id)
        .unwrap()
        .is_none());
}

#[test]
fn test_equal_times_are_ordered_by_id() {
    let mut store = store();
    let first = Snapshot {
        snapshot_id: "a-snap".to_string(),
        collection_id: "col".to_string(),
        snapshot_time: 1_000,
        content: b"{}".to_vec(),
        content_hash: content_hash(b"{}"),
    };
    let second = Snapshot {
        snapshot_id: "b-snap".to_string(),
        ..first.clone()
    };
    insert_snapshot(store.conn(), &second).unwrap();
    insert_snapshot(store.conn(), &first).unwrap();

    let latest = store.latest_snapshot("col").unwrap().unwrap();
    assert_eq!(latest.snapshot_id, "b-snap");
    let prev = store.get_previous_snapshot("col", "b-snap").unwrap().unwrap();
    assert_eq!(prev.snapshot_id, "a-snap");

    // a later create must still land after both
    let next = store.create_snapshot("col", b"{}").unwrap();
    assert!(next.snapshot_time > 1_000);
}

#[test]
fn test_missing_snapshot_is_not_found() {
    let store = store();
    let err = store.get_snapshot("nope").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);

    let err = store.get_previous_snapshot("col", "nope").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_list_snapshots_reports_sizes_in_order() {
    let mut store = store();
    let a = store.create_snapshot("col", b"{}").unwrap();
    let b = store.create_snapshot("col", b"{\"a\":1}").unwrap();

    let list = store.list_snapshots("col").unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].snapshot_id, a.snapshot_id);
    assert_eq!(list[1].snapshot_id, b.snapshot_id);
    assert_eq!(list[1].size_bytes, 7);
    assert!(store.list_snapshots("other").unwrap().is_empty());
}

#[test]
fn test_file_backed_store_persists_across_opens() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("track.db");
    let id = {
        let mut store = SqliteTrackerStore::open(&path).unwrap();
        store.create_snapshot("col", b"{}").unwrap().snapshot_id
    };
    let store = SqliteTrackerStore::open(&path).unwrap();
    assert_eq!(store.latest_snapshot("col").unwrap().unwrap().snapshot_id, id);
}
