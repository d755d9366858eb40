// Change record persistence and filtered queries

use chrono::{Duration, TimeZone, Utc};
use colltrack_core::collaborators::{ChangeFilter, ChangeStore, SnapshotStore};
use colltrack_core::diff::model::{Change, ChangeType};
use colltrack_core::model::ChangeRecord;
use colltrack_store::SqliteTrackerStore;

fn record(
    old: Option<&str>,
    new: &str,
    change_type: ChangeType,
    path: &str,
    created_at_ms: i64,
) -> ChangeRecord {
    ChangeRecord::from_change(
        "col",
        old,
        new,
        Change {
            change_type,
            path: path.to_string(),
            modification: Some("\"v\"".to_string()),
        },
        Utc.timestamp_millis_opt(created_at_ms).unwrap(),
    )
}

/// Store with three snapshots and two runs of records.
fn seeded() -> (SqliteTrackerStore, Vec<String>) {
    let mut store = SqliteTrackerStore::in_memory().unwrap();
    let ids: Vec<String> = (0..3)
        .map(|_| store.create_snapshot("col", b"{}").unwrap().snapshot_id)
        .collect();

    let run1 = vec![
        record(Some(&ids[0]), &ids[1], ChangeType::Added, "item[0]", 1_000),
        record(Some(&ids[0]), &ids[1], ChangeType::Modified, "info.name", 1_000),
    ];
    store
        .insert_changes("col", Some(&ids[0]), &ids[1], &run1)
        .unwrap();

    let run2 = vec![
        record(Some(&ids[1]), &ids[2], ChangeType::Deleted, "item[0].request.header[0]", 2_000),
        record(Some(&ids[1]), &ids[2], ChangeType::Modified, "item[1].request.url", 2_000),
        record(Some(&ids[1]), &ids[2], ChangeType::Added, "item[1].request.header[0]", 2_000),
    ];
    store
        .insert_changes("col", Some(&ids[1]), &ids[2], &run2)
        .unwrap();

    (store, ids)
}

#[test]
fn test_insert_reports_count_and_round_trips() {
    let (store, ids) = seeded();
    let (rows, total) = store
        .query_changes(&ChangeFilter::for_collection("col"))
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].path, "item[0]");
    assert_eq!(rows[0].old_snapshot_id.as_deref(), Some(ids[0].as_str()));
    assert_eq!(rows[0].modification.as_deref(), Some("\"v\""));
    assert_eq!(rows[0].created_at.timestamp_millis(), 1_000);
}

#[test]
fn test_results_keep_insertion_order_within_run() {
    let (store, _) = seeded();
    let (rows, _) = store.query_changes(&ChangeFilter::default()).unwrap();
    let paths: Vec<&str> = rows.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "item[0]",
            "info.name",
            "item[0].request.header[0]",
            "item[1].request.url",
            "item[1].request.header[0]",
        ]
    );
}

#[test]
fn test_snapshot_filter_matches_both_sides() {
    let (store, ids) = seeded();
    let (_, total) = store
        .query_changes(&ChangeFilter::for_collection("col").with_snapshot(&ids[1]))
        .unwrap();
    assert_eq!(total, 5);
    let (_, total) = store
        .query_changes(&ChangeFilter::for_collection("col").with_snapshot(&ids[2]))
        .unwrap();
    assert_eq!(total, 3);
}

#[test]
fn test_type_and_path_filters_combine() {
    let (store, _) = seeded();
    let filter = ChangeFilter::for_collection("col")
        .with_change_types(vec![ChangeType::Added, ChangeType::Deleted])
        .with_path_contains("header");
    let (rows, total) = store.query_changes(&filter).unwrap();
    assert_eq!(total, 2);
    assert!(rows.iter().all(|r| r.path.contains("header")));
}

#[test]
fn test_path_filter_treats_wildcards_literally() {
    let (store, _) = seeded();
    let (_, total) = store
        .query_changes(&ChangeFilter::default().with_path_contains("item[_]"))
        .unwrap();
    assert_eq!(total, 0);
    let (_, total) = store
        .query_changes(&ChangeFilter::default().with_path_contains("%"))
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn test_time_window_is_half_open() {
    let (store, _) = seeded();
    let at = |ms| Some(Utc.timestamp_millis_opt(ms).unwrap());
    let (_, total) = store
        .query_changes(&ChangeFilter::default().with_window(at(1_000), at(2_000)))
        .unwrap();
    assert_eq!(total, 2);
    let (_, total) = store
        .query_changes(&ChangeFilter::default().with_window(at(2_000), None))
        .unwrap();
    assert_eq!(total, 3);
}

#[test]
fn test_paging_keeps_total() {
    let (store, _) = seeded();
    let (rows, total) = store
        .query_changes(&ChangeFilter::default().with_page(2, 1))
        .unwrap();
    assert_eq!(total, 5);
    let paths: Vec<&str> = rows.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["info.name", "item[0].request.header[0]"]);

    let (rows, total) = store
        .query_changes(&ChangeFilter::default().with_page(0, 4))
        .unwrap();
    assert_eq!((rows.len(), total), (1, 5));
}

#[test]
fn test_first_run_records_have_no_old_snapshot() {
    let mut store = SqliteTrackerStore::in_memory().unwrap();
    let s1 = store.create_snapshot("col", b"{}").unwrap().snapshot_id;
    let created = Utc::now() - Duration::seconds(1);
    let rec = ChangeRecord::from_change(
        "col",
        None,
        &s1,
        Change {
            change_type: ChangeType::Added,
            path: "info".to_string(),
            modification: Some("{}".to_string()),
        },
        created,
    );
    assert_eq!(store.insert_changes("col", None, &s1, &[rec.clone()]).unwrap(), 1);
    // the same path again in the same run violates one-record-per-path
    assert!(store.insert_changes("col", None, &s1, &[rec]).is_err());

    let (rows, _) = store.query_changes(&ChangeFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].old_snapshot_id.is_none());
}

#[test]
fn test_empty_batch_is_accepted() {
    let mut store = SqliteTrackerStore::in_memory().unwrap();
    let s1 = store.create_snapshot("col", b"{}").unwrap().snapshot_id;
    assert_eq!(store.insert_changes("col", None, &s1, &[]).unwrap(), 0);
}
