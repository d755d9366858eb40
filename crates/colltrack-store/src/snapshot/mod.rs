//! Snapshot persistence layer.
//!
//! Snapshots are immutable rows holding the raw document bytes of one fetch.
//! Per collection they are ordered by `(snapshot_time, snapshot_id)`, and
//! `snapshot_time` is kept strictly increasing by [`persist::create_snapshot`].
//!
//! All functions take a `&Connection`, so they run unchanged inside a
//! transaction or savepoint.

pub mod persist;
pub mod query;

// Re-export primary types
pub use persist::{create_snapshot, insert_snapshot};
pub use query::{
    fetch_latest_snapshot, fetch_previous_snapshot, fetch_snapshot, list_snapshots,
};
