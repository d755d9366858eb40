//! colltrack store - SQLite persistence for snapshots and change records
//!
//! Provides:
//! - SQLite schema with an embedded, checksummed migrations framework
//! - Snapshot persistence and chronological queries
//! - Change record persistence and filtered, paged queries
//! - `SqliteTrackerStore`, the collaborator implementation used by the engine

pub mod changes;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod snapshot;
pub mod tracker;

// Re-export key types
pub use errors::Result;
pub use tracker::SqliteTrackerStore;
