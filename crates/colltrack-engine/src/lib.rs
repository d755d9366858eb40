//! colltrack engine - orchestration layer
//!
//! Coordinates the pure diff and analytics core with the storage
//! collaborators: tracking new snapshots of a collection and serving the
//! read-only query surface over stored change records.

pub mod commands;
pub mod source;

pub use commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
pub use commands::track::{track_from_source, track_snapshot, TrackOutcome, TrackResult};
pub use source::FsDocumentSource;
