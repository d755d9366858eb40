//! colltrack core - snapshot diffing and change analytics for API collections
//!
//! This crate provides the pure parts of the tracker:
//! - canonical paths, ignore patterns and array item identity
//! - the structural-first tree differ and its change model
//! - read-time enrichment, hierarchy reconstruction and analytics
//! - collaborator contracts (document source, snapshot and change stores)
//! - the error and logging facilities shared by every crate

pub mod analytics;
pub mod collaborators;
pub mod config;
pub mod diff;
pub mod enrich;
pub mod errors;
pub mod hierarchy;
pub mod identity;
pub mod ignore;
pub mod logging_facility;
pub mod model;
pub mod path;

// Used by the logging macros
pub use colltrack_core_types;

// Re-export commonly used types
pub use collaborators::{ChangeFilter, ChangeStore, DocumentSource, SnapshotStore, TrackerStore};
pub use config::TrackerConfig;
pub use diff::{diff, diff_documents, Change, ChangeType, DiffOptions};
pub use errors::{ExError, ExErrorKind, Result, TrackError};
pub use identity::{CollectionItemIdentity, ItemIdentity};
pub use model::{ChangeRecord, Snapshot, SnapshotInfo};
