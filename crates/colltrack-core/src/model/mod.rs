pub mod change_record;
pub mod snapshot;

pub use change_record::ChangeRecord;
pub use snapshot::{content_hash, Snapshot, SnapshotInfo};
