//! Stored document snapshots.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An immutable raw snapshot of one collection document.
///
/// Snapshots of a collection are ordered by `(snapshot_time, snapshot_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// UUIDv7
    pub snapshot_id: String,
    pub collection_id: String,
    /// Milliseconds since epoch
    pub snapshot_time: i64,
    #[serde(skip)]
    pub content: Vec<u8>,
    /// SHA-256 hex of `content`
    pub content_hash: String,
}

impl Snapshot {
    /// Build a new snapshot with a fresh UUIDv7 id.
    pub fn new(collection_id: &str, content: Vec<u8>, snapshot_time: i64) -> Self {
        Self {
            snapshot_id: uuid::Uuid::now_v7().to_string(),
            collection_id: collection_id.to_string(),
            snapshot_time,
            content_hash: content_hash(&content),
            content,
        }
    }

    pub fn info(&self) -> SnapshotInfo {
        SnapshotInfo {
            snapshot_id: self.snapshot_id.clone(),
            collection_id: self.collection_id.clone(),
            snapshot_time: self.snapshot_time,
            content_hash: self.content_hash.clone(),
            size_bytes: self.content.len(),
        }
    }
}

/// Snapshot metadata without content, used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub snapshot_id: String,
    pub collection_id: String,
    pub snapshot_time: i64,
    pub content_hash: String,
    pub size_bytes: usize,
}

/// SHA-256 of raw snapshot bytes, lowercase hex.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
