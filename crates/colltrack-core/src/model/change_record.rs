//! Persisted change records.
//!
//! A change record is one [`Change`] produced by the differ, stamped with the
//! collection and snapshot pair it was computed for. At most one record exists
//! per `(old_snapshot_id, new_snapshot_id, path)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::model::{is_hash_token, Change, ChangeType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Collection the snapshots belong to
    pub collection_id: String,

    /// Predecessor snapshot; `None` only when no predecessor exists
    pub old_snapshot_id: Option<String>,

    /// Snapshot the change was observed in
    pub new_snapshot_id: String,

    pub change_type: ChangeType,

    /// Canonical path of the changed location (`""` is the document root)
    pub path: String,

    /// Serialized payload or `sha256:` hash token
    pub modification: Option<String>,

    /// When the comparison ran
    pub created_at: DateTime<Utc>,
}

impl ChangeRecord {
    /// Stamp a differ output with its snapshot pair.
    pub fn from_change(
        collection_id: &str,
        old_snapshot_id: Option<&str>,
        new_snapshot_id: &str,
        change: Change,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            collection_id: collection_id.to_string(),
            old_snapshot_id: old_snapshot_id.map(str::to_string),
            new_snapshot_id: new_snapshot_id.to_string(),
            change_type: change.change_type,
            path: change.path,
            modification: change.modification,
            created_at,
        }
    }

    /// Whether the payload was replaced by a hash token.
    pub fn is_hashed(&self) -> bool {
        self.modification.as_deref().is_some_and(is_hash_token)
    }

    /// Decode the payload as JSON.
    ///
    /// Hash tokens and anything else that does not parse yield `None`; callers
    /// treat those payloads as opaque strings.
    pub fn payload(&self) -> Option<serde_json::Value> {
        let raw = self.modification.as_deref()?;
        if is_hash_token(raw) {
            return None;
        }
        serde_json::from_str(raw).ok()
    }
}
