//! Snapshot-pair comparison summary.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::diff::model::ChangeType;
use crate::enrich::{resource_type, ResourceType};
use crate::model::ChangeRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeTypeCounts {
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
    pub total: usize,
}

impl ChangeTypeCounts {
    pub fn record(&mut self, change_type: ChangeType) {
        match change_type {
            ChangeType::Added => self.added += 1,
            ChangeType::Deleted => self.deleted += 1,
            ChangeType::Modified => self.modified += 1,
        }
        self.total += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub collection_id: String,
    pub old_snapshot_id: Option<String>,
    pub new_snapshot_id: String,
    pub counts: ChangeTypeCounts,
    /// Changed paths per resource type, in record order
    pub by_resource_type: BTreeMap<ResourceType, Vec<String>>,
}

/// Summarize the records of one snapshot pair.
///
/// Records belonging to other pairs are ignored.
pub fn summarize(
    collection_id: &str,
    old_snapshot_id: Option<&str>,
    new_snapshot_id: &str,
    records: &[ChangeRecord],
) -> ComparisonSummary {
    let mut counts = ChangeTypeCounts::default();
    let mut by_resource_type: BTreeMap<ResourceType, Vec<String>> = BTreeMap::new();

    for r in records.iter().filter(|r| {
        r.collection_id == collection_id
            && r.new_snapshot_id == new_snapshot_id
            && r.old_snapshot_id.as_deref() == old_snapshot_id
    }) {
        counts.record(r.change_type);
        by_resource_type
            .entry(resource_type(&r.path))
            .or_default()
            .push(r.path.clone());
    }

    ComparisonSummary {
        collection_id: collection_id.to_string(),
        old_snapshot_id: old_snapshot_id.map(str::to_string),
        new_snapshot_id: new_snapshot_id.to_string(),
        counts,
        by_resource_type,
    }
}
