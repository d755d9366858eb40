//! Result types for the read-only query surface.
//!
//! Plain data containers with no I/O; all serialize to the JSON the CLI
//! prints.

use serde::Serialize;

use colltrack_core::analytics::{ComparisonSummary, ImpactReport};
use colltrack_core::diff::model::Change;
use colltrack_core::enrich::EnrichedChangeView;

/// Default page size for change listings.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// One page of enriched change records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangePage {
    pub items: Vec<EnrichedChangeView>,
    /// Matches before paging
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

impl ChangePage {
    pub fn new(items: Vec<EnrichedChangeView>, total: usize, limit: usize, offset: usize) -> Self {
        let has_more = offset + items.len() < total;
        Self {
            items,
            total,
            limit,
            offset,
            has_more,
        }
    }
}

/// Where the records of a comparison came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareSource {
    /// Consecutive snapshots; records read from the change store
    Stored,
    /// Non-consecutive pair; diffed on the fly, nothing persisted
    Computed,
}

/// Result of a `Compare` query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareResult {
    pub summary: ComparisonSummary,
    pub impact: ImpactReport,
    pub source: CompareSource,
    /// Markdown rendering of `summary` and `impact`
    pub human_summary: String,
}

/// Result of diffing two documents outside any store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentDiffResult {
    pub changes: Vec<Change>,
    pub summary: ComparisonSummary,
    pub impact: ImpactReport,
}
