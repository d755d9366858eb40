//! Store-free comparison of two documents.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use colltrack_core::analytics::{analyze_impact, summarize};
use colltrack_core::config::TrackerConfig;
use colltrack_core::diff::{decode_document, diff_with};
use colltrack_core::errors::Result;
use colltrack_core::model::ChangeRecord;
use colltrack_core::{log_op_end, log_op_error, log_op_start};

use crate::commands::read_tools::DocumentDiffResult;
use crate::commands::run_timestamp;

/// Collection id stamped on records of a store-free comparison.
pub const ADHOC_COLLECTION: &str = "adhoc";

/// Diff `old` against `new` and summarize the result.
///
/// The labels stand in for snapshot ids in the summary. Nothing is persisted.
///
/// # Errors
///
/// `Decode` when either side is not a JSON document.
pub fn compare_documents(
    old_label: &str,
    old: &[u8],
    new_label: &str,
    new: &[u8],
    config: &TrackerConfig,
) -> Result<DocumentDiffResult> {
    log_op_start!("compare_documents");
    let start = Instant::now();

    let result = (|| -> Result<DocumentDiffResult> {
        let old_doc = decode_document("old", old)?;
        let new_doc = decode_document("new", new)?;
        let identity = config.identity();
        let changes = diff_with(&old_doc, &new_doc, &config.diff, &identity);

        let created_at = run_timestamp();
        let records: Vec<ChangeRecord> = changes
            .iter()
            .cloned()
            .map(|c| ChangeRecord::from_change(ADHOC_COLLECTION, Some(old_label), new_label, c, created_at))
            .collect();

        Ok(DocumentDiffResult {
            summary: summarize(ADHOC_COLLECTION, Some(old_label), new_label, &records),
            impact: analyze_impact(&records, &identity),
            changes,
        })
    })();

    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(r) => log_op_end!(
            "compare_documents",
            duration_ms = elapsed,
            change_count = r.changes.len()
        ),
        Err(e) => {
            let e_clone = e.clone();
            log_op_error!("compare_documents", e_clone, duration_ms = elapsed);
        }
    }
    result
}
