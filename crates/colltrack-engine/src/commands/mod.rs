//! Command orchestration layer.
//!
//! `track` writes (snapshot plus its change records, atomically);
//! `engine_query` and `document_diff` only read.

pub mod document_diff;
pub mod engine_query;
pub mod read_tools;
pub mod track;

use chrono::{DateTime, TimeZone, Utc};

/// Current time truncated to the millisecond precision records are stored with.
pub(crate) fn run_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(now.timestamp_millis())
        .single()
        .unwrap_or(now)
}
