//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across the differ, the store
//! and the engine so log pipelines can filter on them.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_RUN_ID: &str = "run_id";

// Entity identifiers
pub const FIELD_COLLECTION_ID: &str = "collection_id";
pub const FIELD_SNAPSHOT_ID: &str = "snapshot_id";
pub const FIELD_OLD_SNAPSHOT_ID: &str = "old_snapshot_id";

// Diff sizes
pub const FIELD_CHANGE_COUNT: &str = "change_count";
pub const FIELD_DIFF_PHASE: &str = "diff_phase";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Diff phases
pub const PHASE_STRUCTURAL: &str = "structural";
pub const PHASE_CONTENT: &str = "content";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_phase_names_are_distinct() {
        assert_ne!(PHASE_STRUCTURAL, PHASE_CONTENT);
    }
}
