//! Canonical schema constants for structured logging and change events
//!
//! Every controller, journal and repair log line uses these keys so that
//! captured output can be asserted on without string guessing.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_TABLE: &str = "table";
pub const FIELD_ROW_ID: &str = "row_id";
pub const FIELD_DIAGRAM_ID: &str = "diagram_id";
pub const FIELD_CLASSIFIER_ID: &str = "classifier_id";
pub const FIELD_FEATURE_ID: &str = "feature_id";

// Journal
pub const FIELD_BOUNDARY_LEN: &str = "boundary_len";
pub const FIELD_JOURNAL_POS: &str = "journal_pos";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_FINDING: &str = "finding";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_TABLE.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        let names = [EVENT_START, EVENT_END, EVENT_END_ERROR, EVENT_FINDING];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
