//! Logging macros and the capture layer
//!
//! Op names are unique per test because the capture buffer is shared.

use modelx_core::errors::ModelError;
use modelx_core::logging_facility::init_test_capture;
use modelx_core::model::{RowId, Table};
use modelx_core::store::{ReadLimits, RowSet};
use modelx_core::{log_op_end, log_op_error, log_op_start};
use modelx_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_DURATION_MS, FIELD_ERR_CODE,
};

#[test]
fn test_start_and_end_bracket_operation() {
    let capture = init_test_capture();
    let op = "bracket_op";

    log_op_start!(op, row_id = 12);
    log_op_end!(op, duration_ms = 42, changes = 3u64);

    let events = capture.events_for_op(op);
    assert_eq!(events.len(), 2);
    assert!(events[0].is(op, EVENT_START));
    assert_eq!(events[0].field("row_id"), Some("12"));
    assert!(events[1].is(op, EVENT_END));
    assert_eq!(events[1].field(FIELD_DURATION_MS), Some("42"));
    assert_eq!(events[1].field("changes"), Some("3"));
    assert!(events[1]
        .component
        .as_deref()
        .is_some_and(|c| c.starts_with("logging_facility_tests")));
}

#[test]
fn test_error_carries_stable_code() {
    let capture = init_test_capture();
    let op = "failing_op";

    let err = ModelError::not_found(Table::Classifier, RowId::new(7));
    log_op_error!(op, err, duration_ms = 10);

    let event = capture.find(op, EVENT_END_ERROR).unwrap();
    assert_eq!(event.level, tracing::Level::ERROR);
    assert_eq!(event.field("err.kind"), Some("NotFound"));
    assert_eq!(capture.error_codes(op), vec!["ERR_NOT_FOUND".to_string()]);
    assert!(capture.find(op, EVENT_END).is_none());
}

#[test]
fn test_duplicate_name_code() {
    let capture = init_test_capture();
    let op = "rename_op";

    log_op_error!(
        op,
        ModelError::DuplicateName { name: "A".into() },
        duration_ms = 0,
        row_id = 3
    );

    capture.assert_event_exists(op, EVENT_END_ERROR);
    let event = capture.find(op, EVENT_END_ERROR).unwrap();
    assert_eq!(event.field(FIELD_ERR_CODE), Some("ERR_DUPLICATE_NAME"));
    assert_eq!(event.field("row_id"), Some("3"));
}

#[test]
fn test_truncated_lookup_logs_warning() {
    let capture = init_test_capture();
    let op = "truncating_op";

    let set = RowSet::limited(
        vec![1, 2, 3],
        ReadLimits {
            max_rows_per_query: Some(2),
        },
    );
    let rows = set.warn_if_truncated(op, Table::Feature);

    assert_eq!(rows, vec![1, 2]);
    let warnings = capture.count_events(|e| {
        e.op.as_deref() == Some(op)
            && e.level == tracing::Level::WARN
            && e.field(FIELD_ERR_CODE) == Some("ERR_TRUNCATED")
    });
    assert_eq!(warnings, 1);
}
