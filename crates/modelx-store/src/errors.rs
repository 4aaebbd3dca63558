//! Error handling for modelx-store
//!
//! Maps SQLite and migration failures onto the core `ModelError`.

use modelx_core::errors::ModelError;
use rusqlite::ErrorCode;

/// Result type alias using the core ModelError
pub type Result<T> = std::result::Result<T, ModelError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ModelError {
    ModelError::storage(
        "migration",
        format!("Migration {} failed: {}", migration_id, reason),
    )
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ModelError {
    ModelError::storage(
        "migration_checksum",
        format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ),
    )
}

/// Create a store error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ModelError {
    ModelError::storage("sqlite", err.to_string())
}

/// Whether a write failed on the unique index over classifier names
pub fn is_duplicate_name(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == ErrorCode::ConstraintViolation
                && message.contains("classifiers.name")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelx_core::errors::ExErrorKind;

    #[test]
    fn test_generic_failure_is_storage() {
        let err = from_rusqlite(rusqlite::Error::InvalidQuery);
        assert_eq!(err.kind(), ExErrorKind::Storage);
    }

    #[test]
    fn test_checksum_mismatch_message() {
        let err = checksum_mismatch("001_initial_schema", "aa", "bb");
        assert_eq!(err.kind(), ExErrorKind::Storage);
        assert!(err.to_string().contains("001_initial_schema"));
    }
}
