use crate::errors::{ModelError, Result};
use crate::store::Reader;

use super::invariants::{scan, ModelSnapshot};

/// Validate the whole model
///
/// Loads a snapshot through `reader` and runs every invariant check.
///
/// # Errors
///
/// Returns `ConsistencyViolation` describing the first finding, or the
/// reader's error if the snapshot cannot be loaded. For the full list use
/// [`scan`] directly.
pub fn validate_model<R: Reader + ?Sized>(reader: &R) -> Result<()> {
    let snapshot = ModelSnapshot::load(reader)?;
    match scan(&snapshot).into_iter().next() {
        Some(finding) => Err(ModelError::ConsistencyViolation {
            reason: finding.to_string(),
        }),
        None => Ok(()),
    }
}
