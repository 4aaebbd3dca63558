//! Consistency rules
//!
//! `invariants` detects violations over a full snapshot of the model;
//! `validation` turns the first violation into an error. The repair scan
//! in the engine fixes what `invariants` reports.

pub mod invariants;
pub mod validation;

pub use invariants::{find, scan, Finding, FindingKind, ModelSnapshot};
pub use validation::validate_model;
