//! Core types shared across the modelx crates
//!
//! This crate holds the small vocabulary that both the error facility and
//! the logging facility depend on:
//!
//! - **Correlation types**: `RequestId` (one per user action) and `TraceId`
//! - **Schema constants**: canonical structured-log field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestId, TraceId};
