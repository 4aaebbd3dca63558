//! ModelX Store - SQLite persistence for the structural model
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - `SqliteStore`, implementing the core `Reader` / `Writer` contracts
//! - Row hydration between SQL rows and model rows

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use errors::Result;
pub use repo::SqliteStore;
