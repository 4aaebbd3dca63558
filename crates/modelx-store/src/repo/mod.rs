//! Repository layer mapping model rows onto SQLite tables

pub mod hydration;
pub mod sqlite_store;

pub use sqlite_store::SqliteStore;
