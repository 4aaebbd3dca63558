//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

use std::path::Path;

use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection
///
/// `PRAGMA journal_mode` answers with the resulting mode, so it is read as
/// a query. In-memory databases report `memory` and stay that way.
pub fn configure(conn: &Connection, wal: bool) -> Result<()> {
    if wal {
        let mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        tracing::debug!(journal_mode = %mode, "configured sqlite journal mode");
    }
    conn.execute_batch("PRAGMA synchronous = NORMAL")
        .map_err(from_rusqlite)?;
    Ok(())
}
