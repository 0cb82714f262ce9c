//! Database connection management
//!
//! Utilities for opening and configuring SQLite connections for the
//! settings table.

use crate::errors::open_error;
use parametres_core::Result;
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(open_error)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(open_error)
}

/// Configure a connection with optimal settings
pub fn configure(conn: &Connection) -> Result<()> {
    // Enable foreign keys
    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(open_error)?;

    // Set WAL mode for better concurrency
    conn.pragma_update(None, "journal_mode", &"WAL")
        .map_err(open_error)?;

    Ok(())
}
