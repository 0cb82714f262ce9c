//! Reference schema for the settings table
//!
//! Production schema management is external; this DDL exists so tests and
//! local bootstrap can create a table with the shape the handler assumes:
//! auto id, file, key, nullable value text, type defaulting to 'string',
//! nullable context, and creation/update timestamps.

use crate::errors::write_error;
use parametres_core::Result;
use rusqlite::Connection;

/// Reference DDL for a settings table with the given name
pub fn table_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT,
            type TEXT NOT NULL DEFAULT 'string',
            context TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"
    )
}

/// Create the settings table if it does not exist yet
pub fn apply_schema(conn: &Connection, table: &str) -> Result<()> {
    conn.execute(&table_ddl(table), []).map_err(write_error)?;
    Ok(())
}
