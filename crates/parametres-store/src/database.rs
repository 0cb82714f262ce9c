//! SQLite persistence for settings
//!
//! Wraps the in-memory overlay with a lazy bulk-hydration step so repeated
//! reads cost no database round trips: the first access to a context loads
//! every row of that context (plus the general rows, if not yet loaded) in
//! one query. Writes go through to the table and are mirrored into the
//! overlay.

use crate::db;
use crate::errors::{read_error, write_error};
use crate::row::now_stamp;
use parametres_core::value::codec::{self, TypeTag};
use parametres_core::{Handler, MemoryHandler, ParametresError, Result};
use rusqlite::{params, Connection, ToSql};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// `(file, key, value, type, context)` as loaded during hydration
type RawRow = (String, String, Option<String>, String, Option<String>);

/// Settings handler persisting to a SQLite table.
pub struct DatabaseHandler {
    conn: Connection,
    table: String,
    overlay: MemoryHandler,
    /// Contexts already bulk-loaded into the overlay; `None` is the general
    /// scope. Append-only until `flush`.
    hydrated: HashSet<Option<String>>,
}

impl DatabaseHandler {
    /// Wrap an open connection and a settings table.
    ///
    /// The table must already exist with the reference shape (see
    /// `schema::table_ddl`); schema management is external.
    ///
    /// # Errors
    ///
    /// `ParametresError::StorageUnavailable` when the table name is not a
    /// plain identifier (it is interpolated into SQL and cannot be bound).
    pub fn new(conn: Connection, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        let valid = !table.is_empty()
            && table
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_');
        if !valid {
            return Err(ParametresError::StorageUnavailable {
                reason: format!("invalid settings table name '{}'", table),
            });
        }

        Ok(Self {
            conn,
            table,
            overlay: MemoryHandler::new(),
            hydrated: HashSet::new(),
        })
    }

    /// Open a database file and wrap its settings table.
    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn)?;
        Self::new(conn, table)
    }

    /// Bulk-load a context's rows into the overlay, once per context.
    ///
    /// The general scope is always loaded at most once; a context load folds
    /// the general rows into the same query when they are still missing.
    /// After this, the overlay is the sole source of truth for the context
    /// until `flush`.
    fn hydrate(&mut self, context: Option<&str>) -> Result<()> {
        if self.hydrated.contains(&context.map(str::to_string)) {
            return Ok(());
        }

        let rows = match context {
            None => {
                let sql = format!(
                    "SELECT file, key, value, type, context FROM {} WHERE context IS NULL",
                    self.table
                );
                query_rows(&self.conn, &sql, &[])?
            }
            Some(ctx) => {
                if self.hydrated.contains(&None) {
                    let sql = format!(
                        "SELECT file, key, value, type, context FROM {} WHERE context = ?1",
                        self.table
                    );
                    query_rows(&self.conn, &sql, &[&ctx])?
                } else {
                    // General has not been hydrated: fetch it in the same pass.
                    let sql = format!(
                        "SELECT file, key, value, type, context FROM {} \
                         WHERE context = ?1 OR context IS NULL",
                        self.table
                    );
                    let rows = query_rows(&self.conn, &sql, &[&ctx])?;
                    self.hydrated.insert(None);
                    rows
                }
            }
        };

        tracing::debug!(
            table = %self.table,
            context = ?context,
            rows = rows.len(),
            "Hydrated settings context from database"
        );

        for (file, key, value, type_name, row_context) in rows {
            let tag = TypeTag::from_name(&type_name).unwrap_or(TypeTag::String);
            self.overlay
                .store_raw(&file, &key, value, tag, row_context.as_deref());
        }
        self.hydrated.insert(context.map(str::to_string));

        Ok(())
    }
}

fn query_rows(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<RawRow>> {
    let mut stmt = conn.prepare(sql).map_err(read_error)?;
    let mapped = stmt
        .query_map(params, |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })
        .map_err(read_error)?;

    let mut rows = Vec::new();
    for row in mapped {
        rows.push(row.map_err(read_error)?);
    }
    Ok(rows)
}

impl Handler for DatabaseHandler {
    fn name(&self) -> &'static str {
        "database"
    }

    fn has(&mut self, file: &str, property: &str, context: Option<&str>) -> Result<bool> {
        self.hydrate(context)?;
        Ok(self.overlay.has_stored(file, property, context))
    }

    fn get(&mut self, file: &str, property: &str, context: Option<&str>) -> Result<Option<Value>> {
        self.hydrate(context)?;
        self.overlay.get_stored(file, property, context)
    }

    fn set(
        &mut self,
        file: &str,
        property: &str,
        value: Value,
        context: Option<&str>,
    ) -> Result<()> {
        let time = now_stamp();
        let (stored, tag) = codec::encode(&value);

        // Deciding between UPDATE and INSERT also hydrates the context.
        let result = if self.has(file, property, context)? {
            match context {
                Some(ctx) => self.conn.execute(
                    &format!(
                        "UPDATE {} SET value = ?1, type = ?2, updated_at = ?3 \
                         WHERE file = ?4 AND key = ?5 AND context = ?6",
                        self.table
                    ),
                    params![stored, tag.as_str(), time, file, property, ctx],
                ),
                None => self.conn.execute(
                    &format!(
                        "UPDATE {} SET value = ?1, type = ?2, updated_at = ?3 \
                         WHERE file = ?4 AND key = ?5 AND context IS NULL",
                        self.table
                    ),
                    params![stored, tag.as_str(), time, file, property],
                ),
            }
        } else {
            self.conn.execute(
                &format!(
                    "INSERT INTO {} (file, key, value, type, context, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    self.table
                ),
                params![file, property, stored, tag.as_str(), context, time, time],
            )
        };
        result.map_err(write_error)?;

        // Mirror into the overlay so reads stay consistent without re-hydrating
        self.overlay.store_raw(file, property, stored, tag, context);

        tracing::debug!(
            table = %self.table,
            file = %file,
            key = %property,
            context = ?context,
            "Stored setting in database"
        );
        Ok(())
    }

    fn forget(&mut self, file: &str, property: &str, context: Option<&str>) -> Result<()> {
        self.hydrate(context)?;

        // Context matches exactly: the general row is only deleted when no
        // context was requested.
        let result = match context {
            Some(ctx) => self.conn.execute(
                &format!(
                    "DELETE FROM {} WHERE file = ?1 AND key = ?2 AND context = ?3",
                    self.table
                ),
                params![file, property, ctx],
            ),
            None => self.conn.execute(
                &format!(
                    "DELETE FROM {} WHERE file = ?1 AND key = ?2 AND context IS NULL",
                    self.table
                ),
                params![file, property],
            ),
        };
        result.map_err(write_error)?;

        self.overlay.forget_stored(file, property, context);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.conn
            .execute(&format!("DELETE FROM {}", self.table), [])
            .map_err(write_error)?;

        self.overlay.clear();
        self.hydrated.clear();

        tracing::debug!(table = %self.table, "Flushed settings table");
        Ok(())
    }
}
