//! Flat-file persistence for settings
//!
//! Stores rows as one pretty-printed JSON array, read and rewritten whole -
//! there is no partial or streaming access. The same overlay-plus-ledger
//! hydration strategy as the database handler keeps reads in memory after
//! the first access to a context.

use crate::row::{now_stamp, Row};
use parametres_core::errors::io_error;
use parametres_core::value::codec::{self, TypeTag};
use parametres_core::{Handler, MemoryHandler, ParametresError, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings handler persisting to a JSON flat file.
pub struct FileHandler {
    path: PathBuf,
    overlay: MemoryHandler,
    /// Contexts already bulk-loaded into the overlay; `None` is the general
    /// scope. Append-only until `flush`.
    hydrated: HashSet<Option<String>>,
}

impl FileHandler {
    /// Open a storage file, creating an empty one when absent.
    ///
    /// # Errors
    ///
    /// `ParametresError::StorageFileNotConfigured` for an empty path,
    /// `ParametresError::StorageDirectoryNotFound` when the parent directory
    /// does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ParametresError::StorageFileNotConfigured);
        }

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(ParametresError::StorageDirectoryNotFound {
                path: path.display().to_string(),
            });
        }

        if !path.exists() {
            fs::write(&path, "[]").map_err(|e| io_error("create storage file", e))?;
        }

        Ok(Self {
            path,
            overlay: MemoryHandler::new(),
            hydrated: HashSet::new(),
        })
    }

    /// Path of the backing storage file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<Vec<Row>> {
        let raw =
            fs::read_to_string(&self.path).map_err(|e| io_error("read storage file", e))?;
        let rows = serde_json::from_str(&raw)?;
        Ok(rows)
    }

    fn write_rows(&self, rows: &[Row]) -> Result<()> {
        let pretty = serde_json::to_string_pretty(rows)?;
        fs::write(&self.path, pretty).map_err(|e| ParametresError::StorageWrite {
            message: format!("write storage file: {}", e),
        })
    }

    /// Bulk-load a context's rows into the overlay, once per context.
    ///
    /// One file read per hydration; a context load folds the general rows in
    /// when they are still missing.
    fn hydrate(&mut self, context: Option<&str>) -> Result<()> {
        if self.hydrated.contains(&context.map(str::to_string)) {
            return Ok(());
        }

        let rows = self.read_rows()?;
        let include_general = !self.hydrated.contains(&None);
        let mut loaded = 0usize;

        for row in &rows {
            let wanted = match context {
                None => row.context.is_none(),
                Some(ctx) => {
                    row.context.as_deref() == Some(ctx)
                        || (include_general && row.context.is_none())
                }
            };
            if !wanted {
                continue;
            }

            let tag = TypeTag::from_name(&row.type_name).unwrap_or(TypeTag::String);
            self.overlay.store_raw(
                &row.file,
                &row.key,
                row.value.clone(),
                tag,
                row.context.as_deref(),
            );
            loaded += 1;
        }

        if include_general {
            self.hydrated.insert(None);
        }
        if let Some(ctx) = context {
            self.hydrated.insert(Some(ctx.to_string()));
        }

        tracing::debug!(
            path = %self.path.display(),
            context = ?context,
            rows = loaded,
            "Hydrated settings context from file"
        );
        Ok(())
    }
}

impl Handler for FileHandler {
    fn name(&self) -> &'static str {
        "file"
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

        // Deciding between update and append also hydrates the context.
        let exists = self.has(file, property, context)?;
        let mut rows = self.read_rows()?;

        if exists {
            if let Some(row) = rows.iter_mut().find(|row| {
                row.file == file && row.key == property && row.context.as_deref() == context
            }) {
                row.value = stored.clone();
                row.type_name = tag.as_str().to_string();
                row.updated_at = time;
            }
        } else {
            rows.push(Row {
                id: Row::mint_id(),
                file: file.to_string(),
                key: property.to_string(),
                value: stored.clone(),
                type_name: tag.as_str().to_string(),
                context: context.map(str::to_string),
                created_at: time.clone(),
                updated_at: time,
            });
        }

        self.write_rows(&rows)?;
        self.overlay.store_raw(file, property, stored, tag, context);

        tracing::debug!(
            path = %self.path.display(),
            file = %file,
            key = %property,
            context = ?context,
            "Stored setting in file"
        );
        Ok(())
    }

    fn forget(&mut self, file: &str, property: &str, context: Option<&str>) -> Result<()> {
        self.hydrate(context)?;

        let mut rows = self.read_rows()?;
        // Context matches exactly; absent rows make this a no-op.
        rows.retain(|row| {
            !(row.file == file && row.key == property && row.context.as_deref() == context)
        });
        self.write_rows(&rows)?;

        self.overlay.forget_stored(file, property, context);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.write_rows(&[])?;
        self.overlay.clear();
        self.hydrated.clear();

        tracing::debug!(path = %self.path.display(), "Flushed settings file");
        Ok(())
    }
}
