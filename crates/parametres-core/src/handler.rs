//! Storage handler contract
//!
//! Every backend implements the same narrow capability over the
//! `(file, property, context)` keyspace. Reads take `&mut self` because
//! persistent handlers hydrate their in-memory overlay on first access.

use crate::errors::{ParametresError, Result};
use serde_json::Value;

/// Uniform storage capability for settings backends.
///
/// Side effects are confined to the handler's own storage; no handler may
/// mutate another's state.
pub trait Handler {
    /// Short name for diagnostics and error messages
    fn name(&self) -> &'static str;

    /// Check whether this handler has a value stored for the exact
    /// `(file, property, context)` triple. Presence is key existence: a
    /// stored null counts as present.
    fn has(&mut self, file: &str, property: &str, context: Option<&str>) -> Result<bool>;

    /// Return the stored value, or `Ok(None)` when the triple is absent.
    /// Absence is never an error.
    fn get(&mut self, file: &str, property: &str, context: Option<&str>) -> Result<Option<Value>>;

    /// Store a value for later retrieval.
    ///
    /// Handlers that do not support writing values keep this default body.
    ///
    /// # Errors
    ///
    /// `ParametresError::NotWritable` unless the handler overrides this.
    fn set(
        &mut self,
        _file: &str,
        _property: &str,
        _value: Value,
        _context: Option<&str>,
    ) -> Result<()> {
        Err(ParametresError::NotWritable {
            handler: self.name().to_string(),
        })
    }

    /// Remove the exact `(file, property, context)` entry; no-op when absent.
    ///
    /// # Errors
    ///
    /// `ParametresError::NotWritable` unless the handler overrides this.
    fn forget(&mut self, _file: &str, _property: &str, _context: Option<&str>) -> Result<()> {
        Err(ParametresError::NotWritable {
            handler: self.name().to_string(),
        })
    }

    /// Clear every entry this handler owns, in memory and persisted.
    /// All handlers must support this.
    fn flush(&mut self) -> Result<()>;
}
