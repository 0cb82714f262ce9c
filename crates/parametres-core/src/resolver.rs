//! Settings resolver
//!
//! Holds the ordered handler list and implements the lookup algorithm:
//! handler precedence (first handler reporting presence wins), context
//! fallback (a context-scoped miss degrades to the general lookup), and the
//! default-configuration fallback. Writes fan out to every writeable handler.

use crate::defaults::DefaultSource;
use crate::errors::{ParametresError, Result};
use crate::handler::Handler;
use crate::key;
use crate::value::path;
use serde_json::Value;

/// A handler as configured: its registry name, the boxed instance, and
/// whether writes are routed to it.
pub struct ConfiguredHandler {
    pub name: String,
    pub handler: Box<dyn Handler>,
    pub writeable: bool,
}

impl ConfiguredHandler {
    pub fn new(name: impl Into<String>, handler: Box<dyn Handler>, writeable: bool) -> Self {
        Self {
            name: name.into(),
            handler,
            writeable,
        }
    }
}

/// Single place to read and write settings that originate in static
/// configuration but can be overridden per deployment and per context.
pub struct Parametres {
    handlers: Vec<ConfiguredHandler>,
    defaults: Box<dyn DefaultSource>,
}

impl Parametres {
    /// Build a resolver over an ordered handler list and a default source.
    ///
    /// The handler list is fixed for the resolver's lifetime; callers needing
    /// a different set construct a new resolver.
    pub fn new(handlers: Vec<ConfiguredHandler>, defaults: Box<dyn DefaultSource>) -> Self {
        tracing::debug!(
            handlers = handlers.len(),
            writeable = handlers.iter().filter(|h| h.writeable).count(),
            "Configured settings resolver"
        );
        Self { handlers, defaults }
    }

    /// Names of the configured handlers, in precedence order
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name.as_str()).collect()
    }

    /// Resolve a value for `key`, preferring the given context.
    ///
    /// Handlers are consulted in precedence order; the first one that has the
    /// `(file, property, context)` triple wins outright. A miss under a
    /// non-null context retries the whole lookup against the general scope.
    /// If no handler stores the value, the default-configuration mapping is
    /// indexed by the full dotted path below the file segment.
    ///
    /// # Errors
    ///
    /// `ParametresError::InvalidKey` for a key without a property segment;
    /// storage errors from a handler surface unchanged.
    pub fn get(&mut self, raw_key: &str, context: Option<&str>) -> Result<Option<Value>> {
        let parts = key::parse(raw_key)?;

        for entry in &mut self.handlers {
            if entry.handler.has(parts.file, parts.property, context)? {
                let value = entry.handler.get(parts.file, parts.property, context)?;

                // A sub-path only applies to composite values
                if let Some(found) = &value {
                    if !parts.path.is_empty() && (found.is_object() || found.is_array()) {
                        return Ok(path::get_path(found, &parts.path).cloned());
                    }
                }
                return Ok(value);
            }
        }

        // No contextual value stored anywhere: degrade to the general scope.
        if context.is_some() {
            return self.get(raw_key, None);
        }

        Ok(self
            .defaults
            .resolve(parts.file)
            .and_then(|mapping| path::get_dotted(mapping, &parts.dotted_property()))
            .cloned())
    }

    /// Store a value in every writeable handler, scoped to `context`.
    ///
    /// # Errors
    ///
    /// `ParametresError::InvalidKey`, `ParametresError::NoWritableHandler`,
    /// or any storage error from a handler.
    pub fn set(&mut self, raw_key: &str, value: Value, context: Option<&str>) -> Result<()> {
        let parts = key::parse(raw_key)?;

        for entry in self.write_handlers()? {
            entry
                .handler
                .set(parts.file, parts.property, value.clone(), context)?;
        }
        Ok(())
    }

    /// Remove a value from every writeable handler, restoring the default.
    ///
    /// # Errors
    ///
    /// `ParametresError::InvalidKey`, `ParametresError::NoWritableHandler`,
    /// or any storage error from a handler.
    pub fn forget(&mut self, raw_key: &str, context: Option<&str>) -> Result<()> {
        let parts = key::parse(raw_key)?;

        for entry in self.write_handlers()? {
            entry.handler.forget(parts.file, parts.property, context)?;
        }
        Ok(())
    }

    /// Clear every writeable handler entirely. Useful in tests; use with
    /// care anywhere else.
    ///
    /// # Errors
    ///
    /// `ParametresError::NoWritableHandler`, or any storage error from a
    /// handler.
    pub fn flush(&mut self) -> Result<()> {
        tracing::debug!("Flushing all writeable settings handlers");
        for entry in self.write_handlers()? {
            entry.handler.flush()?;
        }
        Ok(())
    }

    /// Writeable handlers in configured order
    fn write_handlers(&mut self) -> Result<Vec<&mut ConfiguredHandler>> {
        let writers: Vec<&mut ConfiguredHandler> = self
            .handlers
            .iter_mut()
            .filter(|entry| entry.writeable)
            .collect();

        if writers.is_empty() {
            return Err(ParametresError::NoWritableHandler);
        }
        Ok(writers)
    }
}
