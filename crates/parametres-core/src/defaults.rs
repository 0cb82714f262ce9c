//! Default-configuration source
//!
//! Overrides sit on top of static configuration; when no handler stores a
//! value, the resolver falls back to this read-only source. The source is an
//! explicit constructor dependency of the resolver so tests run against
//! fixture mappings instead of process-global state.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Read-only provider of default-configuration mappings, one per file
/// namespace.
pub trait DefaultSource {
    /// Resolve the mapping for a file namespace; `None` when the namespace
    /// has no default configuration.
    fn resolve(&self, file: &str) -> Option<&Value>;
}

/// Default source over a fixed in-memory mapping.
#[derive(Debug, Clone, Default)]
pub struct StaticDefaults {
    files: HashMap<String, Value>,
}

impl StaticDefaults {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the mapping for a file namespace
    pub fn with_file(mut self, file: impl Into<String>, mapping: Value) -> Self {
        self.files.insert(file.into(), mapping);
        self
    }

    /// Build from a top-level object keyed by file namespace
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            files: map.into_iter().collect(),
        }
    }
}

impl DefaultSource for StaticDefaults {
    fn resolve(&self, file: &str) -> Option<&Value> {
        self.files.get(file)
    }
}

/// Source with no defaults at all; every fallback read resolves to absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefaults;

impl DefaultSource for NoDefaults {
    fn resolve(&self, _file: &str) -> Option<&Value> {
        None
    }
}
