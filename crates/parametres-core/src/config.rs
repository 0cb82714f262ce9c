//! Handler configuration
//!
//! The set of storage backends is closed: a configuration names which
//! handlers exist, in which precedence order, and which of them receive
//! writes. The registry in the store crate maps each variant to its
//! constructor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ordered handler configuration for a resolver.
///
/// Order is precedence order for reads; every entry flagged `writeable`
/// receives writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParametresConfig {
    pub handlers: Vec<HandlerConfig>,
}

/// Configuration of a single storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum HandlerConfig {
    /// Non-persistent in-memory backend
    Memory {
        #[serde(default = "default_writeable")]
        writeable: bool,
    },
    /// SQLite-backed relational backend
    Database {
        /// Path of the SQLite database file
        database: PathBuf,
        /// Settings table name
        #[serde(default = "default_table")]
        table: String,
        #[serde(default = "default_writeable")]
        writeable: bool,
    },
    /// Flat-file JSON backend
    File {
        /// Path of the storage file
        path: PathBuf,
        #[serde(default = "default_writeable")]
        writeable: bool,
    },
}

impl HandlerConfig {
    /// Whether this handler receives `set`/`forget`/`flush`
    pub fn writeable(&self) -> bool {
        match self {
            HandlerConfig::Memory { writeable }
            | HandlerConfig::Database { writeable, .. }
            | HandlerConfig::File { writeable, .. } => *writeable,
        }
    }
}

fn default_writeable() -> bool {
    true
}

fn default_table() -> String {
    "parametres".to_string()
}
