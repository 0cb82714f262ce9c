//! Static handler registry
//!
//! Maps each configuration variant to its constructor. The set of backends
//! is closed and type-checked; pluggability lives in the configuration
//! order and writeable flags, not in runtime class lookup.

use crate::database::DatabaseHandler;
use crate::file::FileHandler;
use parametres_core::{
    ConfiguredHandler, DefaultSource, HandlerConfig, MemoryHandler, Parametres, ParametresConfig,
    Result,
};

/// Instantiate the handler a configuration entry describes.
///
/// # Errors
///
/// Construction failures from the persistent backends (unusable path,
/// missing parent directory, unusable database or table).
pub fn build_handler(config: &HandlerConfig) -> Result<ConfiguredHandler> {
    match config {
        HandlerConfig::Memory { writeable } => Ok(ConfiguredHandler::new(
            "memory",
            Box::new(MemoryHandler::new()),
            *writeable,
        )),
        HandlerConfig::Database {
            database,
            table,
            writeable,
        } => {
            let handler = DatabaseHandler::open(database, table)?;
            Ok(ConfiguredHandler::new(
                "database",
                Box::new(handler),
                *writeable,
            ))
        }
        HandlerConfig::File { path, writeable } => {
            let handler = FileHandler::new(path)?;
            Ok(ConfiguredHandler::new("file", Box::new(handler), *writeable))
        }
    }
}

/// Assemble a resolver from a configuration mapping and a default source.
///
/// Handlers are built in configured order; that order is read precedence.
///
/// # Errors
///
/// The first handler construction failure, unchanged.
pub fn from_config(
    config: &ParametresConfig,
    defaults: Box<dyn DefaultSource>,
) -> Result<Parametres> {
    let handlers = config
        .handlers
        .iter()
        .map(build_handler)
        .collect::<Result<Vec<_>>>()?;

    Ok(Parametres::new(handlers, defaults))
}
