use thiserror::Error;

/// Result type alias using ParametresError
pub type Result<T> = std::result::Result<T, ParametresError>;

/// Error taxonomy for settings resolution and storage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParametresError {
    // ===== Key grammar =====
    /// Key lacks the required file.property structure
    #[error("Invalid key '{key}': must contain both file and property, e.g. foo.bar")]
    InvalidKey { key: String },

    // ===== Write routing =====
    /// Handler does not support storing values
    #[error("Handler '{handler}' does not support writing values")]
    NotWritable { handler: String },

    /// No configured handler is capable of storing values
    #[error("No settings handler capable of storing values is configured")]
    NoWritableHandler,

    // ===== Persistent storage =====
    /// Backend rejected an insert/update/delete/truncate
    #[error("Storage write failed: {message}")]
    StorageWrite { message: String },

    /// File handler configured without a storage path
    #[error("No storage file path was configured")]
    StorageFileNotConfigured,

    /// Parent directory of the storage file does not exist
    #[error("Directory of storage file '{path}' was not found")]
    StorageDirectoryNotFound { path: String },

    /// Backend could not be initialized
    #[error("Storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    // ===== Generic =====
    /// Serialization error (composite payload or row encoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// I/O failure against a flat-file store
    #[error("I/O error: {message}")]
    Io { message: String },
}

/// Conversion from serde_json::Error to ParametresError
impl From<serde_json::Error> for ParametresError {
    fn from(err: serde_json::Error) -> Self {
        ParametresError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Create an I/O error with operation context
pub fn io_error(operation: &str, err: std::io::Error) -> ParametresError {
    ParametresError::Io {
        message: format!("{}: {}", operation, err),
    }
}
