//! Error helpers for parametres-store
//!
//! Maps backend errors onto the core taxonomy: read-side failures surface as
//! I/O errors, rejected writes as storage-write errors (always carrying the
//! backend's own message), and construction failures as storage-unavailable.

use parametres_core::ParametresError;

/// A backend rejected an insert/update/delete/truncate
pub fn write_error(err: rusqlite::Error) -> ParametresError {
    ParametresError::StorageWrite {
        message: err.to_string(),
    }
}

/// A backend read (hydration query) failed
pub fn read_error(err: rusqlite::Error) -> ParametresError {
    ParametresError::Io {
        message: err.to_string(),
    }
}

/// A backend could not be opened or configured
pub fn open_error(err: rusqlite::Error) -> ParametresError {
    ParametresError::StorageUnavailable {
        reason: err.to_string(),
    }
}
