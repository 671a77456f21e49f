use std::path::PathBuf;

use thiserror::Error;

/// Error type for every operation on a JSON-backed store.
///
/// Read failures (`KeyNotFound`, `StoreUninitialized`) leave the store untouched.
/// A `Persistence` error means the in-memory document was already updated but the
/// backing file was not, so memory and disk have diverged until the next successful flush.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested key or path is absent (or, in truthy lookup mode, holds a falsy value)
    #[error("Key '{key}' not found in storage")]
    KeyNotFound {
        key: String,
    },

    /// The store holds no document, which happens when the backing file contains `null`
    #[error("Store backed by {path:?} is not initialized, the storage file may be empty or invalid")]
    StoreUninitialized {
        path: PathBuf,
    },

    /// An argument had the wrong shape for the operation
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        reason: String,
    },

    /// Writing the document to its backing file failed
    #[error("Failed to save storage file {path:?}: {source}")]
    Persistence {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing backing file could not be read or parsed while opening the store
    #[error("Failed to load storage file {path:?}: {source}")]
    Load {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Shorthand for building an `InvalidArgument` error.
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Returns true when the error reports a missing key.
    pub const fn is_not_found(&self) -> bool { matches!(self, Self::KeyNotFound { .. }) }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_message() {
        let err = StoreError::KeyNotFound {
            key: "user.name".to_string(),
        };
        assert_eq!(err.to_string(), "Key 'user.name' not found in storage");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_persistence_error_keeps_source() {
        let err = StoreError::Persistence {
            path:   PathBuf::from("/tmp/storage.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("denied"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_not_found());
    }
}
