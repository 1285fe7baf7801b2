//! Storage error types

use std::path::PathBuf;

use gate_rbac::AdapterError;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Policy file could not be read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A policy file line is not a valid rule
    #[error("Malformed policy at line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// A value the policy file format cannot hold
    #[error("Value {0:?} cannot be written to a policy file")]
    Unencodable(String),

    /// A stored rule row cannot be turned into a relation
    #[error("Invalid stored rule {id}: {message}")]
    InvalidRule { id: i32, message: String },

    /// Database errors
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Backend selected in configuration is not usable
    #[error("Unsupported storage backend: {0}")]
    UnsupportedBackend(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }
}

impl From<StorageError> for AdapterError {
    fn from(err: StorageError) -> Self {
        AdapterError::new(err)
    }
}
