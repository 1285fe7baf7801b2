//! Error types for access-control operations

use thiserror::Error;

/// Result type for gate operations
pub type GateResult<T> = Result<T, GateError>;

/// Result type for storage adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Failure reported by a backing store while loading or saving relations
#[derive(Error, Debug)]
#[error("{source}")]
pub struct AdapterError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl AdapterError {
    /// Wrap any backend error
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Borrow the backend error
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

/// Gate-level errors
///
/// Denied decisions, revoking absent relations and empty query results are
/// not errors.
#[derive(Error, Debug)]
pub enum GateError {
    /// Backing store failed to load or save
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Settings rejected at startup
    #[error("Invalid configuration: {0}")]
    Config(#[from] gate_config::ConfigError),
}

impl GateError {
    /// Check if this error came from the backing store
    pub fn is_adapter(&self) -> bool {
        matches!(self, Self::Adapter(_))
    }
}
