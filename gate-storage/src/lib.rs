//! Durable backings for the access gate
//!
//! Provides a policy file adapter and, with the `database` feature, a
//! SeaORM adapter over the `casbin_rules` table. [`connect`] picks one from
//! [`StorageConfig`].

pub mod error;
pub mod file;

// SeaORM implementation (feature-gated)
#[cfg(feature = "database")]
pub mod seaorm;

use std::sync::Arc;

use gate_config::{StorageBackend, StorageConfig};
use gate_rbac::{MemoryAdapter, PolicyAdapter};
use tracing::info;

pub use error::{StorageError, StorageResult};
pub use file::{parse_policy, render_policy, FileAdapter};

#[cfg(feature = "database")]
pub use seaorm::SeaOrmAdapter;

/// Build the adapter selected by the storage configuration
///
/// A `file` backend does not require the file to exist yet; the first
/// load reports it missing. A `database` backend connects and creates
/// the rules table.
pub async fn connect(config: &StorageConfig) -> StorageResult<Arc<dyn PolicyAdapter>> {
    let adapter: Arc<dyn PolicyAdapter> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryAdapter::new()),
        StorageBackend::File => {
            let path = config
                .policy_path
                .as_deref()
                .ok_or_else(|| StorageError::UnsupportedBackend("file backend needs policy_path".to_string()))?;
            Arc::new(FileAdapter::new(path))
        }
        StorageBackend::Database => connect_database(config).await?,
    };

    info!(backend = %config.backend, adapter = adapter.name(), "Policy storage ready");
    Ok(adapter)
}

#[cfg(feature = "database")]
async fn connect_database(config: &StorageConfig) -> StorageResult<Arc<dyn PolicyAdapter>> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| StorageError::UnsupportedBackend("database backend needs database_url".to_string()))?;
    Ok(Arc::new(SeaOrmAdapter::connect(url).await?))
}

#[cfg(not(feature = "database"))]
async fn connect_database(_config: &StorageConfig) -> StorageResult<Arc<dyn PolicyAdapter>> {
    Err(StorageError::UnsupportedBackend(
        "built without the `database` feature".to_string(),
    ))
}
