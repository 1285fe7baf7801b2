//! Policy storage configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};

/// Where grants and assignments are persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backing store kind
    #[serde(default)]
    pub backend: StorageBackend,

    /// Policy file path, required by the `file` backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_path: Option<String>,

    /// Database URL (e.g. "sqlite://gate.db"), required by the `database` backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

/// Storage backend enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
    Database,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            policy_path: None,
            database_url: None,
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            "database" | "db" => Ok(StorageBackend::Database),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageBackend::Memory => "memory",
            StorageBackend::File => "file",
            StorageBackend::Database => "database",
        };
        f.write_str(name)
    }
}

impl Validatable for StorageConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.backend {
            StorageBackend::Memory => Ok(()),
            StorageBackend::File => {
                let path = self
                    .policy_path
                    .as_deref()
                    .ok_or_else(|| self.validation_error("policy_path is required for the file backend"))?;
                validate_required_string(path, "policy_path", self.domain_name())
            }
            StorageBackend::Database => {
                let url = self
                    .database_url
                    .as_deref()
                    .ok_or_else(|| self.validation_error("database_url is required for the database backend"))?;
                validate_required_string(url, "database_url", self.domain_name())
            }
        }
    }

    fn domain_name(&self) -> &'static str {
        "storage"
    }
}
