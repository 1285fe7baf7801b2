//! Configuration loading and environment variable handling

use std::path::Path;
use std::str::FromStr;

use crate::domains::logging::{LogFormat, LogLevel, LoggingConfig};
use crate::domains::rbac::RbacSettings;
use crate::domains::storage::{StorageBackend, StorageConfig};
use crate::domains::GateConfig;
use crate::error::{ConfigError, ConfigResult};

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "GATE".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<GateConfig> {
        let content = std::fs::read_to_string(path)?;
        self.from_yaml_str(&content)
    }

    /// Load configuration from YAML text with environment overrides
    pub fn from_yaml_str(&self, content: &str) -> ConfigResult<GateConfig> {
        let mut config: GateConfig = serde_yaml::from_str(content)?;
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<GateConfig> {
        let mut config = GateConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<GateConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut GateConfig) -> ConfigResult<()> {
        self.apply_rbac_overrides(&mut config.rbac)?;
        self.apply_storage_overrides(&mut config.storage)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply access-control overrides
    fn apply_rbac_overrides(&self, config: &mut RbacSettings) -> ConfigResult<()> {
        if let Ok(autosave) = self.get_env_var("AUTOSAVE") {
            config.autosave = autosave
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid AUTOSAVE: {}", e)))?;
        }

        if let Ok(admin_role) = self.get_env_var("ADMIN_ROLE") {
            config.admin_role = admin_role;
        }

        if let Ok(wildcard) = self.get_env_var("WILDCARD_ACTION") {
            config.wildcard_action = wildcard;
        }

        Ok(())
    }

    /// Apply storage overrides
    fn apply_storage_overrides(&self, config: &mut StorageConfig) -> ConfigResult<()> {
        if let Ok(backend) = self.get_env_var("STORAGE_BACKEND") {
            config.backend = StorageBackend::from_str(&backend)
                .map_err(|_| ConfigError::EnvError(format!("Invalid STORAGE_BACKEND: {}", backend)))?;
        }

        if let Ok(path) = self.get_env_var("POLICY_PATH") {
            config.policy_path = Some(path);
        }

        if let Ok(url) = self.get_env_var("DATABASE_URL") {
            config.database_url = Some(url);
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(&self, config: &mut LoggingConfig) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
