//! Configuration management for the tenant gate
//!
//! Configuration is split by functional domain (access control, storage,
//! logging), loaded from YAML with `GATE_*` environment overrides and
//! validated before use.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

pub use domains::{
    logging::{LogFormat, LogLevel, LoggingConfig},
    rbac::{AssignmentSpec, BootstrapConfig, GrantSpec, RbacSettings, DEFAULT_ADMIN_ROLE, DEFAULT_WILDCARD_ACTION},
    storage::{StorageBackend, StorageConfig},
    GateConfig,
};
