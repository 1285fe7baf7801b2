//! Structured logging setup for the tenant gate
//!
//! All crates in the workspace emit events through `tracing`; this crate
//! installs the global subscriber from a [`LoggingConfig`].

pub mod init;

pub use gate_config::{LogFormat, LogLevel, LoggingConfig};
pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
