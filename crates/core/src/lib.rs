//! # migrant-core
//!
//! Configuration, logging and shared error types used by the migrant
//! workspace crates.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigError, LogFormat, LoggingConfig, MigrantConfig};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;

/// Binary name shown in usage text
pub const TOOL_NAME: &str = "migrant";
