//! Environment driven configuration for the migrant tool.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                field: "log_format".to_string(),
                value: s.to_string(),
                expected: "compact, pretty, or json".to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let level = get_env_or_default("LOG_LEVEL", "info");
        let format = get_env_or_default("LOG_FORMAT", "compact").parse()?;

        Ok(LoggingConfig { level, format })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "level".to_string(),
                value: self.level.clone(),
                expected: "trace, debug, info, warn, or error".to_string(),
            });
        }
        Ok(())
    }
}

/// Tool configuration
///
/// `database_url` is optional at load time because the scaffolding commands
/// never open a connection; [`MigrantConfig::require_database_url`] enforces
/// it for the commands that do.
#[derive(Debug, Clone)]
pub struct MigrantConfig {
    pub database_url: Option<String>,
    pub migrations_dir: PathBuf,
    pub migrations_table: String,
    pub use_transaction: bool,
    pub validate_unknown_migrations: bool,
    pub logging: LoggingConfig,
}

impl Default for MigrantConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            migrations_dir: PathBuf::from("./migrations"),
            migrations_table: "migrations".to_string(),
            use_transaction: true,
            validate_unknown_migrations: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl MigrantConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = get_env_optional("DATABASE_URL");
        let migrations_dir = PathBuf::from(get_env_or_default("MIGRANT_DIR", "./migrations"));
        let migrations_table = get_env_or_default("MIGRANT_TABLE", "migrations");
        let use_transaction = parse_bool(
            "use_transaction",
            &get_env_or_default("MIGRANT_USE_TRANSACTION", "true"),
        )?;
        let validate_unknown_migrations = parse_bool(
            "validate_unknown_migrations",
            &get_env_or_default("MIGRANT_VALIDATE_UNKNOWN", "false"),
        )?;
        let logging = LoggingConfig::from_env()?;

        Ok(MigrantConfig {
            database_url,
            migrations_dir,
            migrations_table,
            use_transaction,
            validate_unknown_migrations,
            logging,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.database_url {
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "database_url".to_string(),
                    reason: "Database URL cannot be empty".to_string(),
                });
            }
        }

        if self.migrations_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "migrations_dir".to_string(),
                reason: "Migrations directory cannot be empty".to_string(),
            });
        }

        if self.migrations_table.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "migrations_table".to_string(),
                reason: "Migrations table name cannot be empty".to_string(),
            });
        }

        self.logging.validate()?;

        Ok(())
    }

    /// The connection string, or an error naming the variable to set
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar {
                var: "DATABASE_URL".to_string(),
            })
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn with_migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: "true or false".to_string(),
        }),
    }
}

fn get_env_optional(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "DATABASE_URL",
        "MIGRANT_DIR",
        "MIGRANT_TABLE",
        "MIGRANT_USE_TRANSACTION",
        "MIGRANT_VALIDATE_UNKNOWN",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ];

    fn clean_test_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clean_test_env();

        let config = MigrantConfig::from_env().unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.migrations_dir, PathBuf::from("./migrations"));
        assert_eq!(config.migrations_table, "migrations");
        assert!(config.use_transaction);
        assert!(!config.validate_unknown_migrations);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clean_test_env();
        env::set_var("DATABASE_URL", "postgres://app@localhost/app");
        env::set_var("MIGRANT_DIR", "db/migrations");
        env::set_var("MIGRANT_TABLE", "schema_migrations");
        env::set_var("MIGRANT_USE_TRANSACTION", "no");
        env::set_var("MIGRANT_VALIDATE_UNKNOWN", "1");
        env::set_var("LOG_LEVEL", "debug");
        env::set_var("LOG_FORMAT", "json");

        let config = MigrantConfig::from_env().unwrap();

        assert_eq!(
            config.require_database_url().unwrap(),
            "postgres://app@localhost/app"
        );
        assert_eq!(config.migrations_dir, PathBuf::from("db/migrations"));
        assert_eq!(config.migrations_table, "schema_migrations");
        assert!(!config.use_transaction);
        assert!(config.validate_unknown_migrations);
        assert_eq!(config.logging.format, LogFormat::Json);

        clean_test_env();
    }

    #[test]
    #[serial]
    fn test_invalid_bool_is_rejected() {
        clean_test_env();
        env::set_var("MIGRANT_USE_TRANSACTION", "sometimes");

        let err = MigrantConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "use_transaction"));

        clean_test_env();
    }

    #[test]
    fn test_missing_database_url() {
        let config = MigrantConfig::default();
        let err = config.require_database_url().unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = MigrantConfig::default().with_database_url("  ");
        assert!(config.validate().is_err());

        let mut config = MigrantConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
