//! Error types for the migration engine

use thiserror::Error;

pub type MigrationResult<T> = Result<T, MigrationError>;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to connect to the database: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Invalid connection string: {message}")]
    InvalidConnectionString { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Migration is missing an ID")]
    MissingId,

    #[error("Duplicated migration ID: {0}")]
    DuplicateId(String),

    #[error("Applied migration {0} is not registered")]
    UnknownMigration(String),

    #[error("No migrations defined")]
    NoMigrationDefined,

    #[error("Could not find a migration that has been applied")]
    NoRunMigration,

    #[error("Migration {0} has no rollback action")]
    RollbackImpossible(String),

    #[error("Migration {id} failed: {source}")]
    Action {
        id: String,
        #[source]
        source: Box<MigrationError>,
    },
}

impl MigrationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_connection_string(message: impl Into<String>) -> Self {
        Self::InvalidConnectionString {
            message: message.into(),
        }
    }

    pub(crate) fn action(id: &str, source: MigrationError) -> Self {
        Self::Action {
            id: id.to_string(),
            source: Box::new(source),
        }
    }
}
