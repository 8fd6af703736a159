//! Migration Definitions - Core types for migrations
//!
//! Defines `Migration`, the engine options, and the results returned by
//! the engine operations.

use sqlx::PgConnection;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::{MigrationError, MigrationResult};

/// Future returned by a migration action, borrowing the connection for `'c`
pub type ActionFuture<'c> = Pin<Box<dyn Future<Output = MigrationResult<()>> + Send + 'c>>;

/// A forward or backward migration step
pub type MigrationAction =
    Box<dyn for<'c> Fn(&'c mut PgConnection) -> ActionFuture<'c> + Send + Sync>;

/// A database migration defined in code
pub struct Migration {
    /// Unique identifier (a `YYYYMMDDHHMMSS` timestamp for generated files)
    pub id: String,
    /// Human-readable description
    pub description: String,
    migrate: MigrationAction,
    rollback: Option<MigrationAction>,
}

impl Migration {
    /// Create a migration with a forward action and no rollback
    pub fn new<F>(id: impl Into<String>, description: impl Into<String>, migrate: F) -> Self
    where
        F: for<'c> Fn(&'c mut PgConnection) -> ActionFuture<'c> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            description: description.into(),
            migrate: Box::new(migrate),
            rollback: None,
        }
    }

    /// Attach the backward action
    pub fn with_rollback<F>(mut self, rollback: F) -> Self
    where
        F: for<'c> Fn(&'c mut PgConnection) -> ActionFuture<'c> + Send + Sync + 'static,
    {
        self.rollback = Some(Box::new(rollback));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn has_rollback(&self) -> bool {
        self.rollback.is_some()
    }

    /// Run the forward action on `conn`
    pub async fn run_migrate(&self, conn: &mut PgConnection) -> MigrationResult<()> {
        (self.migrate)(conn).await
    }

    /// Run the backward action on `conn`
    pub async fn run_rollback(&self, conn: &mut PgConnection) -> MigrationResult<()> {
        match &self.rollback {
            Some(rollback) => rollback(conn).await,
            None => Err(MigrationError::RollbackImpossible(self.id.clone())),
        }
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("has_rollback", &self.has_rollback())
            .finish()
    }
}

/// Fixed options of the migration engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Table recording applied migrations
    pub table_name: String,
    /// Column holding the migration ID
    pub id_column_name: String,
    /// Width of the ID column
    pub id_column_size: u32,
    /// Run each migration inside its own transaction
    pub use_transaction: bool,
    /// Fail when the table holds IDs that are not registered
    pub validate_unknown_migrations: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            table_name: "migrations".to_string(),
            id_column_name: "id".to_string(),
            id_column_size: 255,
            use_transaction: true,
            validate_unknown_migrations: false,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> MigrationResult<()> {
        for (field, value) in [
            ("table_name", &self.table_name),
            ("id_column_name", &self.id_column_name),
        ] {
            if !is_identifier(value) {
                return Err(MigrationError::configuration(format!(
                    "{} '{}' must be a plain SQL identifier",
                    field, value
                )));
            }
        }

        if self.id_column_size == 0 {
            return Err(MigrationError::configuration(
                "id_column_size must be greater than zero",
            ));
        }

        Ok(())
    }

    /// SQL to create the migrations tracking table
    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({} VARCHAR({}) PRIMARY KEY)",
            self.table_name, self.id_column_name, self.id_column_size
        )
    }

    /// SQL to list applied migration IDs
    pub fn applied_ids_sql(&self) -> String {
        format!("SELECT {} FROM {}", self.id_column_name, self.table_name)
    }

    /// SQL to record a migration as applied
    pub fn record_migration_sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ($1)",
            self.table_name, self.id_column_name
        )
    }

    /// SQL to remove a migration record
    pub fn remove_migration_sql(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {} = $1",
            self.table_name, self.id_column_name
        )
    }
}

fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Order in which the registry is handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Result of running migrations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationRunResult {
    /// IDs of migrations that were applied, in order
    pub applied: Vec<String>,
    /// Number of migrations that were already applied
    pub skipped: usize,
}

/// Result of rolling back the last migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackResult {
    pub rolled_back: String,
}

/// Whether a registered migration has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub id: String,
    pub description: String,
    pub applied: bool,
}

/// Registered migrations with their state, plus applied IDs the registry
/// does not know about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    pub migrations: Vec<MigrationState>,
    pub unknown_applied: Vec<String>,
}

impl MigrationStatus {
    pub fn pending_count(&self) -> usize {
        self.migrations.iter().filter(|m| !m.applied).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = EngineOptions::default();
        assert_eq!(options.table_name, "migrations");
        assert_eq!(options.id_column_name, "id");
        assert_eq!(options.id_column_size, 255);
        assert!(options.use_transaction);
        assert!(!options.validate_unknown_migrations);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_options_sql() {
        let options = EngineOptions::default();
        assert_eq!(
            options.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS migrations (id VARCHAR(255) PRIMARY KEY)"
        );
        assert_eq!(options.applied_ids_sql(), "SELECT id FROM migrations");
        assert_eq!(
            options.record_migration_sql(),
            "INSERT INTO migrations (id) VALUES ($1)"
        );
        assert_eq!(
            options.remove_migration_sql(),
            "DELETE FROM migrations WHERE id = $1"
        );
    }

    #[test]
    fn test_options_reject_unsafe_identifiers() {
        let options = EngineOptions {
            table_name: "migrations; DROP TABLE users".to_string(),
            ..EngineOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(MigrationError::Configuration { .. })
        ));

        let options = EngineOptions {
            id_column_name: "1id".to_string(),
            ..EngineOptions::default()
        };
        assert!(options.validate().is_err());

        let options = EngineOptions {
            id_column_size: 0,
            ..EngineOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_migration_debug_and_rollback_flag() {
        let migration = Migration::new("20240101000000", "create users", |_| {
            Box::pin(async { Ok(()) })
        });
        assert!(!migration.has_rollback());

        let migration = migration.with_rollback(|_| Box::pin(async { Ok(()) }));
        assert!(migration.has_rollback());
        assert_eq!(
            format!("{:?}", migration),
            r#"Migration { id: "20240101000000", description: "create users", has_rollback: true }"#
        );
    }
}
