//! PostgreSQL engine - executes migrations and tracks them in a table
//!
//! Every migration runs inside its own transaction (when enabled) together
//! with the insert or delete of its tracking row, so a failed migration
//! leaves no record behind.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::PgConnection;
use std::collections::HashSet;

use super::definitions::{EngineOptions, Migration, MigrationRunResult, RollbackResult};
use super::engine::{last_applied, pending, unknown_applied, validate_migrations, MigrationEngine};
use crate::connection::ConnectionString;
use crate::error::{MigrationError, MigrationResult};

pub struct PgEngine {
    pool: PgPool,
    options: EngineOptions,
}

impl PgEngine {
    pub fn new(pool: PgPool, options: EngineOptions) -> MigrationResult<Self> {
        options.validate()?;
        Ok(Self { pool, options })
    }

    /// Open a single-connection pool for `connection`
    pub async fn connect(
        connection: &ConnectionString,
        options: EngineOptions,
    ) -> MigrationResult<Self> {
        options.validate()?;
        let connect_options = connection.to_connect_options()?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .map_err(MigrationError::Connection)?;

        tracing::debug!(connection = ?connection, "Connected to database");
        Ok(Self { pool, options })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    async fn ensure_migrations_table(&self) -> MigrationResult<()> {
        sqlx::query(&self.options.create_table_sql())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_applied_ids(&self) -> MigrationResult<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar(&self.options.applied_ids_sql())
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn apply_migration(&self, migration: &Migration) -> MigrationResult<()> {
        tracing::debug!(id = %migration.id, description = %migration.description, "Applying migration");

        if self.options.use_transaction {
            let mut transaction = self.pool.begin().await?;
            self.apply_on(&mut transaction, migration).await?;
            transaction.commit().await?;
        } else {
            let mut conn = self.pool.acquire().await?;
            self.apply_on(&mut conn, migration).await?;
        }
        Ok(())
    }

    async fn apply_on(&self, conn: &mut PgConnection, migration: &Migration) -> MigrationResult<()> {
        migration
            .run_migrate(&mut *conn)
            .await
            .map_err(|e| MigrationError::action(&migration.id, e))?;

        sqlx::query(&self.options.record_migration_sql())
            .bind(&migration.id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn rollback_migration(&self, migration: &Migration) -> MigrationResult<()> {
        tracing::debug!(id = %migration.id, description = %migration.description, "Rolling back migration");

        if self.options.use_transaction {
            let mut transaction = self.pool.begin().await?;
            self.rollback_on(&mut transaction, migration).await?;
            transaction.commit().await?;
        } else {
            let mut conn = self.pool.acquire().await?;
            self.rollback_on(&mut conn, migration).await?;
        }
        Ok(())
    }

    async fn rollback_on(&self, conn: &mut PgConnection, migration: &Migration) -> MigrationResult<()> {
        migration
            .run_rollback(&mut *conn)
            .await
            .map_err(|e| MigrationError::action(&migration.id, e))?;

        sqlx::query(&self.options.remove_migration_sql())
            .bind(&migration.id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MigrationEngine for PgEngine {
    async fn migrate(&self, migrations: &[&Migration]) -> MigrationResult<MigrationRunResult> {
        validate_migrations(migrations)?;
        self.ensure_migrations_table().await?;

        let applied = self.load_applied_ids().await?;
        if self.options.validate_unknown_migrations {
            if let Some(id) = unknown_applied(migrations, &applied).into_iter().next() {
                return Err(MigrationError::UnknownMigration(id));
            }
        }

        let to_apply = pending(migrations, &applied);
        let mut result = MigrationRunResult {
            applied: Vec::with_capacity(to_apply.len()),
            skipped: migrations.len() - to_apply.len(),
        };

        for migration in to_apply {
            self.apply_migration(migration).await?;
            result.applied.push(migration.id.clone());
        }

        Ok(result)
    }

    async fn rollback_last(&self, migrations: &[&Migration]) -> MigrationResult<RollbackResult> {
        if migrations.is_empty() {
            return Err(MigrationError::NoMigrationDefined);
        }

        self.ensure_migrations_table().await?;
        let applied = self.load_applied_ids().await?;

        let migration = last_applied(migrations, &applied).ok_or(MigrationError::NoRunMigration)?;
        if !migration.has_rollback() {
            return Err(MigrationError::RollbackImpossible(migration.id.clone()));
        }

        self.rollback_migration(migration).await?;

        Ok(RollbackResult {
            rolled_back: migration.id.clone(),
        })
    }

    async fn applied_ids(&self) -> MigrationResult<HashSet<String>> {
        self.ensure_migrations_table().await?;
        self.load_applied_ids().await
    }
}
