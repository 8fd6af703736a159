//! The migration tool: a registry bound to an engine.

use std::future::Future;
use tokio::sync::OnceCell;

use super::definitions::{
    EngineOptions, MigrationRunResult, MigrationState, MigrationStatus, RollbackResult, SortOrder,
};
use super::engine::{unknown_applied, MigrationEngine};
use super::postgres::PgEngine;
use super::registry::MigrationRegistry;
use crate::connection::ConnectionString;
use crate::error::{MigrationError, MigrationResult};

pub struct MigrationTool<E> {
    engine: E,
    registry: MigrationRegistry,
}

impl<E: MigrationEngine> MigrationTool<E> {
    pub fn new(engine: E, registry: MigrationRegistry) -> Self {
        Self { engine, registry }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    /// Apply every pending migration in ascending ID order.
    ///
    /// Returns `None` without touching the engine when nothing is registered.
    pub async fn migrate_up(&self) -> MigrationResult<Option<MigrationRunResult>> {
        if self.registry.is_empty() {
            tracing::info!("No migrations registered");
            return Ok(None);
        }

        let migrations = self.registry.sorted(SortOrder::Ascending);
        let result = self.engine.migrate(&migrations).await?;

        for id in &result.applied {
            tracing::debug!(id = %id, "Applied migration");
        }
        tracing::info!(
            applied = result.applied.len(),
            skipped = result.skipped,
            "Migrations applied successfully!"
        );
        Ok(Some(result))
    }

    /// Roll back the most recently applied migration.
    ///
    /// The registry is handed over in descending ID order; which migration
    /// gets undone is decided by the engine from its own applied state.
    pub async fn migrate_down(&self) -> MigrationResult<Option<RollbackResult>> {
        if self.registry.is_empty() {
            tracing::info!("No migrations registered");
            return Ok(None);
        }

        let migrations = self.registry.sorted(SortOrder::Descending);
        let result = self.engine.rollback_last(&migrations).await?;

        tracing::info!(id = %result.rolled_back, "Last migration rolled back successfully!");
        Ok(Some(result))
    }

    /// Applied/pending state of every registered migration.
    ///
    /// The state table is read even with an empty registry so applied IDs
    /// are still reported as unknown.
    pub async fn status(&self) -> MigrationResult<MigrationStatus> {
        if self.registry.is_empty() {
            tracing::info!("No migrations registered");
        }

        let migrations = self.registry.sorted(SortOrder::Ascending);
        let applied = self.engine.applied_ids().await?;

        Ok(MigrationStatus {
            migrations: migrations
                .iter()
                .map(|m| MigrationState {
                    id: m.id.clone(),
                    description: m.description.clone(),
                    applied: applied.contains(&m.id),
                })
                .collect(),
            unknown_applied: unknown_applied(&migrations, &applied),
        })
    }
}

struct SlotEntry<E> {
    connection_string: String,
    tool: MigrationTool<E>,
}

/// Holds the one tool a process builds.
///
/// The first call to [`ToolSlot::get_or_connect`] connects; every later
/// call returns that same tool and ignores its connection string. The slot
/// is owned by the caller, typically a local in `main`.
pub struct ToolSlot<E> {
    cell: OnceCell<SlotEntry<E>>,
}

impl<E> Default for ToolSlot<E> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }
}

impl<E: MigrationEngine> ToolSlot<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&MigrationTool<E>> {
        self.cell.get().map(|entry| &entry.tool)
    }

    pub async fn get_or_connect<F, Fut>(
        &self,
        connection_string: &str,
        connect: F,
    ) -> MigrationResult<&MigrationTool<E>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = MigrationResult<MigrationTool<E>>>,
    {
        if let Some(entry) = self.cell.get() {
            if entry.connection_string != connection_string {
                tracing::debug!("Migration tool already connected; ignoring new connection string");
            }
            return Ok(&entry.tool);
        }

        let entry = self
            .cell
            .get_or_try_init(|| async {
                let tool = connect(connection_string.to_string()).await?;
                Ok::<_, MigrationError>(SlotEntry {
                    connection_string: connection_string.to_string(),
                    tool,
                })
            })
            .await?;
        Ok(&entry.tool)
    }
}

impl ToolSlot<PgEngine> {
    /// Connect a [`PgEngine`] on first use. `registry` is dropped when the
    /// slot is already filled.
    pub async fn connect_postgres(
        &self,
        connection_string: &str,
        options: EngineOptions,
        registry: MigrationRegistry,
    ) -> MigrationResult<&MigrationTool<PgEngine>> {
        self.get_or_connect(connection_string, |dsn| async move {
            let connection = ConnectionString::parse(&dsn)?;
            let engine = PgEngine::connect(&connection, options).await?;
            Ok(MigrationTool::new(engine, registry))
        })
        .await
    }
}
