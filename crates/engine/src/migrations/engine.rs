//! The engine seam: applies and rolls back migrations and keeps track of
//! which ones have run.

use async_trait::async_trait;
use std::collections::HashSet;

use super::definitions::{Migration, MigrationRunResult, RollbackResult};
use crate::error::{MigrationError, MigrationResult};

#[async_trait]
pub trait MigrationEngine: Send + Sync {
    /// Apply, in the given order, every migration not yet recorded as applied
    async fn migrate(&self, migrations: &[&Migration]) -> MigrationResult<MigrationRunResult>;

    /// Undo the most recently applied migration among `migrations`
    async fn rollback_last(&self, migrations: &[&Migration]) -> MigrationResult<RollbackResult>;

    /// IDs recorded as applied
    async fn applied_ids(&self) -> MigrationResult<HashSet<String>>;
}

/// Reject empty and duplicated IDs
pub fn validate_migrations(migrations: &[&Migration]) -> MigrationResult<()> {
    let mut seen = HashSet::new();
    for migration in migrations {
        if migration.id.is_empty() {
            return Err(MigrationError::MissingId);
        }
        if !seen.insert(migration.id.as_str()) {
            return Err(MigrationError::DuplicateId(migration.id.clone()));
        }
    }
    Ok(())
}

/// Migrations not yet applied, in the given order
pub fn pending<'a>(migrations: &[&'a Migration], applied: &HashSet<String>) -> Vec<&'a Migration> {
    migrations
        .iter()
        .copied()
        .filter(|m| !applied.contains(&m.id))
        .collect()
}

/// Applied IDs that no given migration carries, sorted
pub fn unknown_applied(migrations: &[&Migration], applied: &HashSet<String>) -> Vec<String> {
    let known: HashSet<&str> = migrations.iter().map(|m| m.id.as_str()).collect();
    let mut unknown: Vec<String> = applied
        .iter()
        .filter(|id| !known.contains(id.as_str()))
        .cloned()
        .collect();
    unknown.sort();
    unknown
}

/// The applied migration with the greatest ID.
///
/// IDs are fixed-width timestamps, so the greatest applied ID is the most
/// recently applied migration whatever order the caller passed them in.
pub fn last_applied<'a>(
    migrations: &[&'a Migration],
    applied: &HashSet<String>,
) -> Option<&'a Migration> {
    migrations
        .iter()
        .copied()
        .filter(|m| applied.contains(&m.id))
        .max_by(|a, b| a.id.cmp(&b.id))
}
