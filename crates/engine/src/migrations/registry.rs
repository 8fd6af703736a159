use super::definitions::{Migration, SortOrder};

/// Migrations collected before the tool runs, in registration order
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    migrations: Vec<Migration>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a migration. IDs are not checked here; the engine rejects
    /// empty and duplicate IDs when asked to migrate.
    pub fn register(&mut self, migration: Migration) {
        tracing::trace!(id = %migration.id, "Registered migration");
        self.migrations.push(migration);
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Migrations in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.iter()
    }

    /// Migrations stably sorted by ID; equal IDs keep registration order
    pub fn sorted(&self, order: SortOrder) -> Vec<&Migration> {
        let mut sorted: Vec<&Migration> = self.migrations.iter().collect();
        match order {
            SortOrder::Ascending => sorted.sort_by(|a, b| a.id.cmp(&b.id)),
            SortOrder::Descending => sorted.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        sorted
    }
}

impl Extend<Migration> for MigrationRegistry {
    fn extend<T: IntoIterator<Item = Migration>>(&mut self, iter: T) {
        for migration in iter {
            self.register(migration);
        }
    }
}
