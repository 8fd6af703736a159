use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::{CodegenError, CodegenResult};
use crate::templates::{render_migration, MigrationKind};
use crate::writer::CodeWriter;

/// Extension of generated migration files
pub const MIGRATION_EXTENSION: &str = "rs";

/// A migration file written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMigration {
    pub id: String,
    pub path: PathBuf,
}

/// Scaffolds migration files into a single directory
pub struct MigrationGenerator {
    migrations_dir: PathBuf,
    writer: CodeWriter,
}

impl MigrationGenerator {
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            writer: CodeWriter::new(),
        }
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    pub fn create_migration_file(&self, name: &str) -> CodegenResult<GeneratedMigration> {
        self.generate(name, MigrationKind::Plain)
    }

    pub fn create_transaction_migration_file(
        &self,
        name: &str,
    ) -> CodegenResult<GeneratedMigration> {
        self.generate(name, MigrationKind::Transactional)
    }

    /// Generate a migration file stamped with the current local time
    pub fn generate(&self, name: &str, kind: MigrationKind) -> CodegenResult<GeneratedMigration> {
        self.generate_at(name, kind, Local::now())
    }

    pub fn generate_at<Tz>(
        &self,
        name: &str,
        kind: MigrationKind,
        now: DateTime<Tz>,
    ) -> CodegenResult<GeneratedMigration>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        validate_name(name)?;

        let id = migration_id(&now);
        let path = self.migrations_dir.join(migration_filename(&id, name));
        let content = render_migration(&id, kind)?;

        self.writer.ensure_dir(&self.migrations_dir)?;
        self.writer.write_new(&path, &content)?;

        tracing::info!("Migration file created: {}", path.display());
        Ok(GeneratedMigration { id, path })
    }
}

/// `YYYYMMDDHHMMSS`, fixed width so IDs sort chronologically as strings
pub fn migration_id<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Spaces become underscores; every other character is kept as given
pub fn migration_filename(id: &str, name: &str) -> String {
    format!("{}_{}.{}", id, name.replace(' ', "_"), MIGRATION_EXTENSION)
}

fn validate_name(name: &str) -> CodegenResult<()> {
    if name.trim().is_empty() {
        return Err(CodegenError::InvalidName {
            name: name.to_string(),
            reason: "name cannot be empty".to_string(),
        });
    }
    if name.contains('/') || name.contains('\\') {
        return Err(CodegenError::InvalidName {
            name: name.to_string(),
            reason: "the name becomes part of the file name and cannot contain path separators"
                .to_string(),
        });
    }
    Ok(())
}
