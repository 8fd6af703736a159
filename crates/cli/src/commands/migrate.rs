use anyhow::{Context, Result};
use migrant_codegen::{GeneratedMigration, MigrationGenerator, MigrationKind};
use migrant_core::MigrantConfig;
use migrant_engine::{MigrationEngine, MigrationStatus, MigrationTool};

pub async fn up<E: MigrationEngine>(tool: &MigrationTool<E>) -> Result<()> {
    tool.migrate_up().await.context("Migration failed")?;
    Ok(())
}

pub async fn down<E: MigrationEngine>(tool: &MigrationTool<E>) -> Result<()> {
    tool.migrate_down().await.context("Rollback failed")?;
    Ok(())
}

pub async fn status<E: MigrationEngine>(tool: &MigrationTool<E>) -> Result<()> {
    let status = tool
        .status()
        .await
        .context("Failed to read migration status")?;
    print!("{}", render_status(&status));
    Ok(())
}

pub fn create(config: &MigrantConfig, name: &str, kind: MigrationKind) -> Result<GeneratedMigration> {
    MigrationGenerator::new(&config.migrations_dir)
        .generate(name, kind)
        .context("Failed to create migration file")
}

pub fn render_status(status: &MigrationStatus) -> String {
    let mut out = String::from("Migration Status:\n================\n");

    if status.migrations.is_empty() {
        out.push_str("No migrations registered\n");
    }

    for migration in &status.migrations {
        let marker = if migration.applied { "applied" } else { "pending" };
        out.push_str(&format!(
            "  [{}] {} - {}\n",
            marker, migration.id, migration.description
        ));
    }

    for id in &status.unknown_applied {
        out.push_str(&format!("  [unknown] {} (applied, not registered)\n", id));
    }

    out.push_str(&format!(
        "\n{} applied, {} pending\n",
        status.migrations.len() - status.pending_count(),
        status.pending_count()
    ));
    out
}
