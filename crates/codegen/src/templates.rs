use regex::Regex;
use std::collections::HashMap;

use crate::error::{CodegenError, CodegenResult};

/// Which template a new migration file is generated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationKind {
    Plain,
    /// Each action body runs inside a nested transaction
    Transactional,
}

impl MigrationKind {
    pub fn template(self) -> &'static str {
        match self {
            MigrationKind::Plain => MIGRATION_TEMPLATE,
            MigrationKind::Transactional => TRANSACTIONAL_MIGRATION_TEMPLATE,
        }
    }
}

/// Substitute every `{{key}}` placeholder in `template`.
///
/// A placeholder left without a value in `context` is an error rather than
/// being written out verbatim.
pub fn render_template(template: &str, context: &HashMap<&str, String>) -> CodegenResult<String> {
    let mut result = template.to_string();

    for (key, value) in context {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    let leftover = Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").map_err(|e| {
        CodegenError::Template {
            message: format!("Regex error: {}", e),
        }
    })?;
    if let Some(cap) = leftover.captures(&result) {
        return Err(CodegenError::Template {
            message: format!("No value for placeholder '{}'", &cap[1]),
        });
    }

    Ok(result)
}

/// Render the template for `kind` with `id` as the migration ID
pub fn render_migration(id: &str, kind: MigrationKind) -> CodegenResult<String> {
    let mut context = HashMap::new();
    context.insert("id", id.to_string());
    render_template(kind.template(), &context)
}

pub static MIGRATION_TEMPLATE: &str = r#"use migrant_engine::{Migration, MigrationRegistry};

pub fn register(registry: &mut MigrationRegistry) {
    registry.register(
        Migration::new("{{id}}", "Add description of changes", |_tx| {
            Box::pin(async move {
                // Your migration logic goes here.
                Ok(())
            })
        })
        .with_rollback(|_tx| {
            Box::pin(async move {
                // Your rollback logic goes here.
                Ok(())
            })
        }),
    );
}
"#;

pub static TRANSACTIONAL_MIGRATION_TEMPLATE: &str = r#"use migrant_engine::sqlx::{self, Connection};
use migrant_engine::{Migration, MigrationRegistry};

pub fn register(registry: &mut MigrationRegistry) {
    registry.register(
        Migration::new("{{id}}", "Add description of changes", |tx| {
            Box::pin(async move {
                let mut nested = tx.begin().await?;
                // Replace with the first migration statement.
                sqlx::query("SELECT 1").execute(&mut *nested).await?;
                // Replace with the second migration statement.
                sqlx::query("SELECT 1").execute(&mut *nested).await?;
                nested.commit().await?;
                Ok(())
            })
        })
        .with_rollback(|tx| {
            Box::pin(async move {
                let mut nested = tx.begin().await?;
                // Replace with the first rollback statement.
                sqlx::query("SELECT 1").execute(&mut *nested).await?;
                // Replace with the second rollback statement.
                sqlx::query("SELECT 1").execute(&mut *nested).await?;
                nested.commit().await?;
                Ok(())
            })
        }),
    );
}
"#;
