//! # migrant-cli
//!
//! Command dispatch for the `migrant` binary. Crates that define their own
//! migrations call [`run`] from their own `main` with a filled registry:
//!
//! ```no_run
//! use migrant_engine::MigrationRegistry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut registry = MigrationRegistry::new();
//!     // migrations::m20240101000000_create_users::register(&mut registry);
//!     migrant_cli::run(registry, std::env::args_os()).await
//! }
//! ```

pub mod cli;
pub mod commands;

use anyhow::{Context, Result};
use std::ffi::OsString;

use cli::{parse_args, usage, Commands};
use commands::migrate;
use migrant_codegen::MigrationKind;
use migrant_core::MigrantConfig;
use migrant_engine::{EngineOptions, MigrationRegistry, MigrationTool, PgEngine, ToolSlot};

/// Load configuration from the environment and dispatch `args`
pub async fn run<I, T>(registry: MigrationRegistry, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let config = MigrantConfig::from_env()?;
    config.validate()?;
    run_with_config(&config, registry, args).await
}

pub async fn run_with_config<I, T>(
    config: &MigrantConfig,
    registry: MigrationRegistry,
    args: I,
) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let cli = parse_args(args)?;

    let Some(command) = cli.command else {
        tracing::info!("No command provided. Use -up, -down, -create or -create-tx");
        eprintln!("{}", usage());
        return Ok(());
    };

    let slot = ToolSlot::new();
    match command {
        Commands::Up => migrate::up(connect(&slot, config, registry).await?).await,
        Commands::Down => migrate::down(connect(&slot, config, registry).await?).await,
        Commands::Status => migrate::status(connect(&slot, config, registry).await?).await,
        Commands::Create { name } => {
            migrate::create(config, &name, MigrationKind::Plain)?;
            Ok(())
        }
        Commands::CreateTx { name } => {
            migrate::create(config, &name, MigrationKind::Transactional)?;
            Ok(())
        }
    }
}

pub fn engine_options(config: &MigrantConfig) -> EngineOptions {
    EngineOptions {
        table_name: config.migrations_table.clone(),
        use_transaction: config.use_transaction,
        validate_unknown_migrations: config.validate_unknown_migrations,
        ..EngineOptions::default()
    }
}

async fn connect<'a>(
    slot: &'a ToolSlot<PgEngine>,
    config: &MigrantConfig,
    registry: MigrationRegistry,
) -> Result<&'a MigrationTool<PgEngine>> {
    let database_url = config.require_database_url()?;
    let tool = slot
        .connect_postgres(database_url, engine_options(config), registry)
        .await
        .context("Failed to connect to the database")?;
    Ok(tool)
}
