use std::process::ExitCode;

use migrant_core::{init_logging, MigrantConfig};
use migrant_engine::MigrationRegistry;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match MigrantConfig::from_env().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.logging) {
        eprintln!("{}", err);
    }

    // The standalone binary carries no migrations of its own; it scaffolds
    // files and reports on the state table. Host crates embed `migrant_cli::run`.
    match migrant_cli::run_with_config(&config, MigrationRegistry::new(), std::env::args_os()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(usage_err) = err.downcast_ref::<clap::Error>() {
                usage_err.exit();
            }
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
