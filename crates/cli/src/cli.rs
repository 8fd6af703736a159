use clap::{CommandFactory, Parser, Subcommand};
use migrant_core::TOOL_NAME;
use std::ffi::OsString;

/// Subcommand names that may also be spelled `-name` or `--name`
const COMMAND_NAMES: [&str; 5] = ["up", "down", "create", "create-tx", "status"];

#[derive(Debug, Parser)]
#[command(name = TOOL_NAME)]
#[command(about = "Apply, roll back and scaffold code-defined database migrations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Apply all pending migrations
    Up,

    /// Roll back the last applied migration
    Down,

    /// Create a new migration file
    Create {
        /// Migration name (spaces become underscores)
        name: String,
    },

    /// Create a new migration file whose actions run in a nested transaction
    CreateTx {
        /// Migration name (spaces become underscores)
        name: String,
    },

    /// Show applied and pending migrations
    Status,
}

/// Rewrite a leading `-up`/`--up` style command into the bare subcommand
/// clap expects. Only the first argument after the program name is touched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if let Some(first) = args.get_mut(1) {
        let bare = first
            .to_str()
            .filter(|arg| arg.starts_with('-'))
            .map(|arg| arg.trim_start_matches('-'))
            .filter(|name| COMMAND_NAMES.contains(name))
            .map(OsString::from);
        if let Some(bare) = bare {
            *first = bare;
        }
    }

    args
}

pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Cli::try_parse_from(normalize_args(args))
}

pub fn usage() -> String {
    Cli::command().render_usage().to_string()
}
