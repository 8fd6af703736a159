//! # migrant-engine
//!
//! Migrations written as Rust closures over a PostgreSQL connection.
//!
//! Host crates build a [`MigrationRegistry`], hand it to a [`MigrationTool`]
//! together with an engine, and let the tool apply or roll back. Applied
//! state lives in a table owned by the engine ([`PgEngine`] by default).

pub mod connection;
pub mod error;
pub mod migrations;

pub use connection::ConnectionString;
pub use error::{MigrationError, MigrationResult};
pub use migrations::*;

// Generated migration files reach sqlx through this crate.
pub use sqlx;
