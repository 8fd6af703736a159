//! Migration System
//!
//! Definitions, the registry, the engine seam with its PostgreSQL
//! implementation, and the tool that ties them together.

pub mod definitions;
pub mod engine;
pub mod postgres;
pub mod registry;
pub mod tool;

pub use definitions::*;
pub use engine::MigrationEngine;
pub use postgres::PgEngine;
pub use registry::MigrationRegistry;
pub use tool::{MigrationTool, ToolSlot};
