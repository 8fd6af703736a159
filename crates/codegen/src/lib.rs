//! # migrant-codegen
//!
//! Writes new migration source files from the built-in templates.

pub mod error;
pub mod generator;
pub mod templates;
pub mod writer;

pub use error::{CodegenError, CodegenResult};
pub use generator::*;
pub use templates::MigrationKind;
pub use writer::*;
