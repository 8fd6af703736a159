use std::path::PathBuf;
use thiserror::Error;

pub type CodegenResult<T> = Result<T, CodegenError>;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid migration name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Template error: {message}")]
    Template { message: String },
}
