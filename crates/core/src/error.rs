use thiserror::Error;

use crate::config::ConfigError;

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type for the migrant tool
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Logging error: {message}")]
    Logging { message: String },
}

impl CoreError {
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}
