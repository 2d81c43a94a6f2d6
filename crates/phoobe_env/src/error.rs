//! Error types for environment loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for environment operations.
pub type EnvResult<T> = Result<T, EnvError>;

/// Errors that can occur while loading an environment description.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Environment description not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid environment description {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid {kind} '{name}': {message}")]
    InvalidEntry {
        kind: &'static str,
        name: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvError {
    pub(crate) fn invalid(kind: &'static str, name: impl Into<String>, message: impl Into<String>) -> Self {
        EnvError::InvalidEntry {
            kind,
            name: name.into(),
            message: message.into(),
        }
    }
}
