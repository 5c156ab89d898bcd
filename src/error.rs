use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    // External errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Decode(#[from] base64::DecodeError),
}

/// Failure taxonomy for lifecycle operations. Every variant is recoverable;
/// a rejected precondition leaves stored state untouched.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    #[error("record store failure: {0}")]
    Store(#[from] std::io::Error),
}

impl LifecycleError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> LifecycleError {
        LifecycleError::NotFound(kind, id.to_string())
    }

    pub fn invalid_state(msg: impl ToString) -> LifecycleError {
        LifecycleError::InvalidState(msg.to_string())
    }

    pub fn forbidden(msg: impl ToString) -> LifecycleError {
        LifecycleError::Forbidden(msg.to_string())
    }

    pub fn validation(msg: impl ToString) -> LifecycleError {
        LifecycleError::Validation(msg.to_string())
    }
}
