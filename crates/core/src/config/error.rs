use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for the config module.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading or validating an environment configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {} does not exist", path.display())]
    Missing { path: PathBuf },

    #[error("Malformed configuration in {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Configuration declares environment '{found}' but '{expected}' was requested")]
    EnvironmentMismatch { expected: String, found: String },

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("'{field}' still holds a placeholder value; set it before deploying")]
    Placeholder { field: &'static str },

    #[error("Unknown environment '{0}' (expected 'dev' or 'prod')")]
    UnknownEnvironment(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
