//! Errors raised while reading responses of the apply tool.

use thiserror::Error;

/// Result type alias for the deploy module.
pub type Result<T> = std::result::Result<T, ResponseError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Unreadable {what} response: {reason}")]
    Unreadable { what: &'static str, reason: String },

    #[error("Stack '{0}' not found in describe-stacks response")]
    StackMissing(String),

    #[error("Stack output '{0}' is missing")]
    OutputMissing(&'static str),
}
