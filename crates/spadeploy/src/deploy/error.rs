//! Error types for deploy runs.

use std::path::PathBuf;

use spadeploy_core::deploy::{ResponseError, Stage};
use spadeploy_core::template::ComposeError;
use thiserror::Error;

use crate::runner::RunnerError;
use crate::synth::WriteError;

/// Result type alias for the deploy module.
pub type Result<T> = std::result::Result<T, DeployError>;

/// Errors that abort a deploy.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("stage '{stage}' failed: {source}")]
    StageFailed { stage: Stage, source: StageError },

    #[error("Deployment cancelled by user")]
    UserCancelled,

    #[error("Confirmation prompt failed: {0}")]
    Prompt(String),
}

impl DeployError {
    /// The stage that failed, if the error came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DeployError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Why a single stage did not complete.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Command(#[from] RunnerError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("No {0} command configured")]
    NoCommand(&'static str),

    #[error("Build finished but {} does not exist", path.display())]
    MissingEntryDocument { path: PathBuf },

    #[error("Active credentials belong to account {found}, configuration targets {expected}")]
    AccountMismatch { expected: String, found: String },
}
