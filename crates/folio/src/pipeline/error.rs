use thiserror::Error;

use crate::job::{StepId, TransitionError, ValidationError};

/// Why a job failed. Vendor errors pass through unchanged so the job's error
/// string keeps the vendor prefix.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Content(#[from] crate::content::ContentError),

    #[error(transparent)]
    Storage(#[from] crate::storage::StorageError),

    #[error(transparent)]
    Deploy(#[from] crate::deploy::DeployError),

    #[error("Cancelled by user")]
    Cancelled,

    #[error("Invalid job transition: {0}")]
    Transition(#[from] TransitionError),

    #[error("Step '{0}' ran before its inputs were produced")]
    MissingStepOutput(StepId),
}
