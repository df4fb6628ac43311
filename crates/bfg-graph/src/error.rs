//! Error types for graph operations.

use crate::platform::Platform;
use bfg_content::ContentError;
use thiserror::Error;

/// Errors that can occur while resolving or cleaning up baselines.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Unknown platform: {0:?}")]
    UnknownPlatform(Platform),

    #[error("Platform {0:?} has no baseline")]
    NoAssignment(Platform),

    #[error("Convergence violation: {0}")]
    ConvergenceViolation(String),

    #[error(transparent)]
    Content(#[from] ContentError),
}

pub type Result<T> = std::result::Result<T, GraphError>;
