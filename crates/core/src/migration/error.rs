//! Error types for the migration module.

use thiserror::Error;

use crate::process::ProcessError;

/// Errors raised by a migration runner.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The migration program could not be run.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A migration command exited with a failure.
    #[error("{step} exited with code {code:?}: {stderr}")]
    CommandFailed {
        step: String,
        code: Option<i32>,
        stderr: String,
    },
}
