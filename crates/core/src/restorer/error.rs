//! Error types for the restorer module.

use std::path::PathBuf;
use thiserror::Error;

use crate::process::ProcessError;

/// Errors raised by a database restorer.
#[derive(Debug, Error)]
pub enum RestorerError {
    /// The target database is held open by another process.
    #[error("Database {path} is in use")]
    Busy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A restore or disconnect tool could not be run.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A tool ran but reported failure.
    #[error("{tool} exited with code {code:?}: {stderr}")]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// I/O error on the target database.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RestorerError {
    /// Creates an I/O error, classifying lock and sharing violations as busy.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if is_busy_io_error(&source) {
            Self::Busy { path, source }
        } else {
            Self::Io { path, source }
        }
    }

    /// Whether this error means the target is in use.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// Whether an I/O error means the file is held open elsewhere.
///
/// Windows reports sharing (32) and lock (33) violations; other platforms
/// surface permission or busy errors.
pub fn is_busy_io_error(error: &std::io::Error) -> bool {
    if cfg!(windows) && matches!(error.raw_os_error(), Some(32) | Some(33)) {
        return true;
    }
    matches!(
        error.kind(),
        std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::ResourceBusy
    )
}
