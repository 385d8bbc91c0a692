//! Error type shared by every fallible operation in the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by instance construction, solving and QAPLIB parsing.
#[derive(Debug, Error)]
pub enum QapError {
    /// A precondition on caller-supplied data or hyperparameters failed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// QAPLIB text could not be parsed.
    #[error("malformed QAPLIB data: {0}")]
    Parse(String),

    /// A QAPLIB file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed to open or read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl QapError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QapError::InvalidInput(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QapError>;
