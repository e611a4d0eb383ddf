//! Error types for muster-core.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of an [`Error`], for callers that branch on the
/// kind of failure rather than its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The multiplexer executable could not be started
    ProcessSpawnFailed,
    /// A multiplexer command exited with a non-zero status
    NonZeroExit,
    /// A project description cannot be turned into a session
    MalformedDescription,
    /// Reading or writing project documents failed
    Storage,
    /// Writing dry-run output failed
    Output,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to spawn `{program}`: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {status}: {stderr}")]
    NonZeroExit {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("malformed project description: {0}")]
    MalformedDescription(String),

    #[error("cannot tokenize command `{command}`: {source}")]
    Tokenize {
        command: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("project '{0}' does not exist")]
    ProjectNotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write command output: {0}")]
    Output(#[source] std::io::Error),

    #[error("invalid project document: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SpawnFailed { .. } => ErrorKind::ProcessSpawnFailed,
            Error::NonZeroExit { .. } => ErrorKind::NonZeroExit,
            Error::MalformedDescription(_) | Error::Tokenize { .. } | Error::Json(_) => {
                ErrorKind::MalformedDescription
            }
            Error::ProjectNotFound(_) | Error::Io { .. } => ErrorKind::Storage,
            Error::Output(_) => ErrorKind::Output,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
