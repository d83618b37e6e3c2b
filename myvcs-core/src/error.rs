use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

use crate::hash::ObjectId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not a repository (no control directory at {}). Run 'myvcs init' first.", .0.display())]
    NotARepository(PathBuf),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("{0} is already staged")]
    AlreadyStaged(String),

    #[error("Nothing to commit. Use 'myvcs add <file>' first.")]
    NothingToCommit,

    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Commit fragment '{fragment}' is ambiguous: matches {}", .candidates.join(", "))]
    AmbiguousCommit {
        fragment: String,
        candidates: Vec<String>,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Commit message is {len} bytes long, maximum is {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("Corrupt commit log at line {line}: {reason}")]
    CorruptLog { line: usize, reason: String },

    #[error("Unsupported commit log version: {0}")]
    UnsupportedLogVersion(String),

    #[error("Repository is locked by another process ({})", .0.display())]
    Locked(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {}: {source}", .path.display())]
    PathIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Out of memory while building history: {0}")]
    ResourceExhausted(#[from] TryReserveError),
}

impl Error {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::PathIo { path, source }
    }

    pub(crate) fn corrupt(line: usize, reason: impl Into<String>) -> Error {
        Error::CorruptLog {
            line,
            reason: reason.into(),
        }
    }
}
