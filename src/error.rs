//! Error types for minigit

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for minigit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in minigit operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input, rejected before any I/O happens
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("Corrupt object {id}: {reason}")]
    CorruptObject { id: String, reason: String },

    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn corrupt(id: impl ToString, reason: impl ToString) -> Self {
        Error::CorruptObject {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Returns a closure wrapping an I/O error with the path it happened at.
    pub(crate) fn storage(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
        move |source| Error::Storage {
            path: path.to_path_buf(),
            source,
        }
    }
}
