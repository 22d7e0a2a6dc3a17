//! Error types for lydia-curator
//!
//! Validation never fails for lack of information; only unreadable
//! directories surface here. Mutation failures abort that single
//! mutation and are caught at the per-folder boundary by the driver.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::services::name_inference::InferenceError;

/// Filesystem operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Rename,
    Delete,
    Move,
    CreateDir,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::List => "list",
            Operation::Rename => "rename",
            Operation::Delete => "delete",
            Operation::Move => "move",
            Operation::CreateDir => "create directory",
            Operation::Write => "write",
        };
        write!(f, "{}", name)
    }
}

/// Curator error type
#[derive(Debug, Error)]
pub enum CurateError {
    /// Underlying filesystem failure
    #[error("Failed to {operation} {}: {source}", path.display())]
    Io {
        operation: Operation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rename or move destination already exists
    #[error("Destination already exists: {}", path.display())]
    NameCollision { path: PathBuf },

    /// Target basename cannot be used as a single path component
    #[error("Unsafe folder name: '{0}'")]
    UnsafeName(String),

    /// Year/title could not be derived
    #[error("Inference failed for {}: {source}", path.display())]
    Inference {
        path: PathBuf,
        #[source]
        source: InferenceError,
    },

    /// Folder handle refers to a directory that was already deleted
    #[error("Folder was deleted: {}", path.display())]
    FolderDeleted { path: PathBuf },

    /// Inventory serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CurateError {
    /// Wrap an I/O error with the operation and path it concerns
    pub fn io(operation: Operation, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CurateError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Result type for curator operations
pub type CurateResult<T> = Result<T, CurateError>;
