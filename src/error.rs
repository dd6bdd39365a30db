//! Error types for the validated file tree.

use thiserror::Error;

/// Node construction and lookup errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("Parent path is not an ancestor of ({child}): ({parent})")]
    ConflictingPath { parent: String, child: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Node already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("No such path: {0}")]
    NoSuchPath(String),
}

/// Configuration errors (logging setup)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid logging config: {0}")]
    InvalidLogging(String),

    #[error("Log file error: {0}")]
    LogFile(String),
}
