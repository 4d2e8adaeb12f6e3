use thiserror::Error;

/// Unified error type for git-lineage operations
#[derive(Error, Debug)]
pub enum LineageError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-lineage
pub type Result<T> = std::result::Result<T, LineageError>;

impl LineageError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        LineageError::Config(msg.into())
    }

    /// Create an invalid-argument error with context
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        LineageError::InvalidArgument(msg.into())
    }
}
