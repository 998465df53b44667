//! Error types shared across clickbox crates.

use std::path::PathBuf;

/// Top-level error type for clickbox operations.
#[derive(Debug, thiserror::Error)]
pub enum ClickboxError {
    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using ClickboxError.
pub type ClickboxResult<T> = Result<T, ClickboxError>;

impl ClickboxError {
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    /// Whether the error comes from the external media engine rather than
    /// from the folder's own inputs.
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Self::Render { .. })
    }
}
