//! Errors raised while reading a session folder.

use std::path::PathBuf;

use clickbox_common::error::ClickboxError;

/// Errors that can occur when loading a session folder.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Required input missing: {path}")]
    MissingInput { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Column '{column}' missing from header of {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid {column} value '{value}' at {path}:{line}")]
    InvalidField {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    #[error("No alignment timestamp after the header in {path}")]
    MissingReference { path: PathBuf },

    #[error("Invalid alignment timestamp '{value}' in {path}")]
    InvalidReference { path: PathBuf, value: String },
}

impl SessionError {
    /// Whether this error means an input file was absent rather than
    /// malformed.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}

impl From<SessionError> for ClickboxError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MissingInput { path } => ClickboxError::FileNotFound { path },
            other => ClickboxError::session(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_maps_to_file_not_found() {
        let err = SessionError::MissingInput {
            path: PathBuf::from("/sessions/a/events.csv"),
        };
        assert!(err.is_missing_input());
        match ClickboxError::from(err) {
            ClickboxError::FileNotFound { path } => {
                assert_eq!(path, PathBuf::from("/sessions/a/events.csv"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_errors_keep_location_in_message() {
        let err = SessionError::InvalidField {
            path: PathBuf::from("events.csv"),
            line: 4,
            column: "timestamp".to_string(),
            value: "soon".to_string(),
        };
        let top = ClickboxError::from(err);
        assert_eq!(
            top.to_string(),
            "Session error: Invalid timestamp value 'soon' at events.csv:4"
        );
    }
}
