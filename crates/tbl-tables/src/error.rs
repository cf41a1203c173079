//! Error types for table loading.
//!
//! Failures inside a single file are [`tbl_parse::ParseError`]s and are
//! collected per file in a [`crate::LoadOutcome`]. The errors here stop a
//! load before any overlay is parsed.

use tbl_parse::PathType;
use thiserror::Error;

/// Errors that prevent a modular load from running.
#[derive(Debug, Error)]
pub enum TableError {
    // === Pattern Errors ===
    /// The overlay filename pattern is not a valid glob.
    #[error("invalid overlay pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    // === File Errors ===
    /// The overlay directory could not be listed.
    #[error("failed to list {path_type:?} files: {source}")]
    ListFiles {
        path_type: PathType,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for table loading.
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_error_display() {
        let err = TableError::ListFiles {
            path_type: PathType::Tables,
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().starts_with("failed to list Tables files"));
    }
}
