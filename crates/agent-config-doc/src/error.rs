//! Error types for loading configuration documents.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for document loading.
pub type Result<T> = std::result::Result<T, DocError>;

/// Errors that can occur while turning text into a [`crate::ConfigNode`].
#[derive(Debug, Error)]
pub enum DocError {
    /// YAML/JSON syntax error
    #[error("parse error at line {line}, column {col}: {message}")]
    Parse {
        message: String,
        line: usize,
        col: usize,
    },

    /// The input held no document at all
    #[error("no document found")]
    Empty,

    /// The file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<yaml_rust2::ScanError> for DocError {
    fn from(err: yaml_rust2::ScanError) -> Self {
        let marker = err.marker();
        DocError::Parse {
            message: err.info().to_string(),
            line: marker.line() + 1,
            col: marker.col() + 1,
        }
    }
}
