//! Error types for table and configuration ingestion.

use std::path::PathBuf;

use fieldnorm_model::{ConfigError, StructuralError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Table Errors ===
    #[error("failed to write table: {message}")]
    CsvWrite { message: String },

    #[error("{path}: {source}")]
    Structure {
        path: PathBuf,
        #[source]
        source: StructuralError,
    },

    #[error("unsupported delimiter `{value}` (expected `,`, `;` or tab)")]
    InvalidDelimiter { value: String },

    // === Configuration Errors ===
    #[error("invalid configuration {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("invalid configuration {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

impl IngestError {
    /// Maps an open/read failure, singling out missing files.
    pub(crate) fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Whether the input table itself is malformed, as opposed to unreadable.
    pub fn is_structural(&self) -> bool {
        matches!(self, IngestError::Structure { .. })
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
