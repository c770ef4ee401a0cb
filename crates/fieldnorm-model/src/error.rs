use thiserror::Error;

use crate::kind::ErrorKind;

/// Table-level defects that abort a run with no partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("column `{column}` has {found} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column name `{name}`")]
    DuplicateColumn { name: String },

    #[error("column {index} has an empty header")]
    EmptyHeader { index: usize },

    #[error("row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("table is unreadable: {message}")]
    Unreadable { message: String },
}

/// Invalid run configuration, rejected before any cell is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{scope}: decimal mark and grouping mark must differ (both `{mark}`)")]
    SameMarks { scope: String, mark: char },

    #[error("{scope}: `{mark}` cannot be used as a number separator")]
    InvalidMark { scope: String, mark: char },

    #[error("{scope}: fraction digits {value} exceeds the maximum of {max}")]
    FractionDigitsTooLarge { scope: String, value: u32, max: u32 },

    #[error("{scope}: `{value}` is not a calling code (expected 1-3 digits)")]
    InvalidCallingCode { scope: String, value: String },

    #[error("{scope}: calling code +{code} is not in the reference table")]
    UnknownCallingCode { scope: String, code: String },

    #[error("{scope}: reference table version {requested} requested, {loaded} loaded")]
    TableVersionMismatch {
        scope: String,
        requested: String,
        loaded: String,
    },

    #[error("invalid detector settings: {message}")]
    InvalidDetector { message: String },

    #[error("unknown field kind `{value}`")]
    UnknownKind { value: String },
}

/// Errors that abort a whole normalization run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            EngineError::Structural(_) => Some(ErrorKind::StructuralTableError),
            EngineError::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
