//! Data model for the field normalization engine.
//!
//! - **table**: raw and cleaned tables (column-major, row-aligned)
//! - **kind**: field kinds and the error taxonomy
//! - **options**: run configuration and per-column overrides
//! - **report**: cell results, column reports and the run summary
//! - **error**: structural and configuration errors that abort a run

pub mod error;
pub mod kind;
pub mod options;
pub mod report;
pub mod table;

pub use error::{ConfigError, EngineError, Result, StructuralError};
pub use kind::{ErrorKind, FieldKind};
pub use options::{
    AddressOptions, ColumnConfig, DateOptions, DateOrder, DetectorOptions, EngineOptions,
    FieldOptions, NumberOptions, PhoneOptions, RunConfig,
};
pub use report::{
    CellFailure, CellResult, ColumnCounts, ColumnReport, ColumnWarning, Detection, FailedCell,
    FailureRecord, ReferenceInfo, Report, RunStatus, Summary,
};
pub use table::{CleanedTable, Column, RawTable, is_empty_cell};
