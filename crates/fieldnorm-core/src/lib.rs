//! Field normalization engine.
//!
//! [`normalize`] takes a [`RawTable`](fieldnorm_model::RawTable) and a
//! [`RunConfig`](fieldnorm_model::RunConfig) and returns a cleaned table of
//! identical shape plus a per-cell [`Report`](fieldnorm_model::Report).
//!
//! # Example
//!
//! ```
//! use fieldnorm_core::normalize;
//! use fieldnorm_model::{Column, FieldKind, RawTable, RunConfig};
//!
//! let table = RawTable::from_columns(vec![Column::from_strs("amount", &["1,234.5", "x"])]);
//! let config = RunConfig::new().with_kind("amount", FieldKind::Number);
//! let (cleaned, report) = normalize(&table, &config).unwrap();
//! assert_eq!(cleaned.cell(0, "amount"), Some("1234.50"));
//! assert_eq!(cleaned.cell(1, "amount"), Some("x"));
//! assert_eq!(report.summary.total_failed, 1);
//! ```

pub mod orchestrator;
pub mod pipeline;

pub use orchestrator::{detect_columns, normalize, normalize_with};
pub use pipeline::{ColumnOutput, run_column};
