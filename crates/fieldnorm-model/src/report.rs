use serde::{Deserialize, Serialize};

use crate::kind::{ErrorKind, FieldKind};

/// Why a cell could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFailure {
    /// Raw text exactly as it appeared in the input.
    pub original: String,
    pub kind: ErrorKind,
    /// Human-readable explanation.
    pub reason: String,
}

impl CellFailure {
    pub fn new(original: impl Into<String>, kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Outcome of normalizing one non-empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellResult {
    Ok(String),
    Failed(CellFailure),
}

impl CellResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CellResult::Ok(_))
    }

    pub fn canonical(&self) -> Option<&str> {
        match self {
            CellResult::Ok(value) => Some(value),
            CellResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&CellFailure> {
        match self {
            CellResult::Ok(_) => None,
            CellResult::Failed(failure) => Some(failure),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.failure().map(|failure| failure.kind)
    }

    /// Text written to the cleaned table: canonical on success, original on failure.
    pub fn cleaned_text(&self) -> &str {
        match self {
            CellResult::Ok(value) => value,
            CellResult::Failed(failure) => &failure.original,
        }
    }
}

impl From<Result<String, CellFailure>> for CellResult {
    fn from(result: Result<String, CellFailure>) -> Self {
        match result {
            Ok(value) => CellResult::Ok(value),
            Err(failure) => CellResult::Failed(failure),
        }
    }
}

/// How the column's kind was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Detection {
    /// Kind named explicitly in the column configuration.
    Override,
    /// Kind inferred from a sample.
    Detected { ratio: f64, sampled: usize },
    /// No candidate cleared the threshold.
    Undecided {
        best: Option<FieldKind>,
        ratio: f64,
        sampled: usize,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCounts {
    pub ok: usize,
    pub failed: usize,
    pub skipped_empty: usize,
    /// Non-empty cells of an unrecognized column, copied unchanged.
    pub passed_through: usize,
}

impl ColumnCounts {
    pub fn total(&self) -> usize {
        self.ok + self.failed + self.skipped_empty + self.passed_through
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCell {
    pub row: usize,
    pub result: CellResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWarning {
    pub kind: ErrorKind,
    pub message: String,
}

/// Per-column outcome. Successful cells are only reflected in the counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub column: String,
    pub kind: FieldKind,
    pub detection: Detection,
    pub counts: ColumnCounts,
    pub failures: Vec<FailedCell>,
    pub warnings: Vec<ColumnWarning>,
}

impl ColumnReport {
    pub fn new(column: impl Into<String>, kind: FieldKind, detection: Detection) -> Self {
        Self {
            column: column.into(),
            kind,
            detection,
            counts: ColumnCounts::default(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.counts.failed > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_cells: usize,
    pub total_ok: usize,
    pub total_failed: usize,
    pub total_skipped_empty: usize,
    pub total_passed_through: usize,
}

impl Summary {
    pub fn from_columns(columns: &[ColumnReport]) -> Self {
        let mut summary = Self::default();
        for column in columns {
            summary.total_cells += column.counts.total();
            summary.total_ok += column.counts.ok;
            summary.total_failed += column.counts.failed;
            summary.total_skipped_empty += column.counts.skipped_empty;
            summary.total_passed_through += column.counts.passed_through;
        }
        summary
    }
}

/// Identity of the lookup tables used for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceInfo {
    pub version: String,
    pub fingerprint: String,
}

/// Terminal state of a run that was not aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Clean,
    PartialFailures,
}

impl RunStatus {
    /// Batch exit code; structural failures exit with 1 at the boundary.
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Clean => 0,
            RunStatus::PartialFailures => 2,
        }
    }
}

/// Flattened failure for machine consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord<'a> {
    pub row: usize,
    pub column: &'a str,
    pub kind: ErrorKind,
    pub original: &'a str,
    pub reason: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub columns: Vec<ColumnReport>,
    pub summary: Summary,
    pub reference: ReferenceInfo,
}

impl Report {
    pub fn new(columns: Vec<ColumnReport>, reference: ReferenceInfo) -> Self {
        let summary = Summary::from_columns(&columns);
        Self {
            columns,
            summary,
            reference,
        }
    }

    pub fn status(&self) -> RunStatus {
        if self.summary.total_failed == 0 {
            RunStatus::Clean
        } else {
            RunStatus::PartialFailures
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|column| column.column == name)
    }

    /// All failing (row, column, reason) triples in column then row order.
    pub fn failures(&self) -> impl Iterator<Item = FailureRecord<'_>> + '_ {
        self.columns.iter().flat_map(|column| {
            column.failures.iter().filter_map(move |cell| {
                cell.result.failure().map(|failure| FailureRecord {
                    row: cell.row,
                    column: &column.column,
                    kind: failure.kind,
                    original: &failure.original,
                    reason: &failure.reason,
                })
            })
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = (&str, &ColumnWarning)> + '_ {
        self.columns.iter().flat_map(|column| {
            column
                .warnings
                .iter()
                .map(move |warning| (column.column.as_str(), warning))
        })
    }
}
