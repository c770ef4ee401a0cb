use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

/// One named column of text cells. An empty string is an empty/missing cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn from_strs(name: impl Into<String>, cells: &[&str]) -> Self {
        Self::new(name, cells.iter().map(|cell| (*cell).to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Returns true when a cell counts as empty/missing.
pub fn is_empty_cell(value: &str) -> bool {
    value.trim().is_empty()
}

/// Column-major input table.
///
/// Constructors do not enforce row alignment so that callers can hand over
/// whatever they read; [`RawTable::validate`] reports structural defects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<Column>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Builds a table from a header and row-major records.
    ///
    /// Short records are padded with empty cells; records with more fields
    /// than the header are rejected.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, StructuralError> {
        let width = headers.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(StructuralError::RaggedRow {
                    row: row_idx,
                    expected: width,
                    found: row.len(),
                });
            }
            let mut fields = row.into_iter();
            for column in &mut columns {
                column.cells.push(fields.next().unwrap_or_default());
            }
        }
        Ok(Self { columns })
    }

    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Row count of the first column (0 for a table without columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn cell_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Checks column name uniqueness and row alignment.
    pub fn validate(&self) -> Result<(), StructuralError> {
        let mut seen = HashSet::new();
        for (index, column) in self.columns.iter().enumerate() {
            if column.name.trim().is_empty() {
                return Err(StructuralError::EmptyHeader { index });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(StructuralError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }
        let expected = self.row_count();
        for column in &self.columns {
            if column.len() != expected {
                return Err(StructuralError::RowCountMismatch {
                    column: column.name.clone(),
                    expected,
                    found: column.len(),
                });
            }
        }
        Ok(())
    }
}

/// Output table with the same shape as the [`RawTable`] it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedTable {
    pub columns: Vec<Column>,
}

impl CleanedTable {
    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.column(column)
            .and_then(|column| column.cells.get(row))
            .map(String::as_str)
    }

    /// Row-major view, in column order.
    pub fn row(&self, index: usize) -> Vec<&str> {
        self.columns
            .iter()
            .map(|column| column.cells.get(index).map_or("", String::as_str))
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        (0..self.row_count()).map(|index| self.row(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_pads_short_records() {
        let table = RawTable::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string()], vec!["2".to_string(), "x".to_string()]],
        )
        .expect("build table");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns[1].cells, vec!["", "x"]);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn from_rows_rejects_long_records() {
        let result = RawTable::from_rows(
            vec!["a".to_string()],
            vec![vec!["1".to_string(), "2".to_string()]],
        );
        assert_eq!(
            result,
            Err(StructuralError::RaggedRow {
                row: 0,
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn validate_reports_row_count_mismatch() {
        let table = RawTable::from_columns(vec![
            Column::from_strs("a", &["1", "2"]),
            Column::from_strs("b", &["x"]),
        ]);
        assert_eq!(
            table.validate(),
            Err(StructuralError::RowCountMismatch {
                column: "b".to_string(),
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn validate_reports_duplicate_names() {
        let table = RawTable::from_columns(vec![
            Column::from_strs("a", &["1"]),
            Column::from_strs("a", &["2"]),
        ]);
        assert!(matches!(
            table.validate(),
            Err(StructuralError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn cleaned_rows_follow_column_order() {
        let table = CleanedTable::from_columns(vec![
            Column::from_strs("a", &["1", "2"]),
            Column::from_strs("b", &["x", "y"]),
        ]);
        let rows: Vec<Vec<&str>> = table.rows().collect();
        assert_eq!(rows, vec![vec!["1", "x"], vec!["2", "y"]]);
        assert_eq!(table.cell(1, "b"), Some("y"));
    }
}
