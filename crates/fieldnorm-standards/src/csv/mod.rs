#![deny(unsafe_code)]

//! Parsers for the reference CSV files.
//!
//! Parsers take raw bytes so the embedded tables and on-disk overrides go
//! through the same code path; `path` is only used in error messages.

pub mod calling_codes;
pub mod countries;
pub mod subdivisions;

use std::path::Path;

use crate::error::StandardsError;

fn header_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn get_string(row: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|list| {
            list.split(';')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn csv_error(path: &Path, error: &csv::Error) -> StandardsError {
    StandardsError::Csv {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

fn line_of(row: &csv::StringRecord) -> u64 {
    row.position().map_or(0, csv::Position::line)
}

fn read_records(
    bytes: &[u8],
    path: &Path,
    required: &[&str],
) -> Result<(csv::StringRecord, Vec<csv::StringRecord>), StandardsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, &e))?
        .clone();
    for column in required {
        if header_index(&headers, column).is_none() {
            return Err(StandardsError::Csv {
                path: path.to_path_buf(),
                message: format!("missing column `{column}`"),
            });
        }
    }
    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(row.map_err(|e| csv_error(path, &e))?);
    }
    Ok((headers, rows))
}

fn required_field(
    row: &csv::StringRecord,
    idx: Option<usize>,
    column: &str,
    path: &Path,
) -> Result<String, StandardsError> {
    get_string(row, idx).ok_or_else(|| StandardsError::InvalidRecord {
        path: path.to_path_buf(),
        line: line_of(row),
        message: format!("empty `{column}`"),
    })
}
