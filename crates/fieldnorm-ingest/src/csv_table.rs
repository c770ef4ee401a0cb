//! Delimited-text tables.
//!
//! Cells are kept byte-for-byte as read (no trimming) so failed cells can be
//! written back unchanged. Only header names are cleaned: a UTF-8 byte order
//! mark and surrounding whitespace are removed.

use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use fieldnorm_model::{CleanedTable, RawTable, StructuralError};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Field delimiter, used for both reading and writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
        }
    }

    /// Guesses the delimiter from a file extension (`.tsv` means tab).
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") {
            Some(Delimiter::Tab)
        } else if ext.eq_ignore_ascii_case("csv") {
            Some(Delimiter::Comma)
        } else {
            None
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delimiter::Comma => "comma",
            Delimiter::Semicolon => "semicolon",
            Delimiter::Tab => "tab",
        };
        f.write_str(name)
    }
}

impl FromStr for Delimiter {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "," | "comma" => Ok(Delimiter::Comma),
            ";" | "semicolon" => Ok(Delimiter::Semicolon),
            "\t" | "\\t" | "tab" => Ok(Delimiter::Tab),
            _ => Err(IngestError::InvalidDelimiter {
                value: value.to_string(),
            }),
        }
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

fn unreadable(path: &Path, message: impl Into<String>) -> IngestError {
    IngestError::Structure {
        path: path.to_path_buf(),
        source: StructuralError::Unreadable {
            message: message.into(),
        },
    }
}

fn csv_read_error(path: &Path, err: csv::Error) -> IngestError {
    let line = err.position().map(csv::Position::line);
    match err.into_kind() {
        csv::ErrorKind::Io(source) => IngestError::read(path, source),
        kind => {
            let message = match (line, kind) {
                (Some(line), csv::ErrorKind::Utf8 { .. }) => {
                    format!("line {line}: invalid UTF-8")
                }
                (Some(line), other) => format!("line {line}: {other:?}"),
                (None, other) => format!("{other:?}"),
            };
            unreadable(path, message)
        }
    }
}

/// Reads a table with a header row from a file.
pub fn read_table(path: &Path, delimiter: Delimiter) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| IngestError::read(path, source))?;
    read_table_from(file, delimiter, path)
}

/// Reads a table from any reader; `origin` names the source in errors.
pub fn read_table_from<R: Read>(reader: R, delimiter: Delimiter, origin: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(reader);

    let mut records = reader.records();
    let Some(header) = records.next() else {
        tracing::debug!(path = %origin.display(), "empty input");
        return Ok(RawTable::new());
    };
    let headers: Vec<String> = header
        .map_err(|err| csv_read_error(origin, err))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|err| csv_read_error(origin, err))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = RawTable::from_rows(headers, rows).map_err(|source| IngestError::Structure {
        path: origin.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %origin.display(),
        columns = table.column_count(),
        rows = table.row_count(),
        %delimiter,
        "table read"
    );
    Ok(table)
}

/// Writes a cleaned table with its header row, creating or replacing `path`.
pub fn write_table(path: &Path, table: &CleanedTable, delimiter: Delimiter) -> Result<()> {
    let file = File::create(path).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    write_table_to(file, table, delimiter)
}

/// Writes a cleaned table to any writer.
///
/// Fields are quoted only when they contain the delimiter, a quote or a
/// line break.
pub fn write_table_to<W: Write>(writer: W, table: &CleanedTable, delimiter: Delimiter) -> Result<()> {
    let write_err = |err: csv::Error| IngestError::CsvWrite {
        message: err.to_string(),
    };
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);
    if table.column_count() == 0 {
        return Ok(());
    }
    writer.write_record(table.headers()).map_err(write_err)?;
    for row in table.rows() {
        writer.write_record(row).map_err(write_err)?;
    }
    writer.flush().map_err(|err| IngestError::CsvWrite {
        message: err.to_string(),
    })?;
    Ok(())
}
