#![deny(unsafe_code)]

use std::path::Path;

use serde::Serialize;

use super::{get_string, header_index, line_of, read_records, required_field, split_list};
use crate::error::StandardsError;
use crate::names::{NameKey, match_key};

/// ISO 3166-2 subdivision of a country.
#[derive(Debug, Clone, Serialize)]
pub struct Subdivision {
    /// Alpha-2 code of the parent country.
    pub country: String,
    /// Subdivision part of the ISO code (`CA` in `US-CA`).
    pub code: String,
    pub name: String,
    /// Abbreviations and English or local names.
    pub aliases: Vec<String>,
    #[serde(skip)]
    pub(crate) name_key: String,
    #[serde(skip)]
    pub(crate) alias_keys: Vec<NameKey>,
}

impl Subdivision {
    pub fn new(
        country: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        aliases: Vec<String>,
    ) -> Self {
        let name = name.into();
        Self {
            country: country.into(),
            code: code.into(),
            name_key: match_key(&name),
            alias_keys: aliases
                .iter()
                .map(String::as_str)
                .map(NameKey::new)
                .collect(),
            name,
            aliases,
        }
    }

    /// Full ISO 3166-2 code, e.g. `DE-BY`.
    pub fn iso_code(&self) -> String {
        format!("{}-{}", self.country, self.code)
    }

    /// Whether the code is purely numeric (`AT-9`, `IT-21`).
    pub fn has_numeric_code(&self) -> bool {
        self.code.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Parses `subdivisions.csv` (`country,code,name,aliases`).
pub fn parse_subdivisions_csv(
    bytes: &[u8],
    path: &Path,
) -> Result<Vec<Subdivision>, StandardsError> {
    let (headers, rows) = read_records(bytes, path, &["country", "code", "name", "aliases"])?;
    let idx_country = header_index(&headers, "country");
    let idx_code = header_index(&headers, "code");
    let idx_name = header_index(&headers, "name");
    let idx_aliases = header_index(&headers, "aliases");

    let mut subdivisions = Vec::with_capacity(rows.len());
    for row in &rows {
        let country = required_field(row, idx_country, "country", path)?;
        let code = required_field(row, idx_code, "code", path)?;
        let valid = (1..=3).contains(&code.len())
            && code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !valid {
            return Err(StandardsError::InvalidRecord {
                path: path.to_path_buf(),
                line: line_of(row),
                message: format!("`{code}` is not a 1-3 character subdivision code"),
            });
        }
        subdivisions.push(Subdivision::new(
            country,
            code,
            required_field(row, idx_name, "name", path)?,
            split_list(get_string(row, idx_aliases)),
        ));
    }
    Ok(subdivisions)
}
