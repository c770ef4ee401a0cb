#![deny(unsafe_code)]

use std::path::Path;

use serde::Serialize;

use super::{get_string, header_index, line_of, read_records, required_field, split_list};
use crate::error::StandardsError;
use crate::names::NameKey;

/// ISO 3166-1 country with the names it is recognised by.
#[derive(Debug, Clone, Serialize)]
pub struct Country {
    pub alpha2: String,
    pub alpha3: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub calling_code: Option<String>,
}

impl Country {
    /// Lookup keys for the name and every alias.
    pub fn name_keys(&self) -> impl Iterator<Item = NameKey> + '_ {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .map(NameKey::new)
    }
}

/// Parses `countries.csv` (`alpha2,alpha3,name,aliases,calling_code`).
pub fn parse_countries_csv(bytes: &[u8], path: &Path) -> Result<Vec<Country>, StandardsError> {
    let (headers, rows) = read_records(
        bytes,
        path,
        &["alpha2", "alpha3", "name", "aliases", "calling_code"],
    )?;
    let idx_alpha2 = header_index(&headers, "alpha2");
    let idx_alpha3 = header_index(&headers, "alpha3");
    let idx_name = header_index(&headers, "name");
    let idx_aliases = header_index(&headers, "aliases");
    let idx_calling = header_index(&headers, "calling_code");

    let mut countries = Vec::with_capacity(rows.len());
    for row in &rows {
        let alpha2 = required_field(row, idx_alpha2, "alpha2", path)?;
        let alpha3 = required_field(row, idx_alpha3, "alpha3", path)?;
        let valid_code = |code: &str, len: usize| {
            code.len() == len && code.bytes().all(|b| b.is_ascii_uppercase())
        };
        if !valid_code(&alpha2, 2) || !valid_code(&alpha3, 3) {
            return Err(StandardsError::InvalidRecord {
                path: path.to_path_buf(),
                line: line_of(row),
                message: format!("`{alpha2}`/`{alpha3}` are not ISO 3166-1 codes"),
            });
        }
        countries.push(Country {
            alpha2,
            alpha3,
            name: required_field(row, idx_name, "name", path)?,
            aliases: split_list(get_string(row, idx_aliases)),
            calling_code: get_string(row, idx_calling),
        });
    }
    Ok(countries)
}
