#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use super::{get_string, header_index, line_of, read_records, required_field, split_list};
use crate::error::StandardsError;

/// One E.164 country calling code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallingCode {
    /// 1-3 digits, no leading `+`.
    pub code: String,
    /// ISO 3166-1 alpha-2 regions sharing the code.
    pub regions: Vec<String>,
    /// National trunk prefix dialled before domestic numbers, if any.
    pub trunk_prefix: Option<String>,
}

impl CallingCode {
    /// Removes the national trunk prefix from a domestic number.
    pub fn strip_trunk_prefix<'a>(&self, national: &'a str) -> &'a str {
        self.trunk_prefix
            .as_deref()
            .and_then(|prefix| national.strip_prefix(prefix))
            .unwrap_or(national)
    }
}

/// Parses `calling_codes.csv` (`code,regions,trunk_prefix`).
///
/// Codes must be 1-3 digits and no code may be a prefix of another, so a
/// number's calling code is always unambiguous.
pub fn parse_calling_codes_csv(
    bytes: &[u8],
    path: &Path,
) -> Result<BTreeMap<String, CallingCode>, StandardsError> {
    let (headers, rows) = read_records(bytes, path, &["code", "regions", "trunk_prefix"])?;
    let idx_code = header_index(&headers, "code");
    let idx_regions = header_index(&headers, "regions");
    let idx_trunk = header_index(&headers, "trunk_prefix");

    let mut codes: BTreeMap<String, CallingCode> = BTreeMap::new();
    for row in &rows {
        let code = required_field(row, idx_code, "code", path)?;
        let invalid = |message: String| StandardsError::InvalidRecord {
            path: path.to_path_buf(),
            line: line_of(row),
            message,
        };
        if !(1..=3).contains(&code.len()) || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!("calling code `{code}` is not 1-3 digits")));
        }
        let trunk_prefix = get_string(row, idx_trunk);
        if let Some(prefix) = &trunk_prefix
            && !prefix.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid(format!("trunk prefix `{prefix}` is not numeric")));
        }
        let entry = CallingCode {
            code: code.clone(),
            regions: split_list(get_string(row, idx_regions)),
            trunk_prefix,
        };
        if codes.insert(code.clone(), entry).is_some() {
            return Err(invalid(format!("duplicate calling code `{code}`")));
        }
    }

    for code in codes.keys() {
        for len in 1..code.len() {
            if codes.contains_key(&code[..len]) {
                return Err(StandardsError::Csv {
                    path: path.to_path_buf(),
                    message: format!("calling code `{code}` extends `{}`", &code[..len]),
                });
            }
        }
    }
    Ok(codes)
}
