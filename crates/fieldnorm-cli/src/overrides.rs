//! Command-line overrides layered on top of a run configuration.
//!
//! Precedence, highest first: `--kind` and the other flags, then the
//! `[columns.<name>]` tables of the configuration file, then its
//! `[defaults]`, then built-in defaults. A flag such as `--decimal-mark`
//! replaces the run default, so a column table that sets the same knob
//! still wins for that column.

use fieldnorm_model::{ColumnConfig, DateOrder, FieldKind, RunConfig};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagOverrides {
    pub decimal_mark: Option<char>,
    pub grouping_mark: Option<char>,
    pub fraction_digits: Option<u32>,
    pub group_output: Option<bool>,
    pub date_order: Option<DateOrder>,
    pub calling_code: Option<String>,
    pub table_version: Option<String>,
    pub sample_size: Option<usize>,
    pub min_success_ratio: Option<f64>,
    pub sequential: bool,
    pub kinds: Vec<(String, FieldKind)>,
}

impl FlagOverrides {
    pub fn apply(&self, mut config: RunConfig) -> RunConfig {
        let defaults = ColumnConfig {
            kind: None,
            decimal_mark: self.decimal_mark,
            grouping_mark: self.grouping_mark,
            fraction_digits: self.fraction_digits,
            group_output: self.group_output,
            date_order: self.date_order,
            default_calling_code: self.calling_code.clone(),
            table_version: self.table_version.clone(),
        };
        config.defaults = defaults.resolve(&config.defaults);
        if let Some(size) = self.sample_size {
            config.detector.sample_size = size;
        }
        if let Some(ratio) = self.min_success_ratio {
            config.detector.min_success_ratio = ratio;
        }
        if self.sequential {
            config.engine.parallel = false;
        }
        for (column, kind) in &self.kinds {
            config.columns.entry(column.clone()).or_default().kind = Some(*kind);
        }
        config
    }
}

/// Parses `COLUMN=KIND` from `--kind`.
pub fn parse_kind_assignment(value: &str) -> Result<(String, FieldKind), String> {
    let (column, kind) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected COLUMN=KIND, got `{value}`"))?;
    if column.trim().is_empty() {
        return Err(format!("missing column name in `{value}`"));
    }
    let kind = kind.parse::<FieldKind>().map_err(|err| err.to_string())?;
    Ok((column.trim().to_string(), kind))
}

/// Parses a single-character mark; `space` and `apostrophe` are accepted
/// by name since they are awkward to pass through a shell.
pub fn parse_mark(value: &str) -> Result<char, String> {
    match value {
        "space" => return Ok(' '),
        "apostrophe" => return Ok('\''),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(mark), None) => Ok(mark),
        _ => Err(format!("expected a single character, got `{value}`")),
    }
}

/// Parses `--decimal-mark`; whitespace and apostrophes only group digits.
pub fn parse_decimal_mark(value: &str) -> Result<char, String> {
    let mark = parse_mark(value)?;
    if mark.is_whitespace() || matches!(mark, '\'' | '\u{2019}') {
        return Err(format!("`{value}` can only be a grouping mark"));
    }
    Ok(mark)
}
