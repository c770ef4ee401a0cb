//! Configuration options for a normalization run.
//!
//! Options are resolved in two layers: run-wide [`FieldOptions`] defaults and
//! per-column [`ColumnConfig`] overrides. A column override only replaces the
//! knobs it sets; everything else falls back to the run defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::kind::FieldKind;

/// Upper bound on output fraction digits.
pub const MAX_FRACTION_DIGITS: u32 = 64;

/// Default number of non-empty cells sampled for type detection.
pub const DEFAULT_SAMPLE_SIZE: usize = 25;

/// Default minimum probe success ratio for a detected kind.
pub const DEFAULT_MIN_SUCCESS_RATIO: f64 = 0.6;

/// Number parsing and rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberOptions {
    /// Decimal mark used when rendering output.
    pub decimal_mark: char,
    /// Grouping (thousands) mark; must differ from `decimal_mark`.
    pub grouping_mark: char,
    /// Fixed number of digits after the decimal mark.
    pub fraction_digits: u32,
    /// Insert grouping marks into the cleaned cell.
    pub group_output: bool,
}

impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            decimal_mark: '.',
            grouping_mark: ',',
            fraction_digits: 2,
            group_output: false,
        }
    }
}

impl NumberOptions {
    pub fn validate(&self, scope: &str) -> Result<(), ConfigError> {
        for mark in [self.decimal_mark, self.grouping_mark] {
            if mark.is_ascii_digit() || matches!(mark, '+' | '-') || mark.is_control() {
                return Err(ConfigError::InvalidMark {
                    scope: scope.to_string(),
                    mark,
                });
            }
        }
        // Whitespace and apostrophes are only ever read as grouping.
        if self.decimal_mark.is_whitespace() || matches!(self.decimal_mark, '\'' | '\u{2019}') {
            return Err(ConfigError::InvalidMark {
                scope: scope.to_string(),
                mark: self.decimal_mark,
            });
        }
        if self.decimal_mark == self.grouping_mark {
            return Err(ConfigError::SameMarks {
                scope: scope.to_string(),
                mark: self.decimal_mark,
            });
        }
        if self.fraction_digits > MAX_FRACTION_DIGITS {
            return Err(ConfigError::FractionDigitsTooLarge {
                scope: scope.to_string(),
                value: self.fraction_digits,
                max: MAX_FRACTION_DIGITS,
            });
        }
        Ok(())
    }
}

/// Preferred reading of dates whose day and month are both 12 or less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    #[default]
    DayFirst,
    MonthFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateOptions {
    pub ambiguity: DateOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneOptions {
    /// Calling code prepended to numbers without one (digits only).
    pub default_calling_code: Option<String>,
}

impl PhoneOptions {
    /// Normalizes the configured calling code to bare digits.
    pub fn validate(&mut self, scope: &str) -> Result<(), ConfigError> {
        if let Some(raw) = self.default_calling_code.take() {
            self.default_calling_code = Some(normalize_calling_code(&raw, scope)?);
        }
        Ok(())
    }
}

/// Strips `+`, `00` and whitespace from a configured calling code.
pub fn normalize_calling_code(raw: &str, scope: &str) -> Result<String, ConfigError> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    let digits = compact
        .strip_prefix('+')
        .or_else(|| compact.strip_prefix("00"))
        .unwrap_or(&compact);
    let valid = (1..=3).contains(&digits.len())
        && digits.chars().all(|ch| ch.is_ascii_digit())
        && !digits.starts_with('0');
    if valid {
        Ok(digits.to_string())
    } else {
        Err(ConfigError::InvalidCallingCode {
            scope: scope.to_string(),
            value: raw.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressOptions {
    /// Required reference table version; `None` accepts the loaded one.
    pub table_version: Option<String>,
}

/// Fully resolved options for every field kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    pub number: NumberOptions,
    pub date: DateOptions,
    pub phone: PhoneOptions,
    pub address: AddressOptions,
}

impl FieldOptions {
    pub fn validate(&mut self, scope: &str) -> Result<(), ConfigError> {
        self.number.validate(scope)?;
        self.phone.validate(scope)?;
        Ok(())
    }
}

/// Per-column override of the field kind and type-specific knobs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    pub kind: Option<FieldKind>,
    pub decimal_mark: Option<char>,
    pub grouping_mark: Option<char>,
    pub fraction_digits: Option<u32>,
    pub group_output: Option<bool>,
    pub date_order: Option<DateOrder>,
    pub default_calling_code: Option<String>,
    pub table_version: Option<String>,
}

impl ColumnConfig {
    pub fn with_kind(kind: FieldKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Layers this override on top of run defaults.
    pub fn resolve(&self, defaults: &FieldOptions) -> FieldOptions {
        let mut resolved = defaults.clone();
        if let Some(mark) = self.decimal_mark {
            resolved.number.decimal_mark = mark;
        }
        if let Some(mark) = self.grouping_mark {
            resolved.number.grouping_mark = mark;
        }
        if let Some(digits) = self.fraction_digits {
            resolved.number.fraction_digits = digits;
        }
        if let Some(group) = self.group_output {
            resolved.number.group_output = group;
        }
        if let Some(order) = self.date_order {
            resolved.date.ambiguity = order;
        }
        if let Some(code) = &self.default_calling_code {
            resolved.phone.default_calling_code = Some(code.clone());
        }
        if let Some(version) = &self.table_version {
            resolved.address.table_version = Some(version.clone());
        }
        resolved
    }
}

/// Type detector tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    pub sample_size: usize,
    pub min_success_ratio: f64,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            min_success_ratio: DEFAULT_MIN_SUCCESS_RATIO,
        }
    }
}

impl DetectorOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_size == 0 {
            return Err(ConfigError::InvalidDetector {
                message: "sample size must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_success_ratio) {
            return Err(ConfigError::InvalidDetector {
                message: format!(
                    "minimum success ratio {} is outside 0.0..=1.0",
                    self.min_success_ratio
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Process columns and distinct values on the rayon pool.
    pub parallel: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Everything the engine needs besides the table itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub defaults: FieldOptions,
    pub columns: BTreeMap<String, ColumnConfig>,
    pub detector: DetectorOptions,
    pub engine: EngineOptions,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(mut self, defaults: FieldOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_column(mut self, name: impl Into<String>, config: ColumnConfig) -> Self {
        self.columns.insert(name.into(), config);
        self
    }

    pub fn with_kind(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.with_column(name, ColumnConfig::with_kind(kind))
    }

    pub fn with_detector(mut self, detector: DetectorOptions) -> Self {
        self.detector = detector;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.engine.parallel = false;
        self
    }

    pub fn column_config(&self, name: &str) -> Option<&ColumnConfig> {
        self.columns.get(name)
    }

    /// Resolved and validated options for one column.
    pub fn options_for(&self, name: &str) -> Result<FieldOptions, ConfigError> {
        let mut resolved = match self.columns.get(name) {
            Some(config) => config.resolve(&self.defaults),
            None => self.defaults.clone(),
        };
        resolved.validate(&format!("column `{name}`"))?;
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_number_options_match_documented_knobs() {
        let options = NumberOptions::default();
        assert_eq!(options.decimal_mark, '.');
        assert_eq!(options.grouping_mark, ',');
        assert_eq!(options.fraction_digits, 2);
        assert!(options.validate("defaults").is_ok());
    }

    #[test]
    fn rejects_identical_marks() {
        let options = NumberOptions {
            decimal_mark: ',',
            grouping_mark: ',',
            ..NumberOptions::default()
        };
        assert!(matches!(
            options.validate("defaults"),
            Err(ConfigError::SameMarks { mark: ',', .. })
        ));
    }

    #[test]
    fn space_is_a_valid_grouping_mark_only() {
        let grouping = NumberOptions {
            grouping_mark: ' ',
            ..NumberOptions::default()
        };
        assert!(grouping.validate("defaults").is_ok());
        let decimal = NumberOptions {
            decimal_mark: ' ',
            ..NumberOptions::default()
        };
        assert!(decimal.validate("defaults").is_err());
    }

    #[test]
    fn apostrophes_are_grouping_marks_only() {
        let swiss = NumberOptions {
            decimal_mark: '.',
            grouping_mark: '\'',
            ..NumberOptions::default()
        };
        assert!(swiss.validate("defaults").is_ok());
        for mark in ['\'', '\u{2019}'] {
            let decimal = NumberOptions {
                decimal_mark: mark,
                grouping_mark: ',',
                ..NumberOptions::default()
            };
            assert!(matches!(
                decimal.validate("defaults"),
                Err(ConfigError::InvalidMark { mark: rejected, .. }) if rejected == mark
            ));
        }
    }

    #[test]
    fn normalizes_calling_codes() {
        assert_eq!(normalize_calling_code("+49", "t").unwrap(), "49");
        assert_eq!(normalize_calling_code("0044", "t").unwrap(), "44");
        assert_eq!(normalize_calling_code(" 1 ", "t").unwrap(), "1");
        assert!(normalize_calling_code("4912", "t").is_err());
        assert!(normalize_calling_code("DE", "t").is_err());
        assert!(normalize_calling_code("", "t").is_err());
    }

    #[test]
    fn column_override_only_replaces_set_knobs() {
        let defaults = FieldOptions {
            number: NumberOptions {
                decimal_mark: ',',
                grouping_mark: '.',
                fraction_digits: 3,
                group_output: true,
            },
            ..FieldOptions::default()
        };
        let config = ColumnConfig {
            fraction_digits: Some(0),
            ..ColumnConfig::default()
        };
        let resolved = config.resolve(&defaults);
        assert_eq!(resolved.number.decimal_mark, ',');
        assert_eq!(resolved.number.fraction_digits, 0);
        assert!(resolved.number.group_output);
    }

    #[test]
    fn options_for_validates_resolved_column() {
        let config = RunConfig::new().with_column(
            "amount",
            ColumnConfig {
                decimal_mark: Some(','),
                ..ColumnConfig::default()
            },
        );
        assert!(config.options_for("amount").is_err());
        assert!(config.options_for("other").is_ok());
    }

    #[test]
    fn detector_ratio_must_be_a_fraction() {
        let options = DetectorOptions {
            min_success_ratio: 1.5,
            ..DetectorOptions::default()
        };
        assert!(options.validate().is_err());
        assert!(DetectorOptions::default().validate().is_ok());
    }
}
