use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Field type bound to a column for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    Date,
    Phone,
    Address,
    Unrecognized,
}

impl FieldKind {
    /// Detectable kinds in tie-break order.
    pub const CANDIDATES: [FieldKind; 4] = [
        FieldKind::Number,
        FieldKind::Date,
        FieldKind::Phone,
        FieldKind::Address,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Phone => "phone",
            FieldKind::Address => "address",
            FieldKind::Unrecognized => "unrecognized",
        }
    }

    /// Whether a normalizer is applied to columns of this kind.
    pub fn is_normalized(self) -> bool {
        !matches!(self, FieldKind::Unrecognized)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "number" | "numeric" | "num" => Ok(FieldKind::Number),
            "date" => Ok(FieldKind::Date),
            "phone" | "telephone" | "tel" => Ok(FieldKind::Phone),
            "address" | "region" => Ok(FieldKind::Address),
            "unrecognized" | "none" | "text" => Ok(FieldKind::Unrecognized),
            _ => Err(ConfigError::UnknownKind {
                value: value.to_string(),
            }),
        }
    }
}

/// Error taxonomy surfaced in reports.
///
/// Cell-level kinds never escape the column pipeline; only
/// `StructuralTableError` aborts a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NumberParseError,
    DateParseError,
    PhoneMissingCountryError,
    PhoneInvalidError,
    AddressCountryNotFoundError,
    AddressRegionNotFoundError,
    UnrecognizedColumnTypeWarning,
    StructuralTableError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NumberParseError => "NumberParseError",
            ErrorKind::DateParseError => "DateParseError",
            ErrorKind::PhoneMissingCountryError => "PhoneMissingCountryError",
            ErrorKind::PhoneInvalidError => "PhoneInvalidError",
            ErrorKind::AddressCountryNotFoundError => "AddressCountryNotFoundError",
            ErrorKind::AddressRegionNotFoundError => "AddressRegionNotFoundError",
            ErrorKind::UnrecognizedColumnTypeWarning => "UnrecognizedColumnTypeWarning",
            ErrorKind::StructuralTableError => "StructuralTableError",
        }
    }

    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::StructuralTableError)
    }

    pub fn is_warning(self) -> bool {
        matches!(self, ErrorKind::UnrecognizedColumnTypeWarning)
    }

    /// Field kind whose normalizer produces this error, if any.
    pub fn field_kind(self) -> Option<FieldKind> {
        match self {
            ErrorKind::NumberParseError => Some(FieldKind::Number),
            ErrorKind::DateParseError => Some(FieldKind::Date),
            ErrorKind::PhoneMissingCountryError | ErrorKind::PhoneInvalidError => {
                Some(FieldKind::Phone)
            }
            ErrorKind::AddressCountryNotFoundError | ErrorKind::AddressRegionNotFoundError => {
                Some(FieldKind::Address)
            }
            ErrorKind::UnrecognizedColumnTypeWarning | ErrorKind::StructuralTableError => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_aliases() {
        assert_eq!("Number".parse::<FieldKind>().unwrap(), FieldKind::Number);
        assert_eq!(" tel ".parse::<FieldKind>().unwrap(), FieldKind::Phone);
        assert_eq!("region".parse::<FieldKind>().unwrap(), FieldKind::Address);
        assert!("colour".parse::<FieldKind>().is_err());
    }

    #[test]
    fn candidates_follow_tie_break_order() {
        assert_eq!(FieldKind::CANDIDATES[0], FieldKind::Number);
        assert_eq!(FieldKind::CANDIDATES[3], FieldKind::Address);
        assert!(!FieldKind::CANDIDATES.contains(&FieldKind::Unrecognized));
    }

    #[test]
    fn only_structural_errors_are_fatal() {
        assert!(ErrorKind::StructuralTableError.is_fatal());
        assert!(!ErrorKind::PhoneInvalidError.is_fatal());
        assert!(ErrorKind::UnrecognizedColumnTypeWarning.is_warning());
        assert_eq!(
            ErrorKind::AddressRegionNotFoundError.field_kind(),
            Some(FieldKind::Address)
        );
    }
}
