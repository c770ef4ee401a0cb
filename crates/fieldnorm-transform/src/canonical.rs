//! Canonical forms per field kind.
//!
//! Each `is_canonical_*` validator is total: it accepts exactly the strings a
//! successful normalizer can produce, so every normalizer is idempotent on
//! its own output.

use std::sync::LazyLock;

use chrono::NaiveDate;
use fieldnorm_model::NumberOptions;
use fieldnorm_standards::ReferenceTables;
use regex::Regex;

static CANONICAL_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid canonical date regex"));

static CANONICAL_PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d{8,15}$").expect("Invalid canonical phone regex"));

static CANONICAL_REGION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2}-[A-Z0-9]{1,3}$").expect("Invalid canonical region regex")
});

/// Exact decimal value held as digit strings.
///
/// Avoids binary floating point so rounding is exact at any precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    negative: bool,
    /// Integer digits without leading zeros; `"0"` for zero.
    integer: String,
    fraction: String,
}

impl Decimal {
    /// Builds a value from ASCII digit strings. Returns `None` on non-digits
    /// or when both parts are empty.
    pub fn from_parts(negative: bool, integer: &str, fraction: &str) -> Option<Self> {
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !digits_only(integer) || !digits_only(fraction) {
            return None;
        }
        if integer.is_empty() && fraction.is_empty() {
            return None;
        }
        let mut value = Self {
            negative,
            integer: strip_leading_zeros(integer),
            fraction: fraction.to_string(),
        };
        value.clear_negative_zero();
        Some(value)
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn integer_digits(&self) -> &str {
        &self.integer
    }

    pub fn fraction_digits(&self) -> &str {
        &self.fraction
    }

    pub fn is_zero(&self) -> bool {
        self.integer == "0" && self.fraction.bytes().all(|b| b == b'0')
    }

    fn clear_negative_zero(&mut self) {
        if self.is_zero() {
            self.negative = false;
        }
    }

    /// Rounds half-to-even to exactly `digits` fraction digits.
    pub fn round_half_even(&self, digits: u32) -> Decimal {
        let digits = digits as usize;
        if self.fraction.len() <= digits {
            let mut fraction = self.fraction.clone();
            fraction.extend(std::iter::repeat_n('0', digits - fraction.len()));
            return Decimal {
                negative: self.negative,
                integer: self.integer.clone(),
                fraction,
            };
        }

        let (kept, dropped) = self.fraction.split_at(digits);
        let mut dropped_digits = dropped.bytes();
        let first = dropped_digits.next().unwrap_or(b'0');
        let beyond_half = dropped_digits.any(|b| b != b'0');
        let last_kept = kept
            .bytes()
            .last()
            .or_else(|| self.integer.bytes().last())
            .unwrap_or(b'0');
        let round_up = first > b'5'
            || (first == b'5' && (beyond_half || (last_kept - b'0') % 2 == 1));

        let mut all: Vec<u8> = self.integer.bytes().chain(kept.bytes()).collect();
        if round_up {
            let mut carry = true;
            for digit in all.iter_mut().rev() {
                if *digit == b'9' {
                    *digit = b'0';
                } else {
                    *digit += 1;
                    carry = false;
                    break;
                }
            }
            if carry {
                all.insert(0, b'1');
            }
        }
        let split = all.len() - digits;
        let integer = String::from_utf8_lossy(&all[..split]).into_owned();
        let fraction = String::from_utf8_lossy(&all[split..]).into_owned();
        let mut value = Decimal {
            negative: self.negative,
            integer: strip_leading_zeros(&integer),
            fraction,
        };
        value.clear_negative_zero();
        value
    }

    /// Plain rendering: `-?\d+(\.\d+)?` with no grouping.
    pub fn to_canonical(&self) -> String {
        let mut out = String::new();
        if self.negative {
            out.push('-');
        }
        out.push_str(&self.integer);
        if !self.fraction.is_empty() {
            out.push('.');
            out.push_str(&self.fraction);
        }
        out
    }

    /// Rounds to the configured fraction digits and renders with the
    /// configured marks.
    pub fn render(&self, options: &NumberOptions) -> String {
        let rounded = self.round_half_even(options.fraction_digits);
        let mut out = String::new();
        if rounded.negative {
            out.push('-');
        }
        if options.group_output {
            out.push_str(&group_thousands(&rounded.integer, options.grouping_mark));
        } else {
            out.push_str(&rounded.integer);
        }
        if !rounded.fraction.is_empty() {
            out.push(options.decimal_mark);
            out.push_str(&rounded.fraction);
        }
        out
    }
}

fn strip_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn group_thousands(integer: &str, mark: char) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            out.push(mark);
        }
        out.push(ch);
    }
    out
}

/// Checks the rendered number grammar for `options`: optional `-`, integer
/// digits without leading zeros (grouped in threes when `group_output`),
/// then exactly `fraction_digits` digits after the decimal mark.
pub fn is_canonical_number(value: &str, options: &NumberOptions) -> bool {
    let body = value.strip_prefix('-').unwrap_or(value);
    let fraction_len = options.fraction_digits as usize;
    let (integer, fraction) = if fraction_len == 0 {
        (body, "")
    } else {
        match body.rsplit_once(options.decimal_mark) {
            Some(parts) => parts,
            None => return false,
        }
    };
    if fraction.len() != fraction_len || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: String = if options.group_output {
        let groups: Vec<&str> = integer.split(options.grouping_mark).collect();
        let well_grouped = groups.iter().enumerate().all(|(idx, group)| {
            let len_ok = if idx == 0 {
                (1..=3).contains(&group.len())
            } else {
                group.len() == 3
            };
            len_ok && group.bytes().all(|b| b.is_ascii_digit())
        });
        if !well_grouped {
            return false;
        }
        groups.concat()
    } else {
        integer.to_string()
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    let negative_zero =
        value.starts_with('-') && digits == "0" && fraction.bytes().all(|b| b == b'0');
    !negative_zero
}

/// `YYYY-MM-DD` naming a real Gregorian date.
pub fn is_canonical_date(value: &str) -> bool {
    CANONICAL_DATE_REGEX.is_match(value)
        && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// `+` and 8-15 digits starting with a known calling code.
pub fn is_canonical_phone(value: &str, tables: &ReferenceTables) -> bool {
    CANONICAL_PHONE_REGEX.is_match(value) && tables.match_calling_code(&value[1..]).is_some()
}

/// `CC-SSS` listed in the subdivision table.
pub fn is_canonical_region(value: &str, tables: &ReferenceTables) -> bool {
    CANONICAL_REGION_REGEX.is_match(value) && tables.subdivision_by_iso(value).is_some()
}
