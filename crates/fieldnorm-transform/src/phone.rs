//! Phone normalization to E.164 (`+<digits>`).

use fieldnorm_model::{CellFailure, ErrorKind, PhoneOptions};
use fieldnorm_standards::ReferenceTables;

const MIN_DIGITS: usize = 8;
const MAX_DIGITS: usize = 15;

/// Digit range the detection probe accepts; local numbers may be short.
const PROBE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

/// Parenthesized trunk digit in international notation: `+49 (0)170 ...`.
const TRUNK_MARKER: &str = "(0)";

fn is_phone_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '-' | '.' | '/' | '(' | ')')
}

pub fn normalize_phone(
    raw: &str,
    options: &PhoneOptions,
    tables: &ReferenceTables,
) -> Result<String, CellFailure> {
    let invalid = |reason: String| CellFailure::new(raw, ErrorKind::PhoneInvalidError, reason);

    let text = raw.trim().replace(TRUNK_MARKER, "");
    if text.chars().any(char::is_alphabetic) {
        return Err(invalid("contains letters".to_string()));
    }
    let (plus, body) = match text.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    if let Some(ch) = body
        .chars()
        .find(|ch| !ch.is_ascii_digit() && !is_phone_separator(*ch))
    {
        return Err(invalid(format!("unexpected character `{ch}`")));
    }
    let digits: String = body.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(invalid("no digits".to_string()));
    }

    let full = if plus {
        digits
    } else if let Some(international) = digits.strip_prefix("00") {
        international.to_string()
    } else if let Some(code) = &options.default_calling_code {
        let calling_code = tables
            .calling_code(code)
            .ok_or_else(|| invalid(format!("calling code +{code} is not in the reference table")))?;
        format!("{code}{}", calling_code.strip_trunk_prefix(&digits))
    } else {
        return Err(CellFailure::new(
            raw,
            ErrorKind::PhoneMissingCountryError,
            "no calling code and no default configured",
        ));
    };

    if tables.match_calling_code(&full).is_none() {
        return Err(invalid("unknown calling code".to_string()));
    }
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&full.len()) {
        return Err(invalid(format!(
            "{} digits, expected {MIN_DIGITS}-{MAX_DIGITS}",
            full.len()
        )));
    }
    Ok(format!("+{full}"))
}

/// Cheap probe: only digits and phone punctuation, a plausible digit count,
/// and some phone-specific marker (international prefix, trunk zero or
/// separators between digit blocks).
pub fn looks_like_phone(raw: &str) -> bool {
    let text = raw.trim().replace(TRUNK_MARKER, "");
    let body = text.strip_prefix('+').unwrap_or(&text);
    if !body
        .chars()
        .all(|ch| ch.is_ascii_digit() || is_phone_separator(ch))
    {
        return false;
    }
    let digit_count = body.chars().filter(char::is_ascii_digit).count();
    if !PROBE_DIGITS.contains(&digit_count) {
        return false;
    }
    text.starts_with('+') || body.starts_with('0') || body.contains(is_phone_separator)
}
