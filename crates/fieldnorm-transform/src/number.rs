//! Number normalization.
//!
//! Separators are resolved per value: the rightmost decimal-looking mark is
//! the decimal mark, earlier marks are grouping. A mark that repeats, or a
//! lone configured grouping mark followed by exactly three digits, is read
//! as grouping so grouped output parses back to the same value. Grouped
//! integers never start with `0`, so `0,123` keeps its mark as decimal.

use fieldnorm_model::{CellFailure, ErrorKind, NumberOptions};

use crate::canonical::Decimal;

const CURRENCY_SYMBOLS: &[char] = &[
    '$', '€', '£', '¥', '₹', '₽', '₩', '¢', '₺', '₴', '₪', '₫', '₱', '₦', '₿', '¤',
];

/// Grouping-only separator; `’` is folded into it.
const APOSTROPHE: char = '\'';

/// Whitespace runs between digit groups are folded into this separator.
const SPACE: char = ' ';

/// A parsed number plus the facts the type probe needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNumber {
    pub value: Decimal,
    /// Multi-digit integer part starting with `0` (`0170`), typical of phones.
    pub leading_zero: bool,
}

/// Parses free-form numeric text into an exact decimal.
pub fn parse_number(raw: &str, options: &NumberOptions) -> Result<ParsedNumber, String> {
    let (negative, body) = strip_affixes(raw);
    if !body.chars().any(|ch| ch.is_ascii_digit()) {
        return Err("no digits".to_string());
    }

    let (groups, separators) = split_groups(body, options)?;
    let decimal_at = decimal_position(&groups, &separators, options);

    if let Some(pos) = decimal_at {
        if pos + 1 != separators.len() {
            return Err(format!(
                "separator after the decimal mark `{}`",
                separators[pos]
            ));
        }
        if separators[..pos].contains(&separators[pos]) {
            return Err(format!("decimal mark `{}` appears twice", separators[pos]));
        }
    }

    let integer_end = decimal_at.unwrap_or(separators.len());
    let grouping = &separators[..integer_end];
    if let Some(first) = grouping.first()
        && grouping.iter().any(|sep| sep != first)
    {
        return Err("mixed grouping marks".to_string());
    }

    let integer_groups = &groups[..=integer_end];
    if integer_groups[0].is_empty() && decimal_at != Some(0) {
        return Err("starts with a grouping mark".to_string());
    }
    if integer_groups.len() > 1 {
        if integer_groups[0].starts_with('0') {
            return Err("grouped integer starts with zero".to_string());
        }
        let well_formed = integer_groups
            .iter()
            .enumerate()
            .all(|(idx, group)| match idx {
                0 => (1..=3).contains(&group.len()),
                _ => group.len() == 3,
            });
        if !well_formed {
            return Err("digit groups are not in threes".to_string());
        }
    }

    let integer = integer_groups.concat();
    let fraction = decimal_at.map_or("", |pos| groups[pos + 1].as_str());
    let value = Decimal::from_parts(negative, &integer, fraction)
        .ok_or_else(|| "no digits".to_string())?;
    Ok(ParsedNumber {
        value,
        leading_zero: integer.len() > 1 && integer.starts_with('0'),
    })
}

/// Normalizes a cell to the rendered canonical number.
pub fn normalize_number(raw: &str, options: &NumberOptions) -> Result<String, CellFailure> {
    parse_number(raw, options)
        .map(|parsed| parsed.value.render(options))
        .map_err(|reason| CellFailure::new(raw, ErrorKind::NumberParseError, reason))
}

/// Cheap probe for type detection.
///
/// Phone-like values (`+49 ...`, `0049 ...`, `0170 ...`) are rejected so that
/// phone columns are not claimed by the number tie-break.
pub fn looks_like_number(raw: &str, options: &NumberOptions) -> bool {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') || trimmed.starts_with("00") {
        return false;
    }
    parse_number(trimmed, options).is_ok_and(|parsed| !parsed.leading_zero)
}

fn is_affix(ch: char) -> bool {
    ch.is_alphabetic() || ch.is_whitespace() || CURRENCY_SYMBOLS.contains(&ch) || ch == '%'
}

fn take_sign(text: &mut &str) -> Option<bool> {
    let mut chars = text.chars();
    let negative = match chars.next()? {
        '-' | '\u{2212}' => true,
        '+' => false,
        _ => return None,
    };
    *text = chars.as_str().trim_start();
    Some(negative)
}

/// Removes currency, unit and percent affixes plus one sign, which may sit
/// before or after a prefix (`-€12`, `€-12`).
fn strip_affixes(raw: &str) -> (bool, &str) {
    let mut text = raw.trim();
    let mut sign = take_sign(&mut text);
    text = text.trim_start_matches(is_affix);
    if sign.is_none() {
        sign = take_sign(&mut text);
    }
    text = text.trim_end_matches(is_affix);
    (sign.unwrap_or(false), text)
}

fn is_separator(ch: char, options: &NumberOptions) -> bool {
    ch.is_whitespace()
        || matches!(ch, '.' | ',' | '\'' | '\u{2019}')
        || ch == options.decimal_mark
        || ch == options.grouping_mark
}

/// Splits the body into digit groups and the separators between them.
fn split_groups(body: &str, options: &NumberOptions) -> Result<(Vec<String>, Vec<char>), String> {
    let mut groups = vec![String::new()];
    let mut separators = Vec::new();
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch.is_ascii_digit() {
            if let Some(group) = groups.last_mut() {
                group.push(ch);
            }
            continue;
        }
        if !is_separator(ch, options) {
            return Err(format!("unexpected character `{ch}`"));
        }
        let separator = if ch.is_whitespace() {
            while chars.next_if(|next| next.is_whitespace()).is_some() {}
            SPACE
        } else if ch == '\u{2019}' {
            APOSTROPHE
        } else {
            ch
        };
        let previous_empty = groups.last().is_some_and(String::is_empty);
        if previous_empty && groups.len() > 1 {
            return Err("two separators in a row".to_string());
        }
        separators.push(separator);
        groups.push(String::new());
    }
    if groups.last().is_some_and(String::is_empty) {
        return Err("ends with a separator".to_string());
    }
    Ok((groups, separators))
}

/// Index into `separators` of the decimal mark, if the value has one.
fn decimal_position(groups: &[String], separators: &[char], options: &NumberOptions) -> Option<usize> {
    let is_mark = |sep: &char| *sep != SPACE && *sep != APOSTROPHE;
    let mut marks: Vec<char> = separators.iter().copied().filter(is_mark).collect();
    marks.sort_unstable();
    marks.dedup();

    match marks.as_slice() {
        [] => None,
        [mark] => {
            let mut positions = separators
                .iter()
                .enumerate()
                .filter(|(_, sep)| *sep == mark)
                .map(|(idx, _)| idx);
            let first = positions.next()?;
            if positions.next().is_some() {
                return None;
            }
            let reads_as_grouping = *mark == options.grouping_mark
                && *mark != options.decimal_mark
                && !groups[0].is_empty()
                && !groups[0].starts_with('0')
                && groups[first + 1].len() == 3;
            if reads_as_grouping { None } else { Some(first) }
        }
        _ => separators.iter().rposition(is_mark),
    }
}
