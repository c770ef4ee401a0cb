//! Date normalization to `YYYY-MM-DD`.
//!
//! Input is tokenized and matched against an ordered list of patterns. ISO
//! forms come first, then numeric day/month forms in the order set by
//! [`DateOrder`], then textual month forms. The first pattern that yields a
//! calendar-valid date wins.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use fieldnorm_model::{CellFailure, DateOptions, DateOrder, ErrorKind};
use regex::Regex;

/// Trailing time of day (`T10:00`, ` 10:30:00`, ` 9:15 pm`, `T10:00:00.5+01:00`).
static TIME_SUFFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:T|\s+)\d{1,2}:\d{2}(?::\d{2}(?:[.,]\d+)?)?\s*(?:am|pm)?\s*(?:z|utc|[+-]\d{2}:?\d{2})?$",
    )
    .expect("Invalid time suffix regex")
});

/// Leading weekday name (`Mon,`, `Tuesday`).
static WEEKDAY_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)(?:day|sday|nesday|rsday|urday)?\.?,?\s+",
    )
    .expect("Invalid weekday prefix regex")
});

/// Stands in for commas and whitespace between two numeric tokens.
const LOOSE_SEPARATOR: char = ' ';

/// Two-digit years below this pivot are read as 20xx, the rest as 19xx.
const TWO_DIGIT_YEAR_PIVOT: u32 = 69;

/// Candidate interpretations, in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// `Y-M-D`, `Y/M/D`, `Y.M.D` with a four-digit year.
    IsoExtended,
    /// `YYYYMMDD`.
    IsoBasic,
    /// `D.M.Y`, `D/M/Y`, `D-M-Y`.
    DayMonthYear,
    /// `M/D/Y`, `M-D-Y`, `M.D.Y`.
    MonthDayYear,
    /// `D Month Y`.
    DayTextMonthYear,
    /// `Month D, Y`.
    TextMonthDayYear,
    /// `Y Month D`.
    YearTextMonthDay,
}

impl DatePattern {
    /// Pattern list for a configured ambiguity preference.
    pub fn ordered(order: DateOrder) -> [DatePattern; 7] {
        let (first, second) = match order {
            DateOrder::DayFirst => (DatePattern::DayMonthYear, DatePattern::MonthDayYear),
            DateOrder::MonthFirst => (DatePattern::MonthDayYear, DatePattern::DayMonthYear),
        };
        [
            DatePattern::IsoExtended,
            DatePattern::IsoBasic,
            first,
            second,
            DatePattern::DayTextMonthYear,
            DatePattern::TextMonthDayYear,
            DatePattern::YearTextMonthDay,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(String),
    Word(String),
}

impl Token {
    fn digits(&self, lengths: &[usize]) -> Option<u32> {
        match self {
            Token::Number(digits) if lengths.contains(&digits.len()) => digits.parse().ok(),
            _ => None,
        }
    }

    fn month_name(&self) -> Option<u32> {
        match self {
            Token::Word(word) => month_from_name(word),
            Token::Number(_) => None,
        }
    }
}

struct Tokens {
    tokens: Vec<Token>,
    /// Distinct separator characters seen between numeric tokens.
    separators: Vec<char>,
}

/// Parses a date, returning the reason on failure.
pub fn parse_date(raw: &str, order: DateOrder) -> Result<NaiveDate, String> {
    let text = strip_decorations(raw);
    let Tokens { tokens, separators } = tokenize(&text)?;
    let numeric = tokens.iter().all(|token| matches!(token, Token::Number(_)));
    if numeric && separators.len() > 1 {
        return Err("mixed date separators".to_string());
    }
    if numeric && separators.contains(&LOOSE_SEPARATOR) {
        return Err("numeric date needs `-`, `/` or `.` separators".to_string());
    }

    let mut shape_matched = false;
    for pattern in DatePattern::ordered(order) {
        let Some((year, month, day)) = match_pattern(pattern, &tokens) else {
            continue;
        };
        shape_matched = true;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(date);
        }
    }
    if shape_matched {
        Err("not a calendar date".to_string())
    } else {
        Err("unrecognized date format".to_string())
    }
}

pub fn normalize_date(raw: &str, options: &DateOptions) -> Result<String, CellFailure> {
    parse_date(raw, options.ambiguity)
        .map(format_iso)
        .map_err(|reason| CellFailure::new(raw, ErrorKind::DateParseError, reason))
}

pub fn looks_like_date(raw: &str, options: &DateOptions) -> bool {
    parse_date(raw, options.ambiguity).is_ok()
}

fn format_iso(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

fn strip_decorations(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_time = TIME_SUFFIX_REGEX.replace(trimmed, "");
    WEEKDAY_PREFIX_REGEX
        .replace(without_time.trim(), "")
        .trim()
        .to_string()
}

fn tokenize(text: &str) -> Result<Tokens, String> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut separators: Vec<char> = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(digit) = chars.next_if(char::is_ascii_digit) {
                digits.push(digit);
            }
            // Ordinal suffixes: 1st, 2nd, 3rd, 4th.
            let mut suffix = String::new();
            while let Some(letter) = chars.next_if(|c| c.is_alphabetic()) {
                suffix.push(letter);
            }
            if !suffix.is_empty() && !matches!(suffix.to_lowercase().as_str(), "st" | "nd" | "rd" | "th")
            {
                return Err(format!("unexpected text `{digits}{suffix}`"));
            }
            tokens.push(Token::Number(digits));
        } else if ch.is_alphabetic() {
            let mut word = String::new();
            while let Some(letter) = chars.next_if(|c| c.is_alphabetic()) {
                word.push(letter);
            }
            tokens.push(Token::Word(word));
        } else if matches!(ch, '-' | '/' | '.') {
            chars.next();
            if !separators.contains(&ch) {
                separators.push(ch);
            }
        } else if ch == ',' || ch.is_whitespace() {
            while chars.next_if(|c| *c == ',' || c.is_whitespace()).is_some() {}
            let between_numbers = matches!(tokens.last(), Some(Token::Number(_)))
                && chars.peek().is_some_and(char::is_ascii_digit);
            if between_numbers && !separators.contains(&LOOSE_SEPARATOR) {
                separators.push(LOOSE_SEPARATOR);
            }
        } else {
            return Err(format!("unexpected character `{ch}`"));
        }
    }
    if tokens.is_empty() {
        return Err("no date components".to_string());
    }
    Ok(Tokens { tokens, separators })
}

fn expand_year(token: &Token) -> Option<i32> {
    if let Some(year) = token.digits(&[4]) {
        return i32::try_from(year).ok();
    }
    let short = token.digits(&[2])?;
    let century = if short < TWO_DIGIT_YEAR_PIVOT { 2000 } else { 1900 };
    i32::try_from(century + short).ok()
}

fn match_pattern(pattern: DatePattern, tokens: &[Token]) -> Option<(i32, u32, u32)> {
    const SHORT: &[usize] = &[1, 2];
    match (pattern, tokens) {
        (DatePattern::IsoExtended, [year, month, day]) => Some((
            i32::try_from(year.digits(&[4])?).ok()?,
            month.digits(SHORT)?,
            day.digits(SHORT)?,
        )),
        (DatePattern::IsoBasic, [Token::Number(digits)]) if digits.len() == 8 => Some((
            digits[..4].parse().ok()?,
            digits[4..6].parse().ok()?,
            digits[6..].parse().ok()?,
        )),
        (DatePattern::DayMonthYear, [day, month, year]) => {
            Some((expand_year(year)?, month.digits(SHORT)?, day.digits(SHORT)?))
        }
        (DatePattern::MonthDayYear, [month, day, year]) => {
            Some((expand_year(year)?, month.digits(SHORT)?, day.digits(SHORT)?))
        }
        (DatePattern::DayTextMonthYear, [day, month, year]) => {
            Some((expand_year(year)?, month.month_name()?, day.digits(SHORT)?))
        }
        (DatePattern::TextMonthDayYear, [month, day, year]) => {
            Some((expand_year(year)?, month.month_name()?, day.digits(SHORT)?))
        }
        (DatePattern::YearTextMonthDay, [year, month, day]) => Some((
            i32::try_from(year.digits(&[4])?).ok()?,
            month.month_name()?,
            day.digits(SHORT)?,
        )),
        _ => None,
    }
}

/// English and German month names and abbreviations.
fn month_from_name(word: &str) -> Option<u32> {
    let lower = word.to_lowercase();
    let month = match lower.as_str() {
        "jan" | "january" | "januar" | "jänner" => 1,
        "feb" | "february" | "februar" => 2,
        "mar" | "march" | "mär" | "märz" | "maerz" => 3,
        "apr" | "april" => 4,
        "may" | "mai" => 5,
        "jun" | "june" | "juni" => 6,
        "jul" | "july" | "juli" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" | "okt" | "oktober" => 10,
        "nov" | "november" => 11,
        "dec" | "december" | "dez" | "dezember" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day_first(raw: &str) -> Result<String, String> {
        parse_date(raw, DateOrder::DayFirst).map(format_iso)
    }

    #[test]
    fn rejects_impossible_dates() {
        for raw in ["2023-02-30", "2023-13-01", "2023-00-10", "29.02.2023", "31/04/2022"] {
            assert_eq!(
                day_first(raw),
                Err("not a calendar date".to_string()),
                "{raw}"
            );
        }
    }

    #[test]
    fn accepts_leap_day() {
        assert_eq!(day_first("29.02.2024").as_deref(), Ok("2024-02-29"));
    }

    #[test]
    fn iso_forms() {
        assert_eq!(day_first("2023-03-05").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("2023/3/5").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("2023.03.05").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("20230305").as_deref(), Ok("2023-03-05"));
    }

    #[test]
    fn ambiguity_follows_configured_order() {
        assert_eq!(day_first("03/04/2023").as_deref(), Ok("2023-04-03"));
        assert_eq!(
            parse_date("03/04/2023", DateOrder::MonthFirst).map(format_iso).as_deref(),
            Ok("2023-03-04")
        );
    }

    #[test]
    fn unambiguous_dates_ignore_order() {
        assert_eq!(day_first("12/31/2023").as_deref(), Ok("2023-12-31"));
        assert_eq!(
            parse_date("31.12.2023", DateOrder::MonthFirst).map(format_iso).as_deref(),
            Ok("2023-12-31")
        );
    }

    #[test]
    fn two_digit_years_pivot() {
        assert_eq!(day_first("05.03.23").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("05.03.68").as_deref(), Ok("2068-03-05"));
        assert_eq!(day_first("05.03.69").as_deref(), Ok("1969-03-05"));
    }

    #[test]
    fn textual_months() {
        assert_eq!(day_first("5 March 2023").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("March 5th, 2023").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("Sun, 5 Mar 2023").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("2023 Mar 5").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("1. Mai 2023").as_deref(), Ok("2023-05-01"));
        assert_eq!(day_first("30 February 2023"), Err("not a calendar date".to_string()));
    }

    #[test]
    fn drops_time_of_day() {
        assert_eq!(day_first("2023-03-05T10:00:00Z").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("05.03.2023 10:30").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("3/5/2023 9:15 PM").as_deref(), Ok("2023-05-03"));
    }

    #[test]
    fn numeric_dates_need_real_separators() {
        assert_eq!(
            day_first("5 3 2023"),
            Err("numeric date needs `-`, `/` or `.` separators".to_string())
        );
        assert!(day_first("1,2,2023").is_err());
        assert_eq!(day_first("1,2.2023"), Err("mixed date separators".to_string()));
        assert_eq!(day_first("March 5, 2023").as_deref(), Ok("2023-03-05"));
        assert_eq!(day_first("5 March, 2023").as_deref(), Ok("2023-03-05"));
    }

    #[test]
    fn rejects_non_dates() {
        for raw in ["hello", "12", "2023-03", "1,234.56", "5 Smarch 2023", "2023-03/05"] {
            assert!(day_first(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn normalize_reports_original_text() {
        let failure = normalize_date(" 31.02.2023 ", &DateOptions::default()).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::DateParseError);
        assert_eq!(failure.original, " 31.02.2023 ");
    }
}
