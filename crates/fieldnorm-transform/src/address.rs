//! Address to ISO 3166-2 region code.
//!
//! The text is split into segments on commas (and `;`, `|`, newlines), each
//! segment into words. Phrases of up to four consecutive words within a
//! segment are matched against the reference tables, scanning from the end
//! of the address, since country and region usually come last.

use fieldnorm_model::{CellFailure, ErrorKind};
use fieldnorm_standards::{Country, ReferenceTables, RegionPass};

/// Longest phrase tried, in words (`United States of America`).
const MAX_PHRASE_WORDS: usize = 4;

const SEGMENT_DELIMITERS: &[char] = &[',', ';', '|', '\n'];

/// A run of consecutive words inside one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Phrase {
    segment: usize,
    start: usize,
    end: usize,
    text: String,
    /// The phrase spans its whole segment.
    whole_segment: bool,
}

impl Phrase {
    fn overlaps(&self, other: &Phrase) -> bool {
        self.segment == other.segment && self.start < other.end && other.start < self.end
    }

    fn is_numeric(&self) -> bool {
        self.text.chars().all(|ch| ch.is_ascii_digit())
    }
}

/// All phrases in search order: last segment first, longer phrases before
/// shorter ones, later positions before earlier ones.
fn phrases(text: &str) -> Vec<Phrase> {
    let segments: Vec<Vec<&str>> = text
        .split(SEGMENT_DELIMITERS)
        .map(|segment| segment.split_whitespace().collect())
        .collect();

    let mut out = Vec::new();
    for (segment, words) in segments.iter().enumerate().rev() {
        for len in (1..=MAX_PHRASE_WORDS.min(words.len())).rev() {
            for start in (0..=words.len() - len).rev() {
                out.push(Phrase {
                    segment,
                    start,
                    end: start + len,
                    text: words[start..start + len].join(" "),
                    whole_segment: len == words.len(),
                });
            }
        }
    }
    out
}

fn find_country<'t>(
    phrases: &[Phrase],
    tables: &'t ReferenceTables,
) -> Option<(&'t Country, usize)> {
    phrases
        .iter()
        .enumerate()
        .find_map(|(idx, phrase)| tables.find_country(&phrase.text).map(|country| (country, idx)))
}

pub fn normalize_address(raw: &str, tables: &ReferenceTables) -> Result<String, CellFailure> {
    let trimmed = raw.trim();
    if let Some(subdivision) = tables.subdivision_by_iso(trimmed) {
        return Ok(subdivision.iso_code());
    }

    let phrases = phrases(trimmed);
    let Some((country, country_idx)) = find_country(&phrases, tables) else {
        return Err(CellFailure::new(
            raw,
            ErrorKind::AddressCountryNotFoundError,
            "no known country name or code",
        ));
    };
    let country_phrase = &phrases[country_idx];

    let candidates: Vec<&Phrase> = phrases
        .iter()
        .filter(|phrase| !phrase.overlaps(country_phrase))
        .filter(|phrase| !phrase.is_numeric() || phrase.whole_segment)
        .collect();

    for pass in RegionPass::ORDER {
        for phrase in &candidates {
            if let Some(subdivision) = tables.find_subdivision(&country.alpha2, &phrase.text, pass)
            {
                return Ok(subdivision.iso_code());
            }
        }
    }

    Err(CellFailure::new(
        raw,
        ErrorKind::AddressRegionNotFoundError,
        format!("no subdivision of {} found", country.name),
    ))
}

/// Probe: the value is a listed region code or names a known country.
pub fn looks_like_address(raw: &str, tables: &ReferenceTables) -> bool {
    let trimmed = raw.trim();
    tables.subdivision_by_iso(trimmed).is_some()
        || find_country(&phrases(trimmed), tables).is_some()
}

#[cfg(test)]
mod tests {
    use fieldnorm_standards::registry;

    use super::*;

    fn region(raw: &str) -> Result<String, ErrorKind> {
        normalize_address(raw, registry()).map_err(|failure| failure.kind)
    }

    #[test]
    fn resolves_full_addresses() {
        assert_eq!(region("123 Main St, Sacramento, CA, USA").as_deref(), Ok("US-CA"));
        assert_eq!(region("Munich, Bavaria, Germany").as_deref(), Ok("DE-BY"));
        assert_eq!(
            region("350 Fifth Avenue, New York, NY 10118, United States").as_deref(),
            Ok("US-NY")
        );
        assert_eq!(region("10115 Berlin, Deutschland").as_deref(), Ok("DE-BE"));
        assert_eq!(region("Toronto, Ontario, Canada").as_deref(), Ok("CA-ON"));
        assert_eq!(region("Charleston, W.Va., USA").as_deref(), Ok("US-WV"));
        assert_eq!(region("Wheeling, West Virginia, US").as_deref(), Ok("US-WV"));
    }

    #[test]
    fn exact_then_case_insensitive_then_alias() {
        assert_eq!(region("Stuttgart, baden-württemberg, DE").as_deref(), Ok("DE-BW"));
        assert_eq!(region("Köln, NRW, Germany").as_deref(), Ok("DE-NW"));
        assert_eq!(region("Geneva, Switzerland").as_deref(), Ok("CH-GE"));
    }

    #[test]
    fn numeric_codes_only_match_whole_segments() {
        assert_eq!(region("Vienna, Austria").as_deref(), Ok("AT-9"));
        assert_eq!(region("Hauptstrasse 1, 9, AT").as_deref(), Ok("AT-9"));
        assert_eq!(
            region("Hauptstrasse 9, Austria"),
            Err(ErrorKind::AddressRegionNotFoundError)
        );
    }

    #[test]
    fn canonical_codes_pass_through() {
        assert_eq!(region("US-CA").as_deref(), Ok("US-CA"));
        assert_eq!(region(" FR-20R ").as_deref(), Ok("FR-20R"));
    }

    #[test]
    fn failures() {
        assert_eq!(region("Atlantis"), Err(ErrorKind::AddressCountryNotFoundError));
        assert_eq!(region(""), Err(ErrorKind::AddressCountryNotFoundError));
        assert_eq!(
            region("Springfield, USA"),
            Err(ErrorKind::AddressRegionNotFoundError)
        );
    }

    #[test]
    fn probe() {
        let tables = registry();
        assert!(looks_like_address("Munich, Germany", tables));
        assert!(looks_like_address("DE-BY", tables));
        assert!(!looks_like_address("1234.56", tables));
        assert!(!looks_like_address("0170 1234567", tables));
    }
}
