#![deny(unsafe_code)]

//! Lookup keys for country and subdivision names.

/// Names of this many characters or fewer (dots removed) only match exactly.
const SHORT_NAME_LEN: usize = 3;

/// Case-folded lookup key: lowercase, dots removed, hyphens read as spaces,
/// whitespace collapsed.
pub fn match_key(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|ch| *ch != '.')
        .map(|ch| if ch == '-' || ch == '_' { ' ' } else { ch })
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-preserving key: dots removed, whitespace collapsed.
fn compact(text: &str) -> String {
    let stripped: String = text.chars().filter(|ch| *ch != '.').collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A phrase from user input, prepared once for repeated comparisons.
#[derive(Debug, Clone)]
pub struct Probe {
    pub raw: String,
    pub compact: String,
    pub key: String,
}

impl Probe {
    pub fn new(phrase: &str) -> Self {
        let raw = phrase.trim().to_string();
        Self {
            compact: compact(&raw),
            key: match_key(&raw),
            raw,
        }
    }

    pub fn is_short(&self) -> bool {
        self.compact.chars().count() <= SHORT_NAME_LEN
    }
}

/// A reference name or alias in lookup form.
///
/// Short forms such as `UK` or `NRW` compare case-sensitively so that
/// ordinary words (`uk`, `Ga`) in free text do not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameKey {
    Short(String),
    Folded(String),
}

impl NameKey {
    pub fn new(name: &str) -> Self {
        let compact = compact(name);
        if compact.chars().count() <= SHORT_NAME_LEN {
            NameKey::Short(compact)
        } else {
            NameKey::Folded(match_key(name))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NameKey::Short(key) | NameKey::Folded(key) => key,
        }
    }

    pub fn matches(&self, probe: &Probe) -> bool {
        match self {
            NameKey::Short(key) => probe.compact == *key,
            NameKey::Folded(key) => !probe.is_short() && probe.key == *key,
        }
    }
}
