#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use crate::csv::calling_codes::{CallingCode, parse_calling_codes_csv};
use crate::csv::countries::{Country, parse_countries_csv};
use crate::csv::subdivisions::{Subdivision, parse_subdivisions_csv};
use crate::error::StandardsError;
use crate::hash::{fingerprint, sha256_hex};
use crate::manifest::{Manifest, ManifestFile};
use crate::names::{NameKey, Probe};

const MANIFEST_SCHEMA: &str = "fieldnorm.reference-manifest";

const REQUIRED_ROLES: &[&str] = &["calling_codes", "countries", "subdivisions"];

const ALLOWED_KINDS: &[&str] = &["csv"];

const EMBEDDED_ORIGIN: &str = "<embedded>";

const EMBEDDED_MANIFEST: &str = include_str!("../data/manifest.toml");

const EMBEDDED_FILES: &[(&str, &[u8])] = &[
    (
        "calling_codes.csv",
        include_bytes!("../data/calling_codes.csv"),
    ),
    ("countries.csv", include_bytes!("../data/countries.csv")),
    ("subdivisions.csv", include_bytes!("../data/subdivisions.csv")),
];

static REGISTRY: LazyLock<ReferenceTables> = LazyLock::new(|| {
    ReferenceTables::load_embedded().expect("embedded reference tables must verify and parse")
});

/// Process-wide reference tables, loaded from the embedded copy on first use.
pub fn registry() -> &'static ReferenceTables {
    &REGISTRY
}

/// Subdivision matching passes, tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionPass {
    /// Name or code exactly as listed.
    Exact,
    /// Name compared case-insensitively.
    Name,
    /// Abbreviations and alternative names.
    Alias,
}

impl RegionPass {
    pub const ORDER: [RegionPass; 3] = [RegionPass::Exact, RegionPass::Name, RegionPass::Alias];
}

/// Verified, indexed reference tables. Immutable once built.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    manifest: Manifest,
    fingerprint: String,
    calling_codes: BTreeMap<String, CallingCode>,
    countries: Vec<Country>,
    country_codes: HashMap<String, usize>,
    country_names: HashMap<String, usize>,
    country_short_names: HashMap<String, usize>,
    subdivisions: BTreeMap<String, Vec<Subdivision>>,
}

impl ReferenceTables {
    /// Loads the tables compiled into the binary.
    pub fn load_embedded() -> Result<Self, StandardsError> {
        let origin = Path::new(EMBEDDED_ORIGIN);
        let manifest = parse_manifest(EMBEDDED_MANIFEST, &origin.join("manifest.toml"))?;
        Self::build(manifest, origin, |file| {
            EMBEDDED_FILES
                .iter()
                .find(|(name, _)| *name == file.path)
                .map(|(_, bytes)| bytes.to_vec())
                .ok_or_else(|| StandardsError::MissingFile {
                    path: origin.join(&file.path),
                })
        })
    }

    /// Loads a table directory containing `manifest.toml` and the files it lists.
    pub fn load_dir(dir: &Path) -> Result<Self, StandardsError> {
        let manifest_path = dir.join("manifest.toml");
        let contents = std::fs::read_to_string(&manifest_path)
            .map_err(|e| StandardsError::io(&manifest_path, e))?;
        let manifest = parse_manifest(&contents, &manifest_path)?;
        Self::build(manifest, dir, |file| {
            let full_path = dir.join(&file.path);
            std::fs::read(&full_path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StandardsError::MissingFile { path: full_path }
                } else {
                    StandardsError::io(full_path, e)
                }
            })
        })
    }

    fn build(
        manifest: Manifest,
        origin: &Path,
        mut read: impl FnMut(&ManifestFile) -> Result<Vec<u8>, StandardsError>,
    ) -> Result<Self, StandardsError> {
        validate_manifest(&manifest)?;

        let mut files = manifest.files.clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut contents: BTreeMap<&str, (PathBuf, Vec<u8>)> = BTreeMap::new();
        for file in &files {
            let bytes = read(file)?;
            let path = origin.join(&file.path);
            verify_bytes(&path, &bytes, file)?;
            contents.insert(file.role.as_str(), (path, bytes));
        }
        let role = |name: &str| {
            contents
                .get(name)
                .map(|(path, bytes)| (path.as_path(), bytes.as_slice()))
                .ok_or_else(|| StandardsError::MissingRole {
                    role: name.to_string(),
                })
        };

        let (path, bytes) = role("calling_codes")?;
        let calling_codes = parse_calling_codes_csv(bytes, path)?;
        let (path, bytes) = role("countries")?;
        let countries = parse_countries_csv(bytes, path)?;
        let (path, bytes) = role("subdivisions")?;
        let subdivision_rows = parse_subdivisions_csv(bytes, path)?;

        let mut country_codes = HashMap::new();
        let mut country_names = HashMap::new();
        let mut country_short_names = HashMap::new();
        for (idx, country) in countries.iter().enumerate() {
            if country_codes.insert(country.alpha2.clone(), idx).is_some()
                || country_codes.insert(country.alpha3.clone(), idx).is_some()
            {
                return Err(StandardsError::InvalidManifest {
                    message: format!("duplicate country code {}", country.alpha2),
                });
            }
            if let Some(code) = &country.calling_code
                && !calling_codes.contains_key(code)
            {
                return Err(StandardsError::InvalidManifest {
                    message: format!(
                        "country {} uses unknown calling code +{code}",
                        country.alpha2
                    ),
                });
            }
            for key in country.name_keys() {
                match key {
                    NameKey::Short(key) => country_short_names.entry(key).or_insert(idx),
                    NameKey::Folded(key) => country_names.entry(key).or_insert(idx),
                };
            }
        }

        let mut subdivisions: BTreeMap<String, Vec<Subdivision>> = BTreeMap::new();
        for subdivision in subdivision_rows {
            if !country_codes.contains_key(&subdivision.country) {
                return Err(StandardsError::InvalidManifest {
                    message: format!(
                        "subdivision {} belongs to unknown country",
                        subdivision.iso_code()
                    ),
                });
            }
            let entries = subdivisions.entry(subdivision.country.clone()).or_default();
            if entries.iter().any(|existing| existing.code == subdivision.code) {
                return Err(StandardsError::InvalidManifest {
                    message: format!("duplicate subdivision {}", subdivision.iso_code()),
                });
            }
            entries.push(subdivision);
        }

        let fingerprint = fingerprint(
            files
                .iter()
                .map(|file| (file.path.as_str(), file.sha256.as_str())),
        );

        Ok(Self {
            manifest,
            fingerprint,
            calling_codes,
            countries,
            country_codes,
            country_names,
            country_short_names,
            subdivisions,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Pinned table version from the manifest.
    pub fn version(&self) -> &str {
        &self.manifest.pins.version
    }

    /// Digest over all file pins; changes whenever any table changes.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn calling_code(&self, code: &str) -> Option<&CallingCode> {
        self.calling_codes.get(code)
    }

    pub fn calling_codes(&self) -> impl Iterator<Item = &CallingCode> {
        self.calling_codes.values()
    }

    /// Resolves the calling code at the start of an international number.
    pub fn match_calling_code(&self, digits: &str) -> Option<&CallingCode> {
        (1..=3)
            .filter_map(|len| digits.get(..len))
            .find_map(|prefix| self.calling_codes.get(prefix))
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Looks up a country by alpha-2 or alpha-3 code.
    pub fn country_by_code(&self, code: &str) -> Option<&Country> {
        self.country_codes.get(code).map(|&idx| &self.countries[idx])
    }

    /// Resolves a phrase to a country.
    ///
    /// ISO codes match only as exact uppercase text. Names and aliases match
    /// case-insensitively unless they are three characters or shorter.
    pub fn find_country(&self, phrase: &str) -> Option<&Country> {
        let probe = Probe::new(phrase);
        if let Some(country) = self.country_by_code(&probe.raw) {
            return Some(country);
        }
        let idx = if probe.is_short() {
            self.country_short_names.get(&probe.compact)
        } else {
            self.country_names.get(&probe.key)
        };
        idx.map(|&idx| &self.countries[idx])
    }

    /// Subdivisions of a country in table order; empty for unknown countries.
    pub fn subdivisions(&self, alpha2: &str) -> &[Subdivision] {
        self.subdivisions
            .get(alpha2)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn subdivision(&self, alpha2: &str, code: &str) -> Option<&Subdivision> {
        self.subdivisions(alpha2)
            .iter()
            .find(|subdivision| subdivision.code == code)
    }

    /// Looks up a full ISO 3166-2 code such as `US-CA`.
    pub fn subdivision_by_iso(&self, iso_code: &str) -> Option<&Subdivision> {
        let (country, code) = iso_code.split_once('-')?;
        self.subdivision(country, code)
    }

    /// Finds a subdivision of `alpha2` matching `phrase` in one pass.
    pub fn find_subdivision(
        &self,
        alpha2: &str,
        phrase: &str,
        pass: RegionPass,
    ) -> Option<&Subdivision> {
        let probe = Probe::new(phrase);
        if probe.raw.is_empty() {
            return None;
        }
        self.subdivisions(alpha2)
            .iter()
            .find(|subdivision| match pass {
                RegionPass::Exact => subdivision.name == probe.raw || subdivision.code == probe.raw,
                RegionPass::Name => subdivision.name_key == probe.key,
                RegionPass::Alias => subdivision.alias_keys.iter().any(|key| key.matches(&probe)),
            })
    }

    pub fn subdivision_count(&self) -> usize {
        self.subdivisions.values().map(Vec::len).sum()
    }
}

fn parse_manifest(contents: &str, path: &Path) -> Result<Manifest, StandardsError> {
    toml::from_str(contents).map_err(|e| StandardsError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest) -> Result<(), StandardsError> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(StandardsError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != 1 {
        return Err(StandardsError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }
    if manifest.pins.version.trim().is_empty() {
        return Err(StandardsError::InvalidManifest {
            message: "pins.version is empty".to_string(),
        });
    }

    let mut roles: BTreeSet<&str> = BTreeSet::new();
    for file in &manifest.files {
        if !roles.insert(file.role.as_str()) {
            return Err(StandardsError::DuplicateRole {
                role: file.role.clone(),
            });
        }
        if !ALLOWED_KINDS.contains(&file.kind.as_str()) {
            return Err(StandardsError::InvalidManifest {
                message: format!("unsupported kind '{}' for {}", file.kind, file.path),
            });
        }
        validate_sha(&file.sha256, &file.path)?;
        validate_path(&file.path)?;
    }

    for role in REQUIRED_ROLES {
        if !roles.contains(role) {
            return Err(StandardsError::MissingRole {
                role: (*role).to_string(),
            });
        }
    }
    Ok(())
}

fn validate_sha(sha256: &str, path: &str) -> Result<(), StandardsError> {
    if sha256.len() != 64 || !sha256.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(StandardsError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "expected 64 hex characters".to_string(),
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), StandardsError> {
    let candidate = Path::new(path);
    let escapes = candidate
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if path.is_empty() || escapes {
        return Err(StandardsError::InvalidPath {
            path: candidate.to_path_buf(),
            message: "must be a relative path inside the table directory".to_string(),
        });
    }
    Ok(())
}

fn verify_bytes(path: &Path, bytes: &[u8], file: &ManifestFile) -> Result<(), StandardsError> {
    let actual = sha256_hex(bytes);
    let expected = file.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(StandardsError::Sha256Mismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}
