//! Column type detection.
//!
//! An explicit kind always wins. Otherwise the first `sample_size` non-empty
//! cells are probed with every candidate normalizer and the kind with the
//! highest success ratio is chosen, ties going to the earlier candidate in
//! [`FieldKind::CANDIDATES`]. Detection never fails: an undecided column is
//! bound to [`FieldKind::Unrecognized`] with a warning.

use fieldnorm_model::{
    ColumnWarning, DetectorOptions, Detection, ErrorKind, FieldKind, FieldOptions, is_empty_cell,
};
use fieldnorm_standards::ReferenceTables;

use crate::normalizer::FieldNormalizer;

/// Kind bound to a column plus how it was chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub kind: FieldKind,
    pub detection: Detection,
    pub warning: Option<ColumnWarning>,
}

fn unrecognized_warning(detail: &str) -> ColumnWarning {
    ColumnWarning {
        kind: ErrorKind::UnrecognizedColumnTypeWarning,
        message: format!("no normalizer applied: {detail}"),
    }
}

/// Binds a kind to a column.
pub fn detect_kind(
    column: &str,
    cells: &[String],
    override_kind: Option<FieldKind>,
    options: &FieldOptions,
    detector: &DetectorOptions,
    tables: &ReferenceTables,
) -> DetectionOutcome {
    if let Some(kind) = override_kind {
        tracing::debug!(column, kind = %kind, "kind set by configuration");
        let warning = (!kind.is_normalized())
            .then(|| unrecognized_warning("column configured as unrecognized"));
        return DetectionOutcome {
            kind,
            detection: Detection::Override,
            warning,
        };
    }

    let sample: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|cell| !is_empty_cell(cell))
        .take(detector.sample_size)
        .collect();
    if sample.is_empty() {
        tracing::debug!(column, "no non-empty cells to sample");
        return DetectionOutcome {
            kind: FieldKind::Unrecognized,
            detection: Detection::Undecided {
                best: None,
                ratio: 0.0,
                sampled: 0,
            },
            warning: Some(unrecognized_warning("column has no values")),
        };
    }

    let mut best: Option<(FieldKind, f64)> = None;
    for kind in FieldKind::CANDIDATES {
        let normalizer = FieldNormalizer::new(kind, options.clone(), tables);
        let hits = sample.iter().filter(|cell| normalizer.looks_like(cell)).count();
        let ratio = hits as f64 / sample.len() as f64;
        tracing::trace!(column, kind = %kind, hits, sampled = sample.len(), "probe");
        if best.is_none_or(|(_, best_ratio)| ratio > best_ratio) {
            best = Some((kind, ratio));
        }
    }

    let sampled = sample.len();
    match best {
        Some((kind, ratio)) if ratio > 0.0 && ratio >= detector.min_success_ratio => {
            tracing::debug!(column, kind = %kind, ratio, sampled, "kind detected");
            DetectionOutcome {
                kind,
                detection: Detection::Detected { ratio, sampled },
                warning: None,
            }
        }
        _ => {
            let (best_kind, ratio) = match best {
                Some((kind, ratio)) if ratio > 0.0 => (Some(kind), ratio),
                _ => (None, 0.0),
            };
            let detail = match best_kind {
                Some(kind) => format!(
                    "best candidate {kind} matched {:.0}% of {sampled} sampled values",
                    ratio * 100.0
                ),
                None => format!("no candidate matched any of {sampled} sampled values"),
            };
            tracing::debug!(column, ratio, sampled, "column left unrecognized");
            DetectionOutcome {
                kind: FieldKind::Unrecognized,
                detection: Detection::Undecided {
                    best: best_kind,
                    ratio,
                    sampled,
                },
                warning: Some(unrecognized_warning(&detail)),
            }
        }
    }
}
