//! Column pipeline: one column, one bound kind.
//!
//! Cells are pure functions of their text, so each distinct non-empty value
//! is normalized once and the result fanned out to every row holding it.

use std::collections::HashMap;

use fieldnorm_model::{CellResult, Column, ColumnReport, FailedCell, FieldKind, is_empty_cell};
use fieldnorm_transform::{DetectionOutcome, FieldNormalizer};
use rayon::prelude::*;

/// Output of one column pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOutput {
    pub column: Column,
    pub report: ColumnReport,
}

/// Runs one column through its normalizer.
///
/// Empty cells are copied unchanged and counted as skipped. Columns bound to
/// [`FieldKind::Unrecognized`] are copied unchanged.
pub fn run_column(
    column: &Column,
    outcome: DetectionOutcome,
    normalizer: &FieldNormalizer<'_>,
    parallel: bool,
) -> ColumnOutput {
    let mut report = ColumnReport::new(&column.name, outcome.kind, outcome.detection);
    report.warnings.extend(outcome.warning);

    if normalizer.kind() == FieldKind::Unrecognized {
        for cell in &column.cells {
            if is_empty_cell(cell) {
                report.counts.skipped_empty += 1;
            } else {
                report.counts.passed_through += 1;
            }
        }
        return ColumnOutput {
            column: column.clone(),
            report,
        };
    }

    let results = normalize_distinct(&column.cells, normalizer, parallel);
    tracing::debug!(
        column = %column.name,
        distinct = results.len(),
        rows = column.len(),
        "normalized distinct values"
    );

    let mut cells = Vec::with_capacity(column.len());
    for (row, raw) in column.cells.iter().enumerate() {
        let Some(result) = results.get(raw.as_str()) else {
            report.counts.skipped_empty += 1;
            cells.push(raw.clone());
            continue;
        };
        cells.push(result.cleaned_text().to_string());
        match result {
            CellResult::Ok(_) => report.counts.ok += 1,
            CellResult::Failed(_) => {
                report.counts.failed += 1;
                report.failures.push(FailedCell {
                    row,
                    result: result.clone(),
                });
            }
        }
    }

    ColumnOutput {
        column: Column::new(&column.name, cells),
        report,
    }
}

/// Normalizes every distinct non-empty cell. Empty cells have no entry.
fn normalize_distinct<'c>(
    cells: &'c [String],
    normalizer: &FieldNormalizer<'_>,
    parallel: bool,
) -> HashMap<&'c str, CellResult> {
    let mut distinct: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|cell| !is_empty_cell(cell))
        .collect();
    distinct.sort_unstable();
    distinct.dedup();

    if parallel {
        distinct
            .into_par_iter()
            .map(|raw| (raw, normalizer.normalize(raw)))
            .collect()
    } else {
        distinct
            .into_iter()
            .map(|raw| (raw, normalizer.normalize(raw)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use fieldnorm_model::{Detection, ErrorKind, FieldOptions};
    use fieldnorm_standards::registry;

    use super::*;

    fn run(kind: FieldKind, cells: &[&str]) -> ColumnOutput {
        let column = Column::from_strs("value", cells);
        let normalizer = FieldNormalizer::new(kind, FieldOptions::default(), registry());
        let outcome = DetectionOutcome {
            kind,
            detection: Detection::Override,
            warning: None,
        };
        run_column(&column, outcome, &normalizer, false)
    }

    #[test]
    fn counts_every_cell_once() {
        let output = run(FieldKind::Number, &["1,5", "", "abc", "1,5", "  ", "7"]);
        let counts = output.report.counts;
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.ok, 3);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.skipped_empty, 2);
        assert_eq!(output.column.cells[4], "  ");
    }

    #[test]
    fn repeated_values_share_one_result() {
        let output = run(FieldKind::Date, &["31.12.2023", "bad", "31.12.2023", "bad"]);
        assert_eq!(
            output.column.cells,
            vec!["2023-12-31", "bad", "2023-12-31", "bad"]
        );
        let rows: Vec<usize> = output.report.failures.iter().map(|cell| cell.row).collect();
        assert_eq!(rows, vec![1, 3]);
        assert!(
            output
                .report
                .failures
                .iter()
                .all(|cell| cell.result.error_kind() == Some(ErrorKind::DateParseError))
        );
    }

    #[test]
    fn unrecognized_columns_pass_through() {
        let output = run(FieldKind::Unrecognized, &["a", "", "b"]);
        assert_eq!(output.column.cells, vec!["a", "", "b"]);
        assert_eq!(output.report.counts.passed_through, 2);
        assert_eq!(output.report.counts.skipped_empty, 1);
        assert!(output.report.failures.is_empty());
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let column = Column::from_strs("phone", &["0170 1234567", "x", "+1 415 555 0100", ""]);
        let options = FieldOptions {
            phone: fieldnorm_model::PhoneOptions {
                default_calling_code: Some("49".to_string()),
            },
            ..FieldOptions::default()
        };
        let normalizer = FieldNormalizer::new(FieldKind::Phone, options, registry());
        let outcome = DetectionOutcome {
            kind: FieldKind::Phone,
            detection: Detection::Override,
            warning: None,
        };
        assert_eq!(
            run_column(&column, outcome.clone(), &normalizer, true),
            run_column(&column, outcome, &normalizer, false)
        );
    }
}
