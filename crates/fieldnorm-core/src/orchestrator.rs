//! Table orchestrator: validate, detect, run column pipelines, assemble.

use std::time::Instant;

use fieldnorm_model::{
    CleanedTable, Column, ConfigError, EngineError, FieldOptions, RawTable, ReferenceInfo, Report,
    RunConfig,
};
use fieldnorm_standards::{ReferenceTables, registry};
use fieldnorm_transform::{DetectionOutcome, FieldNormalizer, detect_kind};
use rayon::prelude::*;
use tracing::{debug, debug_span, info, info_span, warn};

use crate::pipeline::{ColumnOutput, run_column};

/// Normalizes every column of `table` against the embedded reference tables.
///
/// Cell failures never abort the run; they are recorded in the [`Report`]
/// and the original text is kept. Structural and configuration errors abort
/// before any cell is touched.
pub fn normalize(
    table: &RawTable,
    config: &RunConfig,
) -> Result<(CleanedTable, Report), EngineError> {
    normalize_with(table, config, registry())
}

/// Like [`normalize`], with explicit reference tables.
pub fn normalize_with(
    table: &RawTable,
    config: &RunConfig,
    tables: &ReferenceTables,
) -> Result<(CleanedTable, Report), EngineError> {
    let span = info_span!(
        "normalize",
        columns = table.column_count(),
        rows = table.row_count()
    );
    let _guard = span.enter();
    let start = Instant::now();

    table.validate()?;
    config.detector.validate()?;
    let plans = plan_columns(table, config, tables)?;
    for name in unknown_config_columns(table, config) {
        warn!(column = name, "configured column is not in the table");
    }

    let run = |(column, options): (&Column, &FieldOptions)| {
        let column_span = debug_span!(parent: &span, "column", column = %column.name);
        let _column_guard = column_span.enter();
        let outcome = detect_column(column, options, config, tables);
        let normalizer = FieldNormalizer::new(outcome.kind, options.clone(), tables);
        run_column(column, outcome, &normalizer, config.engine.parallel)
    };
    let pairs: Vec<_> = table.columns.iter().zip(plans.iter()).collect();
    let outputs: Vec<ColumnOutput> = if config.engine.parallel {
        pairs.into_par_iter().map(run).collect()
    } else {
        pairs.into_iter().map(run).collect()
    };

    let mut columns = Vec::with_capacity(outputs.len());
    let mut reports = Vec::with_capacity(outputs.len());
    for ColumnOutput { column, report } in outputs {
        columns.push(column);
        reports.push(report);
    }

    let report = Report::new(
        reports,
        ReferenceInfo {
            version: tables.version().to_string(),
            fingerprint: tables.fingerprint().to_string(),
        },
    );
    for (column, warning) in report.warnings() {
        warn!(column, kind = %warning.kind, "{}", warning.message);
    }
    info!(
        cells = report.summary.total_cells,
        ok = report.summary.total_ok,
        failed = report.summary.total_failed,
        skipped_empty = report.summary.total_skipped_empty,
        passed_through = report.summary.total_passed_through,
        duration_ms = start.elapsed().as_millis(),
        "normalization complete"
    );
    Ok((CleanedTable::from_columns(columns), report))
}

/// Resolves and validates the options of every column, in column order.
fn plan_columns(
    table: &RawTable,
    config: &RunConfig,
    tables: &ReferenceTables,
) -> Result<Vec<FieldOptions>, ConfigError> {
    table
        .columns
        .iter()
        .map(|column| {
            let options = config.options_for(&column.name)?;
            check_reference_options(&column.name, &options, tables)?;
            debug!(column = %column.name, "options resolved");
            Ok(options)
        })
        .collect()
}

fn check_reference_options(
    name: &str,
    options: &FieldOptions,
    tables: &ReferenceTables,
) -> Result<(), ConfigError> {
    let scope = || format!("column `{name}`");
    if let Some(code) = &options.phone.default_calling_code
        && tables.calling_code(code).is_none()
    {
        return Err(ConfigError::UnknownCallingCode {
            scope: scope(),
            code: code.clone(),
        });
    }
    if let Some(requested) = &options.address.table_version
        && requested != tables.version()
    {
        return Err(ConfigError::TableVersionMismatch {
            scope: scope(),
            requested: requested.clone(),
            loaded: tables.version().to_string(),
        });
    }
    Ok(())
}

/// Configured column names the table does not have.
fn unknown_config_columns<'c>(table: &RawTable, config: &'c RunConfig) -> Vec<&'c str> {
    config
        .columns
        .keys()
        .map(String::as_str)
        .filter(|name| table.column(name).is_none())
        .collect()
}

fn detect_column(
    column: &Column,
    options: &FieldOptions,
    config: &RunConfig,
    tables: &ReferenceTables,
) -> DetectionOutcome {
    let override_kind = config.column_config(&column.name).and_then(|cfg| cfg.kind);
    detect_kind(
        &column.name,
        &column.cells,
        override_kind,
        options,
        &config.detector,
        tables,
    )
}

/// Kind bound to each column, without normalizing any cell.
pub fn detect_columns(
    table: &RawTable,
    config: &RunConfig,
    tables: &ReferenceTables,
) -> Result<Vec<(String, DetectionOutcome)>, EngineError> {
    table.validate()?;
    config.detector.validate()?;
    let plans = plan_columns(table, config, tables)?;
    Ok(table
        .columns
        .iter()
        .zip(&plans)
        .map(|(column, options)| {
            (
                column.name.clone(),
                detect_column(column, options, config, tables),
            )
        })
        .collect())
}
