use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use comfy_table::Table;
use tracing::{debug, info, info_span, trace};

use fieldnorm_cli::logging::redact_value;
use fieldnorm_cli::overrides::FlagOverrides;
use fieldnorm_cli::summary::{apply_table_style, detection_label, print_preview, print_summary};
use fieldnorm_core::{detect_columns, normalize};
use fieldnorm_ingest::{Delimiter, load_run_config, read_table, write_table};
use fieldnorm_model::{RawTable, Report, RunConfig, RunStatus};
use fieldnorm_standards::registry;

use crate::cli::{CleanArgs, DelimiterArg, DetectArgs, InputArgs, RegionsArgs};

/// Table and configuration shared by every command that reads input.
struct Loaded {
    table: RawTable,
    config: RunConfig,
    delimiter: Delimiter,
}

fn delimiter_from_arg(arg: DelimiterArg) -> Delimiter {
    match arg {
        DelimiterArg::Comma => Delimiter::Comma,
        DelimiterArg::Semicolon => Delimiter::Semicolon,
        DelimiterArg::Tab => Delimiter::Tab,
    }
}

fn load(input: &InputArgs, flags: &FlagOverrides) -> Result<Loaded> {
    let (file_config, file_delimiter) = match &input.config {
        Some(path) => {
            let (config, delimiter) = load_run_config(path)
                .with_context(|| format!("load configuration {}", path.display()))?;
            (config, delimiter)
        }
        None => (RunConfig::default(), None),
    };
    let delimiter = input
        .delimiter
        .map(delimiter_from_arg)
        .or(file_delimiter)
        .or_else(|| Delimiter::for_path(&input.input))
        .unwrap_or_default();
    let config = flags.apply(file_config);

    let span = info_span!("ingest", path = %input.input.display());
    let _guard = span.enter();
    let start = Instant::now();
    let table = read_table(&input.input, delimiter)
        .with_context(|| format!("read table {}", input.input.display()))?;
    info!(
        columns = table.column_count(),
        rows = table.row_count(),
        %delimiter,
        duration_ms = start.elapsed().as_millis(),
        "table loaded"
    );
    Ok(Loaded {
        table,
        config,
        delimiter,
    })
}

fn input_overrides(input: &InputArgs) -> FlagOverrides {
    FlagOverrides {
        sample_size: input.sample_size,
        min_success_ratio: input.min_success_ratio,
        kinds: input.kinds.clone(),
        ..FlagOverrides::default()
    }
}

fn clean_overrides(args: &CleanArgs) -> FlagOverrides {
    FlagOverrides {
        decimal_mark: args.decimal_mark,
        grouping_mark: args.grouping_mark,
        fraction_digits: args.fraction_digits,
        group_output: args.group_output.then_some(true),
        date_order: args.date_order.map(Into::into),
        calling_code: args.calling_code.clone(),
        table_version: args.table_version.clone(),
        sequential: args.sequential,
        ..input_overrides(&args.input)
    }
}

/// `<stem>.clean.<ext>` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "table".into(), |stem| stem.to_string_lossy());
    let ext = input
        .extension()
        .map_or_else(|| "csv".into(), |ext| ext.to_string_lossy());
    input.with_file_name(format!("{stem}.clean.{ext}"))
}

pub fn run_clean(args: &CleanArgs) -> Result<RunStatus> {
    let Loaded {
        table,
        config,
        delimiter,
    } = load(&args.input, &clean_overrides(args))?;

    let (cleaned, report) = normalize(&table, &config)
        .with_context(|| format!("normalize {}", args.input.input.display()))?;
    log_failures(&report);

    print_summary(&report);
    print_preview(&cleaned, args.preview);

    if args.dry_run {
        info!("dry run, output not written");
    } else {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&args.input.input));
        if output == args.input.input {
            return Err(anyhow!(
                "output {} would overwrite the input",
                output.display()
            ));
        }
        write_table(&output, &cleaned, delimiter)
            .with_context(|| format!("write {}", output.display()))?;
        println!("Output: {}", output.display());
    }

    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    Ok(report.status())
}

fn log_failures(report: &Report) {
    for failure in report.failures() {
        trace!(
            row = failure.row,
            column = failure.column,
            kind = %failure.kind,
            value = redact_value(failure.original),
            reason = failure.reason,
            "cell failed"
        );
    }
}

fn write_report(path: &Path, report: &Report) -> Result<()> {
    if path == Path::new("-") {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        serde_json::to_writer_pretty(&mut writer, report).context("write report")?;
        writeln!(writer).context("write report")?;
        return Ok(());
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("write report {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("write report {}", path.display()))?;
    debug!(path = %path.display(), "report written");
    Ok(())
}

pub fn run_detect(args: &DetectArgs) -> Result<()> {
    let Loaded { table, config, .. } = load(&args.input, &input_overrides(&args.input))?;
    let detected = detect_columns(&table, &config, registry())
        .with_context(|| format!("detect {}", args.input.input.display()))?;

    let mut output = Table::new();
    output.set_header(vec!["Column", "Kind", "Detection", "Note"]);
    apply_table_style(&mut output);
    for (column, outcome) in detected {
        let note = outcome
            .warning
            .map(|warning| warning.message)
            .unwrap_or_default();
        output.add_row(vec![
            column,
            outcome.kind.to_string(),
            detection_label(&outcome.detection),
            note,
        ]);
    }
    println!("{output}");
    Ok(())
}

pub fn run_regions(args: &RegionsArgs) -> Result<()> {
    let tables = registry();
    let mut output = Table::new();
    apply_table_style(&mut output);
    match &args.country {
        None => {
            output.set_header(vec!["Code", "Alpha-3", "Name", "Calling code", "Subdivisions"]);
            for country in tables.countries() {
                output.add_row(vec![
                    country.alpha2.clone(),
                    country.alpha3.clone(),
                    country.name.clone(),
                    country
                        .calling_code
                        .as_ref()
                        .map(|code| format!("+{code}"))
                        .unwrap_or_default(),
                    tables.subdivisions(&country.alpha2).len().to_string(),
                ]);
            }
        }
        Some(phrase) => {
            let country = tables
                .find_country(phrase)
                .ok_or_else(|| anyhow!("unknown country `{phrase}`"))?;
            output.set_header(vec!["Code", "Name", "Aliases"]);
            for subdivision in tables.subdivisions(&country.alpha2) {
                output.add_row(vec![
                    subdivision.iso_code(),
                    subdivision.name.clone(),
                    subdivision.aliases.join(", "),
                ]);
            }
            println!("{} ({})", country.name, country.alpha2);
        }
    }
    println!("{output}");
    println!(
        "Reference tables {} ({})",
        tables.version(),
        tables.fingerprint()
    );
    Ok(())
}
