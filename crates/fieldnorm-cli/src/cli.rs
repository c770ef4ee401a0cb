//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use fieldnorm_model::{DateOrder, FieldKind};

use fieldnorm_cli::overrides::{parse_decimal_mark, parse_kind_assignment, parse_mark};

#[derive(Parser)]
#[command(
    name = "fieldnorm",
    version,
    about = "Normalize numbers, dates, phone numbers and addresses in tabular files",
    long_about = "Rewrite free-form table values into one canonical form per field kind.\n\n\
                  Numbers become plain decimals, dates ISO 8601 (YYYY-MM-DD), phone numbers\n\
                  E.164 and addresses ISO 3166-2 region codes. Cells that cannot be\n\
                  normalized are kept unchanged and listed in the report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values in trace logs (they may contain personal data).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize a table and write the cleaned copy.
    Clean(CleanArgs),

    /// Show the kind each column would be bound to.
    Detect(DetectArgs),

    /// List countries, or the subdivisions of one country.
    Regions(RegionsArgs),
}

/// Input table and configuration shared by `clean` and `detect`.
#[derive(Args)]
pub struct InputArgs {
    /// Delimited text file with a header row.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// TOML run configuration.
    #[arg(long = "config", short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Field delimiter for input and output (default: from the config file or
    /// the file extension, else comma).
    #[arg(long = "delimiter", short = 'd', value_enum)]
    pub delimiter: Option<DelimiterArg>,

    /// Bind a column to a kind, skipping detection (repeatable).
    #[arg(long = "kind", value_name = "COLUMN=KIND", value_parser = parse_kind_assignment)]
    pub kinds: Vec<(String, FieldKind)>,

    /// Non-empty cells sampled per column for detection.
    #[arg(long = "sample-size", value_name = "N")]
    pub sample_size: Option<usize>,

    /// Minimum share of sampled cells a kind must match (0.0-1.0).
    #[arg(long = "min-success-ratio", value_name = "RATIO")]
    pub min_success_ratio: Option<f64>,
}

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file (default: <INPUT stem>.clean.<ext> next to the input).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the JSON report to this file (`-` for stdout).
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Decimal mark in input and output numbers.
    #[arg(long = "decimal-mark", value_name = "CHAR", value_parser = parse_decimal_mark)]
    pub decimal_mark: Option<char>,

    /// Grouping mark in input numbers (`space`/`apostrophe` by name).
    #[arg(long = "grouping-mark", value_name = "CHAR", value_parser = parse_mark)]
    pub grouping_mark: Option<char>,

    /// Digits after the decimal mark in output numbers.
    #[arg(long = "fraction-digits", value_name = "N")]
    pub fraction_digits: Option<u32>,

    /// Group thousands in output numbers with the grouping mark.
    #[arg(long = "group-output")]
    pub group_output: bool,

    /// Reading of dates like 03/05/2023.
    #[arg(long = "date-order", value_enum)]
    pub date_order: Option<DateOrderArg>,

    /// Calling code for phone numbers without one (e.g. 49 or +49).
    #[arg(long = "calling-code", value_name = "CODE")]
    pub calling_code: Option<String>,

    /// Fail unless the embedded reference tables carry this version.
    #[arg(long = "table-version", value_name = "VERSION")]
    pub table_version: Option<String>,

    /// Process columns one after another on the current thread.
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Normalize and report without writing the output table.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the first N cleaned rows.
    #[arg(long = "preview", value_name = "N", default_value_t = 0)]
    pub preview: usize,
}

#[derive(Args)]
pub struct DetectArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args)]
pub struct RegionsArgs {
    /// Country name or ISO code; omit to list countries.
    #[arg(value_name = "COUNTRY")]
    pub country: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DelimiterArg {
    Comma,
    Semicolon,
    Tab,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DateOrderArg {
    DayFirst,
    MonthFirst,
}

impl From<DateOrderArg> for DateOrder {
    fn from(arg: DateOrderArg) -> Self {
        match arg {
            DateOrderArg::DayFirst => DateOrder::DayFirst,
            DateOrderArg::MonthFirst => DateOrder::MonthFirst,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
