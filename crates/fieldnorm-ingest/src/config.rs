//! TOML run configuration.
//!
//! ```toml
//! [defaults]
//! decimal_mark = ","
//! grouping_mark = "."
//! fraction_digits = 2
//! date_order = "day-first"
//! default_calling_code = "+49"
//!
//! [detector]
//! sample_size = 25
//! min_success_ratio = 0.6
//!
//! [engine]
//! parallel = true
//!
//! [columns.amount]
//! kind = "number"
//! ```
//!
//! `[defaults]` takes the same knobs as a column table except `kind`.

use std::collections::BTreeMap;
use std::path::Path;

use fieldnorm_model::{
    ColumnConfig, DetectorOptions, EngineOptions, FieldOptions, RunConfig,
};
use serde::{Deserialize, Serialize};

use crate::csv_table::Delimiter;
use crate::error::{IngestError, Result};

/// On-disk shape of a run configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Delimiter for input and output, unless given on the command line.
    pub delimiter: Option<Delimiter>,
    pub defaults: ColumnConfig,
    pub detector: DetectorOptions,
    pub engine: EngineOptions,
    pub columns: BTreeMap<String, ColumnConfig>,
}

impl ConfigFile {
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|err| IngestError::ConfigParse {
            path: origin.to_path_buf(),
            message: err.message().to_string(),
        })
    }

    /// Builds the engine configuration. Options are validated per column by
    /// the engine; only file-level mistakes are rejected here.
    pub fn into_run_config(self, origin: &Path) -> Result<RunConfig> {
        if self.defaults.kind.is_some() {
            return Err(IngestError::ConfigParse {
                path: origin.to_path_buf(),
                message: "`kind` is only allowed in [columns.<name>] tables".to_string(),
            });
        }
        let mut defaults = self.defaults.resolve(&FieldOptions::default());
        defaults
            .validate("defaults")
            .map_err(|source| IngestError::Config {
                path: origin.to_path_buf(),
                source,
            })?;
        Ok(RunConfig {
            defaults,
            columns: self.columns,
            detector: self.detector,
            engine: self.engine,
        })
    }
}

/// Reads a configuration file, returning the run config and the delimiter
/// it names, if any.
pub fn load_run_config(path: &Path) -> Result<(RunConfig, Option<Delimiter>)> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::read(path, source))?;
    let file = ConfigFile::parse(&text, path)?;
    let delimiter = file.delimiter;
    let config = file.into_run_config(path)?;
    tracing::debug!(
        path = %path.display(),
        columns = config.columns.len(),
        "run configuration loaded"
    );
    Ok((config, delimiter))
}

#[cfg(test)]
mod tests {
    use fieldnorm_model::{DateOrder, FieldKind};

    use super::*;

    fn parse(text: &str) -> Result<RunConfig> {
        ConfigFile::parse(text, Path::new("run.toml"))?.into_run_config(Path::new("run.toml"))
    }

    #[test]
    fn reads_defaults_and_columns() {
        let config = parse(
            r#"
            [defaults]
            decimal_mark = ","
            grouping_mark = "."
            date_order = "month-first"
            default_calling_code = "+49"

            [detector]
            sample_size = 10

            [columns.amount]
            kind = "number"
            fraction_digits = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.defaults.number.decimal_mark, ',');
        assert_eq!(config.defaults.date.ambiguity, DateOrder::MonthFirst);
        assert_eq!(config.defaults.phone.default_calling_code.as_deref(), Some("49"));
        assert_eq!(config.detector.sample_size, 10);
        assert!(config.engine.parallel);
        let amount = config.column_config("amount").unwrap();
        assert_eq!(amount.kind, Some(FieldKind::Number));
        assert_eq!(config.options_for("amount").unwrap().number.fraction_digits, 0);
    }

    #[test]
    fn rejects_kind_in_defaults_and_unknown_keys() {
        assert!(matches!(
            parse("[defaults]\nkind = \"date\"\n"),
            Err(IngestError::ConfigParse { .. })
        ));
        assert!(matches!(
            parse("[columns.x]\nfraction = 2\n"),
            Err(IngestError::ConfigParse { .. })
        ));
        assert!(matches!(
            parse("[columns.x]\nkind = \"colour\"\n"),
            Err(IngestError::ConfigParse { .. })
        ));
    }

    #[test]
    fn invalid_defaults_are_config_errors() {
        assert!(matches!(
            parse("[defaults]\ndecimal_mark = \".\"\ngrouping_mark = \".\"\n"),
            Err(IngestError::Config { .. })
        ));
    }

    #[test]
    fn empty_file_is_the_default_config() {
        let config = parse("").unwrap();
        assert_eq!(config.defaults, FieldOptions::default());
        assert!(config.columns.is_empty());
    }
}
