//! Table and configuration ingestion for fieldnorm.
//!
//! Reads delimited text into a [`RawTable`](fieldnorm_model::RawTable),
//! writes a [`CleanedTable`](fieldnorm_model::CleanedTable) back with the
//! same delimiter, and loads TOML run configuration.

pub mod config;
pub mod csv_table;
pub mod error;

pub use config::{ConfigFile, load_run_config};
pub use csv_table::{Delimiter, read_table, read_table_from, write_table, write_table_to};
pub use error::{IngestError, Result};
