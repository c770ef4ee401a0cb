#![deny(unsafe_code)]

//! Read-only reference tables used by the normalizers.
//!
//! The tables ship as CSV files next to a `manifest.toml` that pins their
//! SHA-256 digests. [`registry`] loads the embedded copy once per process.

pub mod csv;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod names;
pub mod registry;

pub use crate::csv::calling_codes::CallingCode;
pub use crate::csv::countries::Country;
pub use crate::csv::subdivisions::Subdivision;
pub use crate::error::StandardsError;
pub use crate::names::match_key;
pub use crate::registry::{ReferenceTables, RegionPass, registry};
