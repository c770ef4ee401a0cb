//! Field normalizers and column type detection.
//!
//! - **canonical**: exact decimals and the canonical-form validators
//! - **number**, **date**, **phone**, **address**: one normalizer per kind,
//!   each a pure function from raw text to a canonical string or a
//!   [`CellFailure`](fieldnorm_model::CellFailure)
//! - **normalizer**: dispatch over a column's bound kind
//! - **detect**: sample-based kind detection
//!
//! # Design Principles
//!
//! - **Pure functions**: no I/O, no shared mutable state; reference tables
//!   are borrowed read-only
//! - **Error preservation**: a failure carries the original text unchanged

pub mod address;
pub mod canonical;
pub mod date;
pub mod detect;
pub mod normalizer;
pub mod number;
pub mod phone;

pub use address::normalize_address;
pub use canonical::{
    Decimal, is_canonical_date, is_canonical_number, is_canonical_phone, is_canonical_region,
};
pub use date::{DatePattern, normalize_date, parse_date};
pub use detect::{DetectionOutcome, detect_kind};
pub use normalizer::FieldNormalizer;
pub use number::{ParsedNumber, normalize_number, parse_number};
pub use phone::normalize_phone;
