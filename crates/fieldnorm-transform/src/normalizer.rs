use fieldnorm_model::{CellFailure, CellResult, FieldKind, FieldOptions};
use fieldnorm_standards::ReferenceTables;

use crate::address::{looks_like_address, normalize_address};
use crate::date::{looks_like_date, normalize_date};
use crate::number::{looks_like_number, normalize_number};
use crate::phone::{looks_like_phone, normalize_phone};

/// A normalizer bound to one kind and one column's resolved options.
#[derive(Debug, Clone)]
pub struct FieldNormalizer<'t> {
    kind: FieldKind,
    options: FieldOptions,
    tables: &'t ReferenceTables,
}

impl<'t> FieldNormalizer<'t> {
    pub fn new(kind: FieldKind, options: FieldOptions, tables: &'t ReferenceTables) -> Self {
        Self {
            kind,
            options,
            tables,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Normalizes one non-empty cell. Unrecognized columns echo the input.
    pub fn normalize(&self, raw: &str) -> CellResult {
        self.try_normalize(raw).into()
    }

    pub fn try_normalize(&self, raw: &str) -> Result<String, CellFailure> {
        match self.kind {
            FieldKind::Number => normalize_number(raw, &self.options.number),
            FieldKind::Date => normalize_date(raw, &self.options.date),
            FieldKind::Phone => normalize_phone(raw, &self.options.phone, self.tables),
            FieldKind::Address => normalize_address(raw, self.tables),
            FieldKind::Unrecognized => Ok(raw.to_string()),
        }
    }

    /// Cheap detection probe for this normalizer's kind.
    pub fn looks_like(&self, raw: &str) -> bool {
        match self.kind {
            FieldKind::Number => looks_like_number(raw, &self.options.number),
            FieldKind::Date => looks_like_date(raw, &self.options.date),
            FieldKind::Phone => looks_like_phone(raw),
            FieldKind::Address => looks_like_address(raw, self.tables),
            FieldKind::Unrecognized => false,
        }
    }
}
