//! Positional column layout for headerless price files.
//!
//! The feed has no header row; callers supply the column names in file order.
//! The schema resolves the key columns (ticker, date) and whichever numeric
//! columns are present up front, so a bad value-field request fails before a
//! single row is read.

use crate::domain::PriceField;
use std::collections::HashMap;
use thiserror::Error;

/// Canonical column order of the price feed.
pub const DEFAULT_FIELDS: [&str; 9] = [
    "ticker",
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "adj_close",
    "adj_volume",
];

/// Resolved positional layout of one file.
#[derive(Debug, Clone)]
pub struct CsvSchema {
    fields: Vec<String>,
    ticker_idx: usize,
    date_idx: usize,
    numeric_idx: HashMap<PriceField, usize>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("value field '{0}' is not among the supplied field names")]
    FieldNotFound(String),
}

impl CsvSchema {
    /// Build a schema from column names in file order.
    ///
    /// The key columns `ticker` and `date` must both be present. Numeric
    /// columns are optional at this stage; requesting one that is absent
    /// fails later in [`CsvSchema::require_field`].
    pub fn new<S: AsRef<str>>(field_names: &[S]) -> Result<Self, SchemaError> {
        let fields: Vec<String> = field_names.iter().map(|s| s.as_ref().to_string()).collect();

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (idx, name) in fields.iter().enumerate() {
            if seen.insert(name.as_str(), idx).is_some() {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }

        let ticker_idx = *seen
            .get("ticker")
            .ok_or_else(|| SchemaError::MissingColumn("ticker".into()))?;
        let date_idx = *seen
            .get("date")
            .ok_or_else(|| SchemaError::MissingColumn("date".into()))?;

        let mut numeric_idx = HashMap::new();
        for field in PriceField::ALL {
            if let Some(&idx) = seen.get(field.name()) {
                numeric_idx.insert(field, idx);
            }
        }

        Ok(Self {
            fields,
            ticker_idx,
            date_idx,
            numeric_idx,
        })
    }

    /// The canonical nine-column layout.
    pub fn default_layout() -> Self {
        let mut numeric_idx = HashMap::new();
        for (offset, field) in PriceField::ALL.into_iter().enumerate() {
            numeric_idx.insert(field, offset + 2);
        }
        Self {
            fields: DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
            ticker_idx: 0,
            date_idx: 1,
            numeric_idx,
        }
    }

    /// Number of columns a well-formed row must have.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// Column names in file order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn ticker_index(&self) -> usize {
        self.ticker_idx
    }

    pub fn date_index(&self) -> usize {
        self.date_idx
    }

    /// Position of a numeric column, if the layout includes it.
    pub fn field_index(&self, field: PriceField) -> Option<usize> {
        self.numeric_idx.get(&field).copied()
    }

    /// Position of a numeric column, erroring if the layout omits it.
    pub fn require_field(&self, field: PriceField) -> Result<usize, SchemaError> {
        self.field_index(field)
            .ok_or_else(|| SchemaError::MissingColumn(field.name().into()))
    }

    /// Resolve a requested value field by name.
    ///
    /// Fails with [`SchemaError::FieldNotFound`] if the name is not a numeric
    /// column of this layout — key columns can never be value fields.
    pub fn require_value_field(&self, name: &str) -> Result<PriceField, SchemaError> {
        let field =
            PriceField::from_name(name).ok_or_else(|| SchemaError::FieldNotFound(name.into()))?;
        if self.numeric_idx.contains_key(&field) {
            Ok(field)
        } else {
            Err(SchemaError::FieldNotFound(name.into()))
        }
    }
}
