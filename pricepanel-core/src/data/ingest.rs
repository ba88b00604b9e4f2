//! Headerless CSV ingestion for price records.
//!
//! The reader is strict: any I/O failure, malformed row, unparsable value,
//! or duplicate (ticker, date) pair aborts the whole load with an error
//! naming the offending record. There is no retry and no partial result.

use crate::data::pivot::{FieldMatrix, PivotError};
use crate::data::schema::{CsvSchema, SchemaError};
use crate::domain::{Bar, PriceField};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed record at line {line}: expected {expected} columns, got {got}")]
    MalformedRecord {
        line: u64,
        expected: usize,
        got: usize,
    },

    #[error("bad number in column '{field}' at line {line}: '{value}'")]
    BadNumber {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("bad date at line {line}: '{value}' (expected YYYY-MM-DD)")]
    BadDate { line: u64, value: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Pivot(#[from] PivotError),
}

/// CSV reader for headerless price files with a caller-supplied column layout.
pub struct CsvIngestor {
    schema: CsvSchema,
}

impl CsvIngestor {
    /// Build an ingestor from column names in file order.
    pub fn new<S: AsRef<str>>(field_names: &[S]) -> Result<Self, SchemaError> {
        Ok(Self {
            schema: CsvSchema::new(field_names)?,
        })
    }

    /// Ingestor for the canonical nine-column feed.
    pub fn default_layout() -> Self {
        Self {
            schema: CsvSchema::default_layout(),
        }
    }

    pub fn schema(&self) -> &CsvSchema {
        &self.schema
    }

    /// Read the whole file into a record set, in file order.
    ///
    /// Requires every numeric column in the layout; a layout that carries
    /// only a subset can still serve [`load_field_matrix`].
    pub fn read_bars(&self, path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut columns = [0usize; 7];
        for (slot, field) in PriceField::ALL.into_iter().enumerate() {
            columns[slot] = self.schema.require_field(field)?;
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut bars = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record_line(&record);
            self.check_width(&record, line)?;

            let ticker = record[self.schema.ticker_index()].to_string();
            let date = parse_date(&record[self.schema.date_index()], line)?;
            let mut values = [0.0f64; 7];
            for (slot, field) in PriceField::ALL.into_iter().enumerate() {
                values[slot] = parse_number(&record[columns[slot]], field.name(), line)?;
            }

            bars.push(Bar {
                ticker,
                date,
                open: values[0],
                high: values[1],
                low: values[2],
                close: values[3],
                volume: values[4],
                adj_close: values[5],
                adj_volume: values[6],
            });
        }
        Ok(bars)
    }

    /// Read only (date, ticker, value) cells for one numeric field.
    fn read_cells(
        &self,
        path: &Path,
        field: PriceField,
    ) -> Result<Vec<(NaiveDate, String, f64)>, DataError> {
        let value_idx = self.schema.require_field(field)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut cells = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record_line(&record);
            self.check_width(&record, line)?;

            let ticker = record[self.schema.ticker_index()].to_string();
            let date = parse_date(&record[self.schema.date_index()], line)?;
            let value = parse_number(&record[value_idx], field.name(), line)?;
            cells.push((date, ticker, value));
        }
        Ok(cells)
    }

    fn check_width(&self, record: &StringRecord, line: u64) -> Result<(), DataError> {
        if record.len() != self.schema.width() {
            return Err(DataError::MalformedRecord {
                line,
                expected: self.schema.width(),
                got: record.len(),
            });
        }
        Ok(())
    }
}

/// Load one field's date-by-ticker matrix from a headerless CSV file.
///
/// `field_names` assigns column names positionally (no header row is
/// assumed). The requested `value_field` is validated against the names
/// before the file is opened, so a bad request never touches the file.
pub fn load_field_matrix<S: AsRef<str>>(
    path: &Path,
    field_names: &[S],
    value_field: &str,
) -> Result<FieldMatrix, DataError> {
    let ingestor = CsvIngestor::new(field_names)?;
    let field = ingestor.schema.require_value_field(value_field)?;
    let cells = ingestor.read_cells(path, field)?;
    Ok(FieldMatrix::from_cells(field, cells)?)
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_number(raw: &str, field: &'static str, line: u64) -> Result<f64, DataError> {
    raw.trim().parse::<f64>().map_err(|_| DataError::BadNumber {
        line,
        field,
        value: raw.to_string(),
    })
}

fn parse_date(raw: &str, line: u64) -> Result<NaiveDate, DataError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| DataError::BadDate {
        line,
        value: raw.to_string(),
    })
}
