//! Data ingestion and reshaping

pub mod ingest;
pub mod pivot;
pub mod schema;

pub use ingest::{load_field_matrix, CsvIngestor, DataError};
pub use pivot::{pivot, pivot_all, FieldMatrix, Panel, PivotError};
pub use schema::{CsvSchema, SchemaError, DEFAULT_FIELDS};
