//! PricePanel Core — flat OHLCV records reshaped into date-by-ticker matrices.
//!
//! This crate contains the whole pipeline:
//! - Domain types (bars, price field selectors)
//! - Headerless CSV ingestion with caller-supplied column names
//! - The pivot from a flat record list to per-field date × ticker matrices
//!
//! Everything is synchronous and in-memory: a record set is read once from a
//! delimited file, and field matrices are pure projections derived from it.

pub mod data;
pub mod domain;

pub use data::ingest::{load_field_matrix, CsvIngestor, DataError};
pub use data::pivot::{pivot, pivot_all, FieldMatrix, Panel};
pub use domain::{Bar, PriceField};
