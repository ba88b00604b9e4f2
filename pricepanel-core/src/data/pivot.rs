//! Pivot — reshape a flat record list into date-by-ticker matrices.
//!
//! Tickers are stacked in the flat file: three-dimensional data (date ×
//! ticker × field) stored in two dimensions. The pivot splits each numeric
//! field into its own two-dimensional matrix on a shared date/ticker axis
//! pair. Missing (date, ticker) pairs get an explicit `None` cell, never a
//! sentinel value that could be mistaken for a real price.

use crate::domain::{Bar, PriceField};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PivotError {
    #[error("duplicate record for ticker '{ticker}' on {date}: cell value is ambiguous")]
    DuplicateKey { ticker: String, date: NaiveDate },
}

/// A date-by-ticker matrix of one numeric field.
///
/// Rows are dates (sorted ascending, unique), columns are tickers (sorted
/// ascending, unique). A cell is `None` when no record supplied a value for
/// that (date, ticker) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatrix {
    field: PriceField,
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    /// Row-major: `cells[row * tickers.len() + col]`.
    cells: Vec<Option<f64>>,
}

impl FieldMatrix {
    /// Build a matrix from (date, ticker, value) cells.
    ///
    /// The axes are the union of all dates and all tickers seen. Two cells
    /// for the same (date, ticker) pair are a data-quality error.
    pub fn from_cells(
        field: PriceField,
        rows: Vec<(NaiveDate, String, f64)>,
    ) -> Result<Self, PivotError> {
        let mut date_set = BTreeSet::new();
        let mut ticker_set = BTreeSet::new();
        for (date, ticker, _) in &rows {
            date_set.insert(*date);
            ticker_set.insert(ticker.clone());
        }
        let dates: Vec<NaiveDate> = date_set.into_iter().collect();
        let tickers: Vec<String> = ticker_set.into_iter().collect();

        let date_pos: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        let ticker_pos: HashMap<&str, usize> = tickers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let width = tickers.len();
        let mut cells = vec![None; dates.len() * width];
        for (date, ticker, value) in rows {
            let idx = date_pos[&date] * width + ticker_pos[ticker.as_str()];
            if cells[idx].is_some() {
                return Err(PivotError::DuplicateKey { ticker, date });
            }
            cells[idx] = Some(value);
        }

        Ok(Self {
            field,
            dates,
            tickers,
            cells,
        })
    }

    /// Which numeric field this matrix holds.
    pub fn field(&self) -> PriceField {
        self.field
    }

    /// The date axis (sorted ascending).
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// The ticker axis (sorted ascending).
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.dates.len(), self.tickers.len())
    }

    /// Cell value for a (date, ticker) pair; `None` if the pair is off-axis
    /// or the cell is missing.
    pub fn get(&self, date: NaiveDate, ticker: &str) -> Option<f64> {
        let row = self.date_index(date)?;
        let col = self.ticker_index(ticker)?;
        self.cells[row * self.tickers.len() + col]
    }

    /// One row of the matrix, in ticker-axis order.
    pub fn row(&self, date: NaiveDate) -> Option<&[Option<f64>]> {
        let row = self.date_index(date)?;
        let width = self.tickers.len();
        Some(&self.cells[row * width..(row + 1) * width])
    }

    fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    fn ticker_index(&self, ticker: &str) -> Option<usize> {
        self.tickers
            .binary_search_by(|t| t.as_str().cmp(ticker))
            .ok()
    }

    /// Mean of one ticker's column across all dates, skipping missing cells.
    ///
    /// `None` for unknown tickers and for columns with no present cells.
    pub fn column_mean(&self, ticker: &str) -> Option<f64> {
        let col = self.ticker_index(ticker)?;
        let width = self.tickers.len();
        mean(self.cells.iter().skip(col).step_by(width).copied())
    }

    /// Mean of one date's row across all tickers, skipping missing cells.
    pub fn row_mean(&self, date: NaiveDate) -> Option<f64> {
        mean(self.row(date)?.iter().copied())
    }

    /// Median of one ticker's column across all dates, skipping missing cells.
    ///
    /// `None` for unknown tickers and for columns with no present cells.
    pub fn column_median(&self, ticker: &str) -> Option<f64> {
        let col = self.ticker_index(ticker)?;
        let width = self.tickers.len();
        median(self.cells.iter().skip(col).step_by(width).copied())
    }

    /// Median of one date's row across all tickers, skipping missing cells.
    pub fn row_median(&self, date: NaiveDate) -> Option<f64> {
        median(self.row(date)?.iter().copied())
    }

    /// Flatten back to (date, ticker, value) cells, present cells only, in
    /// row-major (date, then ticker) order.
    pub fn unpivot(&self) -> Vec<(NaiveDate, String, f64)> {
        let width = self.tickers.len();
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| {
                cell.map(|value| (self.dates[idx / width], self.tickers[idx % width].clone(), value))
            })
            .collect()
    }
}

fn mean(cells: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = cells
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn median(cells: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let mut present: Vec<f64> = cells.flatten().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    if present.len() % 2 == 1 {
        Some(present[mid])
    } else {
        Some((present[mid - 1] + present[mid]) / 2.0)
    }
}

/// Pivot a record set into one field's date-by-ticker matrix.
pub fn pivot(bars: &[Bar], field: PriceField) -> Result<FieldMatrix, PivotError> {
    let cells = bars
        .iter()
        .map(|bar| (bar.date, bar.ticker.clone(), field.extract(bar)))
        .collect();
    FieldMatrix::from_cells(field, cells)
}

/// All seven field matrices of a record set, sharing one axis pair.
///
/// The per-field names mirror how the matrices are used downstream
/// (open prices, close prices, volume, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub open: FieldMatrix,
    pub high: FieldMatrix,
    pub low: FieldMatrix,
    pub close: FieldMatrix,
    pub volume: FieldMatrix,
    pub adj_close: FieldMatrix,
    pub adj_volume: FieldMatrix,
}

impl Panel {
    pub fn matrix(&self, field: PriceField) -> &FieldMatrix {
        match field {
            PriceField::Open => &self.open,
            PriceField::High => &self.high,
            PriceField::Low => &self.low,
            PriceField::Close => &self.close,
            PriceField::Volume => &self.volume,
            PriceField::AdjClose => &self.adj_close,
            PriceField::AdjVolume => &self.adj_volume,
        }
    }

    /// Reconstruct the record set, sorted by date then ticker.
    ///
    /// Every matrix comes from the same records, so a cell present in one
    /// field is present in all of them.
    pub fn unpivot(&self) -> Vec<Bar> {
        let width = self.close.tickers.len();
        let mut bars = Vec::new();
        for (idx, close) in self.close.cells.iter().enumerate() {
            let Some(close) = close else { continue };
            let (row, col) = (idx / width, idx % width);
            bars.push(Bar {
                ticker: self.close.tickers[col].clone(),
                date: self.close.dates[row],
                open: self.open.cells[idx].unwrap_or(f64::NAN),
                high: self.high.cells[idx].unwrap_or(f64::NAN),
                low: self.low.cells[idx].unwrap_or(f64::NAN),
                close: *close,
                volume: self.volume.cells[idx].unwrap_or(f64::NAN),
                adj_close: self.adj_close.cells[idx].unwrap_or(f64::NAN),
                adj_volume: self.adj_volume.cells[idx].unwrap_or(f64::NAN),
            });
        }
        bars
    }
}

/// Pivot a record set into all seven field matrices.
pub fn pivot_all(bars: &[Bar]) -> Result<Panel, PivotError> {
    Ok(Panel {
        open: pivot(bars, PriceField::Open)?,
        high: pivot(bars, PriceField::High)?,
        low: pivot(bars, PriceField::Low)?,
        close: pivot(bars, PriceField::Close)?,
        volume: pivot(bars, PriceField::Volume)?,
        adj_close: pivot(bars, PriceField::AdjClose)?,
        adj_volume: pivot(bars, PriceField::AdjVolume)?,
    })
}
