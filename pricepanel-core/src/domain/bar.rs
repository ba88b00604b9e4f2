//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single ticker on a single day.
///
/// Volumes are `f64` because the upstream feed carries them with decimal
/// points, the same as every other non-key column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub adj_close: f64,
    pub adj_volume: f64,
}

/// Selector for one of the numeric columns of a [`Bar`].
///
/// The key columns (ticker, date) are deliberately not representable here:
/// they index matrices, they never populate cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
    AdjClose,
    AdjVolume,
}

impl PriceField {
    /// All numeric fields, in canonical column order.
    pub const ALL: [PriceField; 7] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::Volume,
        PriceField::AdjClose,
        PriceField::AdjVolume,
    ];

    /// Canonical column name as it appears in the data feed.
    pub fn name(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
            PriceField::AdjClose => "adj_close",
            PriceField::AdjVolume => "adj_volume",
        }
    }

    /// Look up a field by its canonical column name.
    pub fn from_name(name: &str) -> Option<PriceField> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Read this field's value from a bar.
    pub fn extract(&self, bar: &Bar) -> f64 {
        match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
            PriceField::Volume => bar.volume,
            PriceField::AdjClose => bar.adj_close,
            PriceField::AdjVolume => bar.adj_volume,
        }
    }
}
