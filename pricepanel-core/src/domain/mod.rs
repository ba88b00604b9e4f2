//! Domain types for PricePanel

pub mod bar;

pub use bar::{Bar, PriceField};
