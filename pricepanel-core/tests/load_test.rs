//! Integration tests for the load pipeline using the committed price fixture.

use chrono::NaiveDate;
use pricepanel_core::data::schema::{SchemaError, DEFAULT_FIELDS};
use pricepanel_core::data::{pivot_all, CsvIngestor, DataError, PivotError};
use pricepanel_core::load_field_matrix;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/prices.csv")
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn write_temp_csv(contents: &str) -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "pricepanel_load_test_{}_{id}.csv",
        std::process::id()
    ));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn fixture_close_matrix_has_expected_axes_and_values() {
    let matrix = load_field_matrix(&fixture_path(), &DEFAULT_FIELDS, "close").unwrap();

    assert_eq!(
        matrix.dates(),
        &[date("2017-09-05"), date("2017-09-06"), date("2017-09-07")]
    );
    assert_eq!(matrix.tickers(), &["ABC".to_string(), "XYZ".to_string()]);

    // The worked example: close of ABC on 2017-09-05
    assert_eq!(matrix.get(date("2017-09-05"), "ABC"), Some(162.63));
    assert_eq!(matrix.get(date("2017-09-06"), "XYZ"), Some(64.00));

    // XYZ has no bar on 2017-09-07
    assert_eq!(matrix.get(date("2017-09-07"), "XYZ"), None);
}

#[test]
fn every_numeric_field_is_loadable() {
    for field in ["open", "high", "low", "close", "volume", "adj_close", "adj_volume"] {
        let matrix = load_field_matrix(&fixture_path(), &DEFAULT_FIELDS, field).unwrap();
        assert_eq!(matrix.shape(), (3, 2), "field {field}");
    }
    assert_eq!(
        load_field_matrix(&fixture_path(), &DEFAULT_FIELDS, "volume")
            .unwrap()
            .get(date("2017-09-05"), "ABC"),
        Some(29_417_590.0)
    );
}

#[test]
fn fixture_roundtrips_through_a_panel() {
    let ingestor = CsvIngestor::default_layout();
    let mut bars = ingestor.read_bars(&fixture_path()).unwrap();
    assert_eq!(bars.len(), 5);

    let panel = pivot_all(&bars).unwrap();
    let roundtripped = panel.unpivot();

    bars.sort_by(|a, b| (a.date, &a.ticker).cmp(&(b.date, &b.ticker)));
    assert_eq!(roundtripped, bars);
}

#[test]
fn duplicate_ticker_date_pair_fails_the_whole_load() {
    let path = write_temp_csv(
        "ABC,2017-09-05,163.09,164.24,160.21,162.63,29417590.0,162.49,29414672.0\n\
         ABC,2017-09-05,163.09,164.24,160.21,999.99,29417590.0,162.49,29414672.0\n",
    );

    let err = load_field_matrix(&path, &DEFAULT_FIELDS, "close").unwrap_err();
    let _ = std::fs::remove_file(&path);

    match err {
        DataError::Pivot(PivotError::DuplicateKey { ticker, date: d }) => {
            assert_eq!(ticker, "ABC");
            assert_eq!(d, date("2017-09-05"));
        }
        other => panic!("expected DuplicateKey, got: {other:?}"),
    }
}

#[test]
fn unknown_value_field_fails_before_the_file_is_touched() {
    // The path does not exist: if the value-field check ran after opening
    // the file, this would surface as an I/O error instead.
    let path = std::env::temp_dir().join("pricepanel_never_written.csv");
    let _ = std::fs::remove_file(&path);

    let field_names = ["ticker", "date", "open", "high", "low", "volume"];
    let err = load_field_matrix(&path, &field_names, "close").unwrap_err();

    match err {
        DataError::Schema(SchemaError::FieldNotFound(name)) => assert_eq!(name, "close"),
        other => panic!("expected FieldNotFound, got: {other:?}"),
    }
}

#[test]
fn missing_source_file_surfaces_an_io_error() {
    let path = std::env::temp_dir().join("pricepanel_missing_source.csv");
    let _ = std::fs::remove_file(&path);

    let err = load_field_matrix(&path, &DEFAULT_FIELDS, "close").unwrap_err();
    assert!(matches!(err, DataError::Csv(_) | DataError::Io(_)));
}

#[test]
fn shuffled_column_layout_is_honored() {
    // Same data, date first and ticker last.
    let path = write_temp_csv(
        "2017-09-05,162.63,ABC\n\
         2017-09-06,164.00,ABC\n",
    );

    let matrix = load_field_matrix(&path, &["date", "close", "ticker"], "close").unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(matrix.get(date("2017-09-06"), "ABC"), Some(164.00));
}

#[test]
fn empty_file_loads_an_empty_matrix() {
    let path = write_temp_csv("");

    let matrix = load_field_matrix(&path, &DEFAULT_FIELDS, "close").unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(matrix.shape(), (0, 0));
}
