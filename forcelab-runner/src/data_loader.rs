//! Candle loading from CSV files.
//!
//! Expected header: `timestamp,open,high,low,close,volume` (`date` is accepted
//! as an alias for `timestamp`). Timestamps are RFC 3339, `YYYY-MM-DD HH:MM:SS`
//! (read as UTC), or integer Unix milliseconds. An empty price cell loads as
//! NaN and marks a void candle.
//!
//! Rows must already be in strictly increasing timestamp order; the loader
//! never sorts or deduplicates.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use forcelab_core::{Candle, CandleError, CandleSeries};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unrecognised timestamp '{value}'")]
    Timestamp { row: usize, value: String },

    #[error("invalid candle series for '{pair}': {source}")]
    Candle {
        pair: String,
        #[source]
        source: CandleError,
    },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "date")]
    timestamp: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

/// Load one pair's candles from a CSV file.
pub fn load_candles_csv(path: &Path, pair: &str) -> Result<CandleSeries, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_candles_csv(file, pair)
}

/// Read one pair's candles from any CSV source.
pub fn read_candles_csv<R: Read>(reader: R, pair: &str) -> Result<CandleSeries, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candles = Vec::new();
    for (row, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        candles.push(Candle {
            timestamp,
            open: record.open.unwrap_or(f64::NAN),
            high: record.high.unwrap_or(f64::NAN),
            low: record.low.unwrap_or(f64::NAN),
            close: record.close.unwrap_or(f64::NAN),
            volume: record.volume.unwrap_or(0.0),
        });
    }

    let void = candles.iter().filter(|c| c.is_void()).count();
    if void > 0 {
        tracing::warn!(pair, void, "input contains void candles");
    }
    let insane = candles.iter().filter(|c| !c.is_void() && !c.is_sane()).count();
    if insane > 0 {
        tracing::warn!(pair, insane, "input contains candles with inconsistent OHLC");
    }

    CandleSeries::new(pair, candles).map_err(|source| LoadError::Candle {
        pair: pair.to_string(),
        source,
    })
}

/// Parse a timestamp cell: Unix milliseconds, RFC 3339, or naive UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(millis) = value.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Pair name for a candle file: its file stem (`data/BTC_USDT.csv` → `BTC_USDT`).
pub fn pair_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Deterministic BLAKE3 hash over every candle of a series.
///
/// Covers the pair name, timestamps and all OHLCV values, so two loads of
/// the same file hash identically.
pub fn dataset_hash(series: &CandleSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.pair().as_bytes());
    for candle in series.candles() {
        hasher.update(&candle.timestamp.timestamp_millis().to_le_bytes());
        hasher.update(&candle.open.to_le_bytes());
        hasher.update(&candle.high.to_le_bytes());
        hasher.update(&candle.low.to_le_bytes());
        hasher.update(&candle.close.to_le_bytes());
        hasher.update(&candle.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
