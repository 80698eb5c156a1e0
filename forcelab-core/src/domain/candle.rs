//! Candle: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV candle for a single pair over one fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any price field is NaN (void candle).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() || !self.has_finite_prices() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    fn has_finite_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite())
    }

    fn has_infinite_price(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .any(|p| p.is_infinite())
    }
}

/// Malformed candle input. Raised once, for the first offending candle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("candle {index} at {timestamp} is not strictly after the previous candle ({previous})")]
    NonIncreasingTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error("candle {index} has an infinite price")]
    InfinitePrice { index: usize },
}

/// Ordered candles for one pair.
///
/// Timestamps are strictly increasing. NaN prices are accepted and mark a
/// void candle; every indicator value whose window covers it is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSeries {
    pair: String,
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(pair: impl Into<String>, candles: Vec<Candle>) -> Result<Self, CandleError> {
        for (index, candle) in candles.iter().enumerate() {
            if candle.has_infinite_price() {
                return Err(CandleError::InfinitePrice { index });
            }
            if index > 0 {
                let previous = candles[index - 1].timestamp;
                if candle.timestamp <= previous {
                    return Err(CandleError::NonIncreasingTimestamp {
                        index,
                        timestamp: candle.timestamp,
                        previous,
                    });
                }
            }
        }

        Ok(Self {
            pair: pair.into(),
            candles,
        })
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn timestamp(&self, index: usize) -> Option<DateTime<Utc>> {
        self.candles.get(index).map(|c| c.timestamp)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.open).collect()
    }

    /// Copy of the first `len` candles (clamped to the series length).
    pub fn truncated(&self, len: usize) -> Self {
        Self {
            pair: self.pair.clone(),
            candles: self.candles[..len.min(self.candles.len())].to_vec(),
        }
    }
}
