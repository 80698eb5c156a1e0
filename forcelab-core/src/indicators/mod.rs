//! Concrete indicator implementations.
//!
//! All indicators implement the `Indicator` trait from `components::indicator`.
//! Moving averages take a `PriceSource` so the same period can be applied to
//! close and open separately. Multi-series indicators (stochastic, MACD) are
//! exposed as separate named instances per line, keeping the single-series
//! `Indicator` trait unchanged.

pub mod ema;
pub mod macd;
pub mod sma;
pub mod stochastic;

pub use ema::{ema_of_series, Ema};
pub use macd::{Macd, MacdLine};
pub use sma::{sma_of_series, Sma};
pub use stochastic::{FastStochastic, StochasticLine};

use crate::domain::Candle;
use serde::{Deserialize, Serialize};

/// Candle field an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Open,
    High,
    Low,
    Close,
}

impl PriceSource {
    pub fn extract(&self, candle: &Candle) -> f64 {
        match self {
            PriceSource::Open => candle.open,
            PriceSource::High => candle.high,
            PriceSource::Low => candle.low,
            PriceSource::Close => candle.close,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Open => "open",
            PriceSource::High => "high",
            PriceSource::Low => "low",
            PriceSource::Close => "close",
        }
    }
}

/// Create a candle series from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for the first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000,
/// one candle every 15 minutes.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::CandleSeries {
    use crate::domain::CandleSeries;
    use chrono::TimeZone;

    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let candles = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Candle {
                timestamp: base + chrono::Duration::minutes(15 * i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            }
        })
        .collect();
    CandleSeries::new("TEST/USDT", candles).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
