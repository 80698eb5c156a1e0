//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1)
//! Seed: EMA[period-1] = SMA of the first `period` values.
//! Lookback: period - 1.

use super::PriceSource;
use crate::components::indicator::Indicator;
use crate::domain::CandleSeries;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    source: PriceSource,
    name: String,
}

impl Ema {
    pub fn new(period: usize, source: PriceSource) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            source,
            name: format!("ema_{period}_{}", source.as_str()),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, series: &CandleSeries) -> Vec<f64> {
        let values: Vec<f64> = series
            .candles()
            .iter()
            .map(|c| self.source.extract(c))
            .collect();
        ema_of_series(&values, self.period)
    }
}

/// Compute raw EMA values from a pre-extracted f64 slice.
///
/// A leading run of NaN is treated as "not yet defined": the seed window
/// starts at the first defined value. This is what lets MACD smooth its own
/// line, which is undefined until the slow EMA is seeded. Any NaN after the
/// start taints that index and everything after it.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };
    let seed_end = start + period;
    if seed_end > n {
        return result;
    }

    // Seed: SMA of the first `period` defined values
    let mut sum = 0.0;
    for &v in &values[start..seed_end] {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[seed_end - 1] = seed;

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            // NaN propagates: once we see NaN, subsequent values are tainted
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}
