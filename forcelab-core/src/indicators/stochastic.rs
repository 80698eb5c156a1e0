//! Fast Stochastic oscillator (%K / %D).
//!
//! raw %K[t] = 100 * (close[t] - LL) / (HH - LL), where HH/LL are the highest
//! high and lowest low over the last `k_period` candles.
//! fastK = SMA(raw %K, k_smoothing), fastD = SMA(fastK, d_smoothing).
//!
//! A flat window (HH == LL) has no range to compare against; the ratio is
//! defined as 0 there so flat markets yield 0, never a division error.
//!
//! Lookback: (k_period - 1) + (k_smoothing - 1) for %K, plus (d_smoothing - 1) for %D.

use super::sma::sma_of_series;
use crate::components::indicator::Indicator;
use crate::domain::{Candle, CandleSeries};

/// Which line of the oscillator to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct FastStochastic {
    k_period: usize,
    k_smoothing: usize,
    d_smoothing: usize,
    line: StochasticLine,
    name: String,
}

impl FastStochastic {
    pub fn k(k_period: usize, k_smoothing: usize) -> Self {
        Self::build(k_period, k_smoothing, 1, StochasticLine::K)
    }

    pub fn d(k_period: usize, k_smoothing: usize, d_smoothing: usize) -> Self {
        Self::build(k_period, k_smoothing, d_smoothing, StochasticLine::D)
    }

    fn build(
        k_period: usize,
        k_smoothing: usize,
        d_smoothing: usize,
        line: StochasticLine,
    ) -> Self {
        assert!(k_period >= 1, "stochastic k_period must be >= 1");
        assert!(k_smoothing >= 1, "stochastic k_smoothing must be >= 1");
        assert!(d_smoothing >= 1, "stochastic d_smoothing must be >= 1");
        let name = match line {
            StochasticLine::K => format!("stoch_fast_k_{k_period}_{k_smoothing}"),
            StochasticLine::D => format!("stoch_fast_d_{k_period}_{k_smoothing}_{d_smoothing}"),
        };
        Self {
            k_period,
            k_smoothing,
            d_smoothing,
            line,
            name,
        }
    }
}

impl Indicator for FastStochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = (self.k_period - 1) + (self.k_smoothing - 1);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => k + (self.d_smoothing - 1),
        }
    }

    fn compute(&self, series: &CandleSeries) -> Vec<f64> {
        let raw = raw_k(series.candles(), self.k_period);
        let fast_k = sma_of_series(&raw, self.k_smoothing);
        match self.line {
            StochasticLine::K => fast_k,
            StochasticLine::D => sma_of_series(&fast_k, self.d_smoothing),
        }
    }
}

/// Unsmoothed %K over a trailing window of `period` candles.
///
/// Clamped to [0, 100]: a close outside its own high/low (an inconsistent
/// candle) reads as the nearer band edge.
pub fn raw_k(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &candles[(i + 1 - period)..=i];
        if window.iter().any(|c| c.high.is_nan() || c.low.is_nan()) {
            continue;
        }
        let highest = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let close = candles[i].close;

        let range = highest - lowest;
        result[i] = if close.is_nan() {
            f64::NAN
        } else if range > 0.0 {
            (100.0 * (close - lowest) / range).clamp(0.0, 100.0)
        } else {
            0.0
        };
    }

    result
}
