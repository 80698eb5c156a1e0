//! Moving Average Convergence Divergence (MACD).
//!
//! macd[t]   = EMA(close, fast)[t] - EMA(close, slow)[t]
//! signal[t] = EMA(macd, signal_period)[t], seeded once macd is defined.
//!
//! The signal line goes through the generic EMA path for every period, so a
//! signal period of 1 reproduces the MACD line exactly.
//!
//! Lookback: max(fast, slow) - 1 for the line, plus (signal - 1) for the signal.

use super::ema::ema_of_series;
use crate::components::indicator::Indicator;
use crate::domain::CandleSeries;

/// Which MACD output to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn line(fast: usize, slow: usize) -> Self {
        Self::build(fast, slow, 1, MacdLine::Macd)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::build(fast, slow, signal, MacdLine::Signal)
    }

    fn build(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must be > fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        let name = match line {
            MacdLine::Macd => format!("macd_{fast}_{slow}"),
            MacdLine::Signal => format!("macd_signal_{fast}_{slow}_{signal}"),
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name,
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let line = self.slow - 1;
        match self.line {
            MacdLine::Macd => line,
            MacdLine::Signal => line + (self.signal - 1),
        }
    }

    fn compute(&self, series: &CandleSeries) -> Vec<f64> {
        let closes = series.closes();
        let macd = macd_line(&closes, self.fast, self.slow);
        match self.line {
            MacdLine::Macd => macd,
            MacdLine::Signal => ema_of_series(&macd, self.signal),
        }
    }
}

fn macd_line(closes: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    let fast_ema = ema_of_series(closes, fast);
    let slow_ema = ema_of_series(closes, slow);
    // NaN on either side stays NaN through the subtraction.
    fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect()
}
