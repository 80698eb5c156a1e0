//! Indicator precomputation.
//!
//! Every configured indicator is computed once per evaluation, before any rule
//! is checked. Results are stored in one `IndicatorValues` container per pair.

use crate::components::indicator::{Indicator, IndicatorValues};
use crate::config::StrategyConfig;
use crate::domain::CandleSeries;
use crate::indicators::{Ema, FastStochastic, Macd, PriceSource, Sma};

use super::warmup::has_sufficient_history;
use serde::{Deserialize, Serialize};

/// Column names of the indicator series the rules read.
///
/// Built from the same constructors as the indicators themselves, so a key
/// always matches the series it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorKeys {
    pub fast_k: String,
    pub fast_d: String,
    pub macd: String,
    pub macd_signal: String,
    pub ema_short_close: String,
    pub ema_short_open: String,
    pub ema_long_close: String,
    pub ema_long_open: String,
    pub sma_close: String,
    pub sma_open: String,
}

impl IndicatorKeys {
    pub fn from_config(config: &StrategyConfig) -> Self {
        let indicators = build_indicators(config);
        let name = |i: usize| indicators[i].name().to_string();
        Self {
            fast_k: name(0),
            fast_d: name(1),
            macd: name(2),
            macd_signal: name(3),
            ema_short_close: name(4),
            ema_short_open: name(5),
            ema_long_close: name(6),
            ema_long_open: name(7),
            sma_close: name(8),
            sma_open: name(9),
        }
    }
}

/// Build the indicator set described by `config`, in export column order.
///
/// `config` must already be validated; constructors panic on zero periods.
pub fn build_indicators(config: &StrategyConfig) -> Vec<Box<dyn Indicator>> {
    let stoch = config.stochastic;
    let macd = config.macd;
    let ema = config.ema;
    let sma = config.sma;

    vec![
        Box::new(FastStochastic::k(stoch.k_period, stoch.k_smoothing)),
        Box::new(FastStochastic::d(
            stoch.k_period,
            stoch.k_smoothing,
            stoch.d_smoothing,
        )),
        Box::new(Macd::line(macd.fast, macd.slow)),
        Box::new(Macd::signal(macd.fast, macd.slow, macd.signal)),
        Box::new(Ema::new(ema.short, PriceSource::Close)),
        Box::new(Ema::new(ema.short, PriceSource::Open)),
        Box::new(Ema::new(ema.long, PriceSource::Close)),
        Box::new(Ema::new(ema.long, PriceSource::Open)),
        Box::new(Sma::new(sma.period, PriceSource::Close)),
        Box::new(Sma::new(sma.period, PriceSource::Open)),
    ]
}

/// Compute every configured indicator for one pair.
///
/// A series shorter than the configured warm-up has insufficient history:
/// every value of every indicator is undefined. This is not an error.
pub fn compute_indicators(series: &CandleSeries, config: &StrategyConfig) -> IndicatorValues {
    let indicators = build_indicators(config);
    let mut iv = IndicatorValues::new();

    if !has_sufficient_history(series.len(), config.warmup) {
        tracing::debug!(
            pair = series.pair(),
            candles = series.len(),
            warmup = config.warmup,
            "insufficient history, all indicator values undefined"
        );
        for indicator in &indicators {
            iv.insert(indicator.name(), vec![f64::NAN; series.len()]);
        }
        return iv;
    }

    for indicator in &indicators {
        let values = indicator.compute(series);
        debug_assert_eq!(
            values.len(),
            series.len(),
            "indicator '{}' produced {} values for {} candles (pair={})",
            indicator.name(),
            values.len(),
            series.len(),
            series.pair()
        );
        iv.insert(indicator.name(), values);
    }

    tracing::debug!(
        pair = series.pair(),
        candles = series.len(),
        indicators = iv.len(),
        "computed indicators"
    );
    iv
}
