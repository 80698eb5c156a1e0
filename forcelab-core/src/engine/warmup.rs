//! Warm-up bookkeeping.
//!
//! The configured warm-up is the number of candles a pair must have before
//! any value is trusted. `minimum_history` is the shortest warm-up under which
//! every rule can evaluate at its last index; a configured warm-up below it is
//! allowed but logged.

use crate::components::indicator::Indicator;
use crate::config::StrategyConfig;
use crate::indicators::{Ema, FastStochastic, Macd, PriceSource, Sma};

/// Candles needed before every entry and exit rule can be defined.
///
/// - stochastic %D lookback
/// - MACD signal lookback + 1 (compared with the previous candle)
/// - short EMA lookback
/// - SMA lookback + trend offset (compared `trend_offset` candles back)
pub fn minimum_history(config: &StrategyConfig) -> usize {
    let stoch = FastStochastic::d(
        config.stochastic.k_period,
        config.stochastic.k_smoothing,
        config.stochastic.d_smoothing,
    )
    .lookback();
    let macd = Macd::signal(config.macd.fast, config.macd.slow, config.macd.signal).lookback() + 1;
    let ema = Ema::new(config.ema.short, PriceSource::Close).lookback();
    let trend =
        Sma::new(config.sma.period, PriceSource::Close).lookback() + config.sma.trend_offset;

    stoch.max(macd).max(ema).max(trend) + 1
}

/// Whether `len` candles satisfy the configured warm-up.
pub fn has_sufficient_history(len: usize, warmup: usize) -> bool {
    len >= warmup
}

/// Log a warning if the configured warm-up is shorter than the rules need.
///
/// Returns true when the warm-up covers `minimum_history`.
pub fn check_warmup(config: &StrategyConfig) -> bool {
    let minimum = minimum_history(config);
    if config.warmup < minimum {
        tracing::warn!(
            warmup = config.warmup,
            minimum,
            "configured warm-up is shorter than the longest rule dependency"
        );
        return false;
    }
    true
}
