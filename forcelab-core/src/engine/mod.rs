//! Evaluation pipeline for one pair: candles → indicators → signals.
//!
//! Each call starts from scratch. Nothing is cached or carried between calls,
//! so evaluating the same candles twice yields identical output.

pub mod precompute;
pub mod warmup;

pub use precompute::{build_indicators, compute_indicators, IndicatorKeys};
pub use warmup::{check_warmup, has_sufficient_history, minimum_history};

use crate::components::indicator::IndicatorValues;
use crate::config::{ConfigError, StrategyConfig};
use crate::domain::CandleSeries;
use crate::signals::{RuleDiagnosis, SignalCombinator, SignalSeries};

/// Indicator and signal output for one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub indicators: IndicatorValues,
    pub signals: SignalSeries,
    /// Whether the series met the configured warm-up.
    pub sufficient_history: bool,
}

/// Validate `config`, then compute indicators and signals for `series`.
pub fn evaluate(series: &CandleSeries, config: &StrategyConfig) -> Result<Evaluation, ConfigError> {
    config.validate()?;

    let indicators = compute_indicators(series, config);
    let signals = SignalCombinator::new(config).evaluate(series, &indicators);

    Ok(Evaluation {
        indicators,
        signals,
        sufficient_history: has_sufficient_history(series.len(), config.warmup),
    })
}

/// Rule-by-rule breakdown at one index, recomputing indicators first.
pub fn diagnose(
    series: &CandleSeries,
    config: &StrategyConfig,
    index: usize,
) -> Result<RuleDiagnosis, ConfigError> {
    config.validate()?;

    let indicators = compute_indicators(series, config);
    Ok(SignalCombinator::new(config).diagnose(series, &indicators, index))
}
