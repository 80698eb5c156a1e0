//! Named entry and exit rules.
//!
//! Each rule is a pure predicate over a `RuleContext` and an index. Rules
//! only read data at indices <= the evaluated index. A reference before the
//! start of history, or to an undefined indicator value, makes the rule false.

use serde::{Deserialize, Serialize};

use crate::components::indicator::IndicatorValues;
use crate::config::Thresholds;
use crate::domain::CandleSeries;
use crate::engine::precompute::IndicatorKeys;

/// Every rule the combinator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// lower <= fastK <= upper and lower <= fastD <= upper
    StochasticBand,
    /// macd and macd signal both above their previous value
    MacdRising,
    /// close above the previous close
    PriceRising,
    /// short EMA of close >= short EMA of open
    BullishCandleBias,
    /// SMA of close >= its value `trend_offset` candles back
    TrendConfirmation,
    /// fastK <= upper and fastD <= upper
    StochasticNotOverbought,
    /// macd and macd signal both below their previous value
    MacdFalling,
    /// short EMA of close < short EMA of open
    BearishCandleBias,
}

/// Rules that must all hold for `entry_long`.
pub const ENTRY_RULES: [Rule; 5] = [
    Rule::StochasticBand,
    Rule::MacdRising,
    Rule::PriceRising,
    Rule::BullishCandleBias,
    Rule::TrendConfirmation,
];

/// Rules that must all hold for `exit_long`.
pub const EXIT_RULES: [Rule; 3] = [
    Rule::StochasticNotOverbought,
    Rule::MacdFalling,
    Rule::BearishCandleBias,
];

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::StochasticBand => "stochastic_band",
            Rule::MacdRising => "macd_rising",
            Rule::PriceRising => "price_rising",
            Rule::BullishCandleBias => "bullish_candle_bias",
            Rule::TrendConfirmation => "trend_confirmation",
            Rule::StochasticNotOverbought => "stochastic_not_overbought",
            Rule::MacdFalling => "macd_falling",
            Rule::BearishCandleBias => "bearish_candle_bias",
        }
    }

    pub fn evaluate(&self, ctx: &RuleContext<'_>, index: usize) -> bool {
        match self {
            Rule::StochasticBand => stochastic_band(ctx, index),
            Rule::MacdRising => macd_rising(ctx, index),
            Rule::PriceRising => price_rising(ctx, index),
            Rule::BullishCandleBias => bullish_candle_bias(ctx, index),
            Rule::TrendConfirmation => trend_confirmation(ctx, index),
            Rule::StochasticNotOverbought => stochastic_not_overbought(ctx, index),
            Rule::MacdFalling => macd_falling(ctx, index),
            Rule::BearishCandleBias => bearish_candle_bias(ctx, index),
        }
    }
}

/// Everything a rule may read: candles, indicator series, and parameters.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub series: &'a CandleSeries,
    pub indicators: &'a IndicatorValues,
    pub keys: &'a IndicatorKeys,
    pub thresholds: Thresholds,
    pub trend_offset: usize,
}

impl<'a> RuleContext<'a> {
    /// Defined indicator value at `index`.
    pub fn value(&self, key: &str, index: usize) -> Option<f64> {
        self.indicators.value(key, index)
    }

    /// Defined indicator value `offset` candles before `index`.
    pub fn value_back(&self, key: &str, index: usize, offset: usize) -> Option<f64> {
        self.value(key, index.checked_sub(offset)?)
    }

    pub fn close(&self, index: usize) -> Option<f64> {
        self.series
            .get(index)
            .map(|c| c.close)
            .filter(|c| !c.is_nan())
    }
}

fn in_band(value: f64, t: &Thresholds) -> bool {
    value >= t.stoch_lower && value <= t.stoch_upper
}

/// Compare a series with its previous value; `None` when either is undefined.
fn versus_previous(ctx: &RuleContext<'_>, key: &str, index: usize) -> Option<(f64, f64)> {
    let current = ctx.value(key, index)?;
    let previous = ctx.value_back(key, index, 1)?;
    Some((current, previous))
}

fn stochastic_pair(ctx: &RuleContext<'_>, index: usize) -> Option<(f64, f64)> {
    let k = ctx.value(&ctx.keys.fast_k, index)?;
    let d = ctx.value(&ctx.keys.fast_d, index)?;
    Some((k, d))
}

fn short_emas(ctx: &RuleContext<'_>, index: usize) -> Option<(f64, f64)> {
    let close = ctx.value(&ctx.keys.ema_short_close, index)?;
    let open = ctx.value(&ctx.keys.ema_short_open, index)?;
    Some((close, open))
}

pub fn stochastic_band(ctx: &RuleContext<'_>, index: usize) -> bool {
    stochastic_pair(ctx, index)
        .map(|(k, d)| in_band(k, &ctx.thresholds) && in_band(d, &ctx.thresholds))
        .unwrap_or(false)
}

pub fn stochastic_not_overbought(ctx: &RuleContext<'_>, index: usize) -> bool {
    let upper = ctx.thresholds.stoch_upper;
    stochastic_pair(ctx, index)
        .map(|(k, d)| k <= upper && d <= upper)
        .unwrap_or(false)
}

pub fn macd_rising(ctx: &RuleContext<'_>, index: usize) -> bool {
    let rising = |key: &str| {
        versus_previous(ctx, key, index)
            .map(|(cur, prev)| cur > prev)
            .unwrap_or(false)
    };
    rising(&ctx.keys.macd) && rising(&ctx.keys.macd_signal)
}

pub fn macd_falling(ctx: &RuleContext<'_>, index: usize) -> bool {
    let falling = |key: &str| {
        versus_previous(ctx, key, index)
            .map(|(cur, prev)| cur < prev)
            .unwrap_or(false)
    };
    falling(&ctx.keys.macd) && falling(&ctx.keys.macd_signal)
}

pub fn price_rising(ctx: &RuleContext<'_>, index: usize) -> bool {
    let Some(prev_index) = index.checked_sub(1) else {
        return false;
    };
    match (ctx.close(index), ctx.close(prev_index)) {
        (Some(cur), Some(prev)) => cur > prev,
        _ => false,
    }
}

pub fn bullish_candle_bias(ctx: &RuleContext<'_>, index: usize) -> bool {
    short_emas(ctx, index)
        .map(|(close, open)| close >= open)
        .unwrap_or(false)
}

pub fn bearish_candle_bias(ctx: &RuleContext<'_>, index: usize) -> bool {
    short_emas(ctx, index)
        .map(|(close, open)| close < open)
        .unwrap_or(false)
}

pub fn trend_confirmation(ctx: &RuleContext<'_>, index: usize) -> bool {
    let key = &ctx.keys.sma_close;
    match (
        ctx.value(key, index),
        ctx.value_back(key, index, ctx.trend_offset),
    ) {
        (Some(cur), Some(past)) => cur >= past,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;
    use crate::indicators::make_series;

    struct Fixture {
        series: CandleSeries,
        indicators: IndicatorValues,
        keys: IndicatorKeys,
    }

    impl Fixture {
        fn new(closes: &[f64]) -> Self {
            let keys = IndicatorKeys::from_config(&StrategyConfig::default());
            Self {
                series: make_series(closes),
                indicators: IndicatorValues::new(),
                keys,
            }
        }

        fn set(&mut self, key: fn(&IndicatorKeys) -> &String, values: Vec<f64>) {
            let name = key(&self.keys).clone();
            self.indicators.insert(name, values);
        }

        fn ctx(&self) -> RuleContext<'_> {
            RuleContext {
                series: &self.series,
                indicators: &self.indicators,
                keys: &self.keys,
                thresholds: Thresholds::default(),
                trend_offset: 2,
            }
        }
    }

    #[test]
    fn stochastic_band_inclusive_bounds() {
        let mut f = Fixture::new(&[1.0; 4]);
        f.set(|k| &k.fast_k, vec![20.0, 80.0, 19.9, 50.0]);
        f.set(|k| &k.fast_d, vec![80.0, 20.0, 50.0, 80.1]);
        let ctx = f.ctx();
        assert!(stochastic_band(&ctx, 0));
        assert!(stochastic_band(&ctx, 1));
        assert!(!stochastic_band(&ctx, 2));
        assert!(!stochastic_band(&ctx, 3));
    }

    #[test]
    fn stochastic_not_overbought_has_no_lower_bound() {
        let mut f = Fixture::new(&[1.0; 3]);
        f.set(|k| &k.fast_k, vec![0.0, 80.0, 80.5]);
        f.set(|k| &k.fast_d, vec![0.0, 80.0, 10.0]);
        let ctx = f.ctx();
        assert!(stochastic_not_overbought(&ctx, 0));
        assert!(stochastic_not_overbought(&ctx, 1));
        assert!(!stochastic_not_overbought(&ctx, 2));
    }

    #[test]
    fn stochastic_undefined_is_false() {
        let mut f = Fixture::new(&[1.0; 2]);
        f.set(|k| &k.fast_k, vec![f64::NAN, 50.0]);
        f.set(|k| &k.fast_d, vec![50.0, f64::NAN]);
        let ctx = f.ctx();
        assert!(!stochastic_band(&ctx, 0));
        assert!(!stochastic_band(&ctx, 1));
        assert!(!stochastic_not_overbought(&ctx, 0));
        assert!(!stochastic_not_overbought(&ctx, 1));
    }

    #[test]
    fn macd_rising_needs_both_lines() {
        let mut f = Fixture::new(&[1.0; 4]);
        f.set(|k| &k.macd, vec![1.0, 2.0, 3.0, 4.0]);
        f.set(|k| &k.macd_signal, vec![1.0, 2.0, 2.0, 3.0]);
        let ctx = f.ctx();
        assert!(!macd_rising(&ctx, 0), "no previous value at index 0");
        assert!(macd_rising(&ctx, 1));
        assert!(!macd_rising(&ctx, 2), "signal flat");
        assert!(macd_rising(&ctx, 3));
    }

    #[test]
    fn macd_falling_is_strict() {
        let mut f = Fixture::new(&[1.0; 3]);
        f.set(|k| &k.macd, vec![3.0, 2.0, 2.0]);
        f.set(|k| &k.macd_signal, vec![3.0, 2.0, 1.0]);
        let ctx = f.ctx();
        assert!(macd_falling(&ctx, 1));
        assert!(!macd_falling(&ctx, 2));
    }

    #[test]
    fn macd_previous_undefined_is_false() {
        let mut f = Fixture::new(&[1.0; 3]);
        f.set(|k| &k.macd, vec![f64::NAN, 2.0, 3.0]);
        f.set(|k| &k.macd_signal, vec![f64::NAN, 2.0, 3.0]);
        let ctx = f.ctx();
        assert!(!macd_rising(&ctx, 1));
        assert!(!macd_falling(&ctx, 1));
        assert!(macd_rising(&ctx, 2));
    }

    #[test]
    fn price_rising_compares_closes() {
        let f = Fixture::new(&[10.0, 11.0, 11.0, 10.0]);
        let ctx = f.ctx();
        assert!(!price_rising(&ctx, 0));
        assert!(price_rising(&ctx, 1));
        assert!(!price_rising(&ctx, 2));
        assert!(!price_rising(&ctx, 3));
        assert!(!price_rising(&ctx, 10), "out of range");
    }

    #[test]
    fn candle_bias_rules_are_complementary() {
        let mut f = Fixture::new(&[1.0; 3]);
        f.set(|k| &k.ema_short_close, vec![10.0, 10.0, 9.0]);
        f.set(|k| &k.ema_short_open, vec![9.0, 10.0, 10.0]);
        let ctx = f.ctx();
        assert!(bullish_candle_bias(&ctx, 0));
        assert!(!bearish_candle_bias(&ctx, 0));
        assert!(bullish_candle_bias(&ctx, 1), "equal EMAs count as bullish");
        assert!(!bearish_candle_bias(&ctx, 1));
        assert!(!bullish_candle_bias(&ctx, 2));
        assert!(bearish_candle_bias(&ctx, 2));
    }

    #[test]
    fn trend_confirmation_uses_offset() {
        let mut f = Fixture::new(&[1.0; 5]);
        f.set(|k| &k.sma_close, vec![f64::NAN, 5.0, 6.0, 5.0, 4.0]);
        let ctx = f.ctx();
        // trend_offset = 2
        assert!(!trend_confirmation(&ctx, 1), "reference before history");
        assert!(!trend_confirmation(&ctx, 2), "reference undefined");
        assert!(trend_confirmation(&ctx, 3), "5.0 >= 5.0");
        assert!(!trend_confirmation(&ctx, 4), "4.0 < 6.0");
    }

    #[test]
    fn missing_series_is_false() {
        let f = Fixture::new(&[1.0; 3]);
        let ctx = f.ctx();
        for rule in ENTRY_RULES.iter().chain(EXIT_RULES.iter()) {
            if *rule == Rule::PriceRising {
                continue;
            }
            assert!(!rule.evaluate(&ctx, 2), "{} should be false", rule.name());
        }
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<&str> = ENTRY_RULES
            .iter()
            .chain(EXIT_RULES.iter())
            .map(|r| r.name())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
    }
}
