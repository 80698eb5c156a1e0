//! End-to-end scenarios over hand-shaped candle series.
//!
//! 1. Linear ramp: price, candle bias and trend rules agree, but the fast
//!    stochastic settles at 83.3, outside the 20..80 band, so no entry is
//!    ever raised. MACD is flat at 7 (both EMAs sit at their steady-state
//!    lag), so MacdRising fails too.
//! 2. Flat then declining: exit fires as soon as the decline starts; entry
//!    never fires.
//! 3. Flat market: stochastic is 0 by the zero-range policy; no entry.
//! 4. Short series: everything undefined, every flag false.

use chrono::{DateTime, Duration, TimeZone, Utc};
use forcelab_core::engine::{evaluate, IndicatorKeys};
use forcelab_core::signals::{Rule, SignalCombinator};
use forcelab_core::{Candle, CandleSeries, StrategyConfig};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

fn candle(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp: base() + Duration::minutes(15 * i as i64),
        open,
        high,
        low,
        close,
        volume: 1_000.0,
    }
}

/// close = 100 + i, open = close - 0.5, high = close + 1, low = close - 1.
fn linear_ramp(n: usize) -> CandleSeries {
    let candles = (0..n)
        .map(|i| {
            let close = 100.0 + i as f64;
            candle(i, close - 0.5, close + 1.0, close - 1.0, close)
        })
        .collect();
    CandleSeries::new("RAMP/USDT", candles).unwrap()
}

/// `flat` candles at 100, then `decline` candles each closing 1 lower.
fn flat_then_decline(flat: usize, decline: usize) -> CandleSeries {
    let mut candles: Vec<Candle> = (0..flat)
        .map(|i| candle(i, 100.0, 100.0, 100.0, 100.0))
        .collect();
    for k in 1..=decline {
        let close = 100.0 - k as f64;
        let open = close + 1.0;
        candles.push(candle(flat + k - 1, open, open + 0.5, close - 0.5, close));
    }
    CandleSeries::new("DROP/USDT", candles).unwrap()
}

fn flat(n: usize, price: f64) -> CandleSeries {
    let candles = (0..n)
        .map(|i| candle(i, price, price, price, price))
        .collect();
    CandleSeries::new("FLAT/USDT", candles).unwrap()
}

fn keys() -> IndicatorKeys {
    IndicatorKeys::from_config(&StrategyConfig::default())
}

// ── 1. Linear ramp ───────────────────────────────────────────────────

#[test]
fn ramp_stochastic_settles_above_band() {
    let series = linear_ramp(200);
    let eval = evaluate(&series, &StrategyConfig::default()).unwrap();
    let k = keys();

    // Window of 5: HH = close + 1, LL = close - 5 → 100 * 5 / 6
    let expected = 100.0 * 5.0 / 6.0;
    for i in 8..200 {
        let fast_k = eval.indicators.value(&k.fast_k, i).unwrap();
        let fast_d = eval.indicators.value(&k.fast_d, i).unwrap();
        assert!((fast_k - expected).abs() < 1e-9, "fastK at {i}: {fast_k}");
        assert!((fast_d - expected).abs() < 1e-9, "fastD at {i}: {fast_d}");
        assert!(fast_k > 80.0);
    }
}

#[test]
fn ramp_trend_rules_hold() {
    let series = linear_ramp(200);
    let config = StrategyConfig::default();
    let eval = evaluate(&series, &config).unwrap();
    let k = keys();

    for i in 4..200 {
        let ema_close = eval.indicators.value(&k.ema_short_close, i).unwrap();
        let ema_open = eval.indicators.value(&k.ema_short_open, i).unwrap();
        assert!(ema_close >= ema_open, "ema5 bias at {i}");
    }
    for i in 59..200 {
        let now = eval.indicators.value(&k.sma_close, i).unwrap();
        let then = eval.indicators.value(&k.sma_close, i - 30).unwrap();
        assert!(now >= then, "sma trend at {i}");
    }

    let combinator = SignalCombinator::new(&config);
    let diagnosis = combinator.diagnose(&series, &eval.indicators, 150);
    let outcome = |rule: Rule| {
        diagnosis
            .entry
            .iter()
            .find(|o| o.rule == rule)
            .map(|o| o.passed)
            .unwrap()
    };
    assert!(outcome(Rule::PriceRising));
    assert!(outcome(Rule::BullishCandleBias));
    assert!(outcome(Rule::TrendConfirmation));
    assert!(!outcome(Rule::StochasticBand));
    assert_eq!(diagnosis.first_failed_entry(), Some(Rule::StochasticBand));
}

#[test]
fn ramp_macd_is_constant_and_not_rising() {
    let series = linear_ramp(200);
    let config = StrategyConfig::default();
    let eval = evaluate(&series, &config).unwrap();
    let k = keys();

    // SMA-seeded EMAs lag a unit ramp by (p - 1) / 2: 5.5 and 12.5.
    for i in 25..200 {
        let macd = eval.indicators.value(&k.macd, i).unwrap();
        let signal = eval.indicators.value(&k.macd_signal, i).unwrap();
        assert!((macd - 7.0).abs() < 1e-9, "macd at {i}: {macd}");
        assert!((signal - 7.0).abs() < 1e-9, "signal at {i}: {signal}");
    }
    assert_eq!(eval.indicators.value(&k.macd, 24), None);

    let combinator = SignalCombinator::new(&config);
    for i in [26, 100, 150, 199] {
        let diagnosis = combinator.diagnose(&series, &eval.indicators, i);
        let macd_rising = diagnosis
            .entry
            .iter()
            .find(|o| o.rule == Rule::MacdRising)
            .map(|o| o.passed)
            .unwrap();
        assert!(!macd_rising, "MacdRising held at {i}");
    }
}

#[test]
fn ramp_never_enters_because_stochastic_is_overbought() {
    let series = linear_ramp(200);
    let eval = evaluate(&series, &StrategyConfig::default()).unwrap();
    assert_eq!(eval.signals.entry_count(), 0);
    // ema5 close stays above ema5 open, so the bearish exit never holds either.
    assert_eq!(eval.signals.exit_count(), 0);
}

// ── 2. Flat then decline ─────────────────────────────────────────────

#[test]
fn decline_triggers_exit_on_first_down_candle() {
    let series = flat_then_decline(150, 50);
    let eval = evaluate(&series, &StrategyConfig::default()).unwrap();

    let first_exit = eval.signals.exit_long.iter().position(|&b| b);
    assert_eq!(first_exit, Some(150));
    assert!(eval.signals.exit_long[..150].iter().all(|&b| !b));
    assert_eq!(eval.signals.entry_count(), 0);
}

#[test]
fn decline_exit_rules_at_first_down_candle() {
    let series = flat_then_decline(150, 50);
    let config = StrategyConfig::default();
    let eval = evaluate(&series, &config).unwrap();
    let k = keys();

    // raw %K: HH = 100.5, LL = 98.5, close = 99 → 25; previous two windows flat → 0
    let fast_k = eval.indicators.value(&k.fast_k, 150).unwrap();
    assert!((fast_k - 25.0 / 3.0).abs() < 1e-9);

    let macd_now = eval.indicators.value(&k.macd, 150).unwrap();
    let macd_prev = eval.indicators.value(&k.macd, 149).unwrap();
    assert!(macd_now < macd_prev);
    assert!(macd_prev.abs() < 1e-9);

    let diagnosis = SignalCombinator::new(&config).diagnose(&series, &eval.indicators, 150);
    assert!(diagnosis.exit_long());
    // fastK 8.3 is below the band floor, so the band check fails before MACD
    assert_eq!(diagnosis.first_failed_entry(), Some(Rule::StochasticBand));
    assert!(diagnosis
        .entry
        .iter()
        .any(|o| o.rule == Rule::MacdRising && !o.passed));
}

// ── 3. Flat market ───────────────────────────────────────────────────

#[test]
fn flat_market_stochastic_is_zero() {
    let series = flat(200, 42.0);
    let eval = evaluate(&series, &StrategyConfig::default()).unwrap();
    let k = keys();

    for i in 8..200 {
        assert_eq!(eval.indicators.value(&k.fast_k, i), Some(0.0));
        assert_eq!(eval.indicators.value(&k.fast_d, i), Some(0.0));
    }
    assert_eq!(eval.signals.entry_count(), 0);
    assert_eq!(eval.signals.exit_count(), 0);
}

// ── 4. Insufficient history ──────────────────────────────────────────

#[test]
fn short_series_is_undefined_and_silent() {
    let series = linear_ramp(145);
    let eval = evaluate(&series, &StrategyConfig::default()).unwrap();
    assert!(!eval.sufficient_history);
    assert!(eval.indicators.all_undefined());
    assert_eq!(eval.indicators.len(), 10);
    assert!(eval.signals.entry_long.iter().all(|&b| !b));
    assert!(eval.signals.exit_long.iter().all(|&b| !b));
}

#[test]
fn series_at_warmup_is_evaluated() {
    let series = flat_then_decline(140, 6);
    let eval = evaluate(&series, &StrategyConfig::default()).unwrap();
    assert!(eval.sufficient_history);
    assert!(!eval.indicators.all_undefined());
    assert!(eval.signals.exit_long[140]);
}
