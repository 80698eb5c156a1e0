//! ForceLab Core: indicator engine and signal combinator.
//!
//! This crate contains the computational heart of ForceLab:
//! - Domain types (candles, validated candle series)
//! - Indicators (fast stochastic, MACD, EMA, SMA) as pure folds over a series
//! - Named entry/exit rules combined by conjunction into signal series
//! - Strategy configuration with TOML loading and fingerprinting
//!
//! No I/O, no portfolio state, nothing carried between calls.

pub mod components;
pub mod config;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signals;

pub use config::{ConfigError, StrategyConfig};
pub use domain::{Candle, CandleError, CandleSeries};
pub use engine::{diagnose, evaluate, Evaluation};
pub use signals::{SignalKind, SignalSeries};
