//! Domain types for ForceLab

pub mod candle;

pub use candle::{Candle, CandleError, CandleSeries};

/// Trading pair identifier (e.g. "BTC/USDT").
pub type Pair = String;
