//! Indicator trait and precomputed indicator values container.
//!
//! Indicators are pure functions: candle history in, numeric series out.
//! They are computed once per evaluation and then read by index from the
//! signal rules. Nothing is carried between evaluations.

use crate::domain::CandleSeries;
use std::collections::HashMap;

/// Trait for indicators.
///
/// Indicators take a full candle series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at index t may depend on price data from index t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Column name (e.g., "sma_30_close", "stoch_fast_k_5_3").
    fn name(&self) -> &str;

    /// Index of the first value that can be defined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire candle series.
    ///
    /// Returns a `Vec<f64>` of the same length as `series`.
    fn compute(&self, series: &CandleSeries) -> Vec<f64>;
}

/// Container for computed indicator series.
///
/// Series are kept in insertion order so exports list columns the way the
/// indicator set defines them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorValues {
    order: Vec<String>,
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named indicator series, replacing any series with the same name.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        if !self.series.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.series.insert(name, values);
    }

    /// Raw value at an index, NaN included.
    pub fn get(&self, name: &str, index: usize) -> Option<f64> {
        self.series.get(name).and_then(|v| v.get(index).copied())
    }

    /// Defined value at an index. Undefined (NaN), missing series and
    /// out-of-range indices are all `None`.
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.get(name, index).filter(|v| !v.is_nan())
    }

    /// Get the full series for a named indicator.
    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    /// Series names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Iterate `(name, series)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.order
            .iter()
            .filter_map(|name| self.get_series(name).map(|s| (name.as_str(), s)))
    }

    /// Number of indicator series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// True when no stored series holds a single defined value.
    pub fn all_undefined(&self) -> bool {
        self.series.values().all(|s| s.iter().all(|v| v.is_nan()))
    }
}
