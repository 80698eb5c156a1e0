//! Component traits shared by the indicator engine and the signal rules.

pub mod indicator;

pub use indicator::{Indicator, IndicatorValues};
