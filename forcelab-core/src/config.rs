//! Serializable strategy configuration.
//!
//! Every indicator period, threshold and the warm-up length live here so the
//! rule set can be exercised with other values in tests. Defaults reproduce
//! the reference rule set: stochastic 5/3/3, MACD 12/26/1, EMA 5/10, SMA 30
//! compared 30 candles back, band 20..80, warm-up 146.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from configuration parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be >= 1")]
    ZeroPeriod { field: &'static str },

    #[error("{slow_field} ({slow}) must be greater than {fast_field} ({fast})")]
    PeriodOrder {
        fast_field: &'static str,
        fast: usize,
        slow_field: &'static str,
        slow: usize,
    },

    #[error("stochastic thresholds must satisfy 0 <= lower < upper <= 100 (got {lower}..{upper})")]
    InvalidThresholds { lower: f64, upper: f64 },

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Fast stochastic parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticParams {
    pub k_period: usize,
    pub k_smoothing: usize,
    pub d_smoothing: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 5,
            k_smoothing: 3,
            d_smoothing: 3,
        }
    }
}

/// MACD parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 1,
        }
    }
}

/// EMA periods, each applied to both close and open.
///
/// The short pair drives the candle-bias rules; the long pair is computed
/// for consumers and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaParams {
    pub short: usize,
    pub long: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { short: 5, long: 10 }
    }
}

/// SMA period (close and open) and the offset of the trend comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaParams {
    pub period: usize,
    pub trend_offset: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self {
            period: 30,
            trend_offset: 30,
        }
    }
}

/// Stochastic band used by the entry and exit rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub stoch_lower: f64,
    pub stoch_upper: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stoch_lower: 20.0,
            stoch_upper: 80.0,
        }
    }
}

/// Complete configuration of the indicator engine and signal rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Candles required before any indicator value is trusted.
    pub warmup: usize,
    pub stochastic: StochasticParams,
    pub macd: MacdParams,
    pub ema: EmaParams,
    pub sma: SmaParams,
    pub thresholds: Thresholds,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            warmup: 146,
            stochastic: StochasticParams::default(),
            macd: MacdParams::default(),
            ema: EmaParams::default(),
            sma: SmaParams::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl StrategyConfig {
    /// Parse a TOML document. Missing sections fall back to defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("stochastic.k_period", self.stochastic.k_period),
            ("stochastic.k_smoothing", self.stochastic.k_smoothing),
            ("stochastic.d_smoothing", self.stochastic.d_smoothing),
            ("macd.fast", self.macd.fast),
            ("macd.slow", self.macd.slow),
            ("macd.signal", self.macd.signal),
            ("ema.short", self.ema.short),
            ("ema.long", self.ema.long),
            ("sma.period", self.sma.period),
            ("sma.trend_offset", self.sma.trend_offset),
        ];
        if let Some((field, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(ConfigError::ZeroPeriod { field: *field });
        }

        if self.macd.slow <= self.macd.fast {
            return Err(ConfigError::PeriodOrder {
                fast_field: "macd.fast",
                fast: self.macd.fast,
                slow_field: "macd.slow",
                slow: self.macd.slow,
            });
        }
        if self.ema.long <= self.ema.short {
            return Err(ConfigError::PeriodOrder {
                fast_field: "ema.short",
                fast: self.ema.short,
                slow_field: "ema.long",
                slow: self.ema.long,
            });
        }

        let Thresholds {
            stoch_lower: lower,
            stoch_upper: upper,
        } = self.thresholds;
        let in_range = (0.0..=100.0).contains(&lower) && (0.0..=100.0).contains(&upper);
        if !in_range || lower >= upper {
            return Err(ConfigError::InvalidThresholds { lower, upper });
        }

        Ok(())
    }

    /// Deterministic BLAKE3 fingerprint of this configuration.
    ///
    /// Two evaluations with identical configs share the same fingerprint,
    /// so exported signal tables can be traced back to their parameters.
    pub fn fingerprint(&self) -> String {
        // Plain structs of numbers; serialization cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
