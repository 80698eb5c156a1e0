//! Signal generation: turns candles plus indicator series into entry/exit flags.
//!
//! Signals are stateless: every call re-derives them from the full candle
//! history. There is no portfolio or position state anywhere in this module,
//! and a flag describes a market condition, not a decision to trade.

pub mod combinator;
pub mod rules;

pub use combinator::{RuleDiagnosis, RuleOutcome, SignalCombinator};
pub use rules::{Rule, RuleContext, ENTRY_RULES, EXIT_RULES};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::CandleSeries;

/// Kind of a raised flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    EnterLong,
    ExitLong,
}

/// One raised flag, located by index and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub kind: SignalKind,
}

/// Entry and exit flags aligned 1:1 with a candle series. Default false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSeries {
    pub entry_long: Vec<bool>,
    pub exit_long: Vec<bool>,
}

impl SignalSeries {
    pub fn new(len: usize) -> Self {
        Self {
            entry_long: vec![false; len],
            exit_long: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.entry_long.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_long.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entry_long.iter().filter(|&&b| b).count()
    }

    pub fn exit_count(&self) -> usize {
        self.exit_long.iter().filter(|&&b| b).count()
    }

    /// Indices where entry and exit are both raised.
    ///
    /// Resolving these is up to the consumer.
    pub fn conflicts(&self) -> Vec<usize> {
        self.entry_long
            .iter()
            .zip(&self.exit_long)
            .enumerate()
            .filter(|(_, (entry, exit))| **entry && **exit)
            .map(|(i, _)| i)
            .collect()
    }

    /// Raised flags in index order, entry before exit at the same index.
    pub fn events(&self, series: &CandleSeries) -> Vec<SignalEvent> {
        let mut events = Vec::new();
        for (index, candle) in series.candles().iter().enumerate().take(self.len()) {
            if self.entry_long[index] {
                events.push(SignalEvent {
                    index,
                    timestamp: candle.timestamp,
                    kind: SignalKind::EnterLong,
                });
            }
            if self.exit_long[index] {
                events.push(SignalEvent {
                    index,
                    timestamp: candle.timestamp,
                    kind: SignalKind::ExitLong,
                });
            }
        }
        events
    }
}
