//! Signal combinator: conjunction of the named rules, evaluated per index.

use serde::Serialize;

use super::rules::{Rule, RuleContext, ENTRY_RULES, EXIT_RULES};
use super::SignalSeries;
use crate::components::indicator::IndicatorValues;
use crate::config::{StrategyConfig, Thresholds};
use crate::domain::CandleSeries;
use crate::engine::precompute::IndicatorKeys;
use crate::engine::warmup::has_sufficient_history;

/// Outcome of one rule at one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub rule: Rule,
    pub passed: bool,
}

/// Every entry and exit rule evaluated at one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDiagnosis {
    pub index: usize,
    /// False when the series is shorter than the warm-up; every rule then fails.
    pub sufficient_history: bool,
    pub entry: Vec<RuleOutcome>,
    pub exit: Vec<RuleOutcome>,
}

impl RuleDiagnosis {
    pub fn entry_long(&self) -> bool {
        self.entry.iter().all(|o| o.passed)
    }

    pub fn exit_long(&self) -> bool {
        self.exit.iter().all(|o| o.passed)
    }

    pub fn first_failed_entry(&self) -> Option<Rule> {
        self.entry.iter().find(|o| !o.passed).map(|o| o.rule)
    }

    pub fn first_failed_exit(&self) -> Option<Rule> {
        self.exit.iter().find(|o| !o.passed).map(|o| o.rule)
    }
}

/// Evaluates the entry and exit conjunctions over a whole series.
///
/// Entry and exit are independent: both may be true at the same index and
/// neither takes precedence here.
#[derive(Debug, Clone)]
pub struct SignalCombinator {
    keys: IndicatorKeys,
    thresholds: Thresholds,
    trend_offset: usize,
    warmup: usize,
}

impl SignalCombinator {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            keys: IndicatorKeys::from_config(config),
            thresholds: config.thresholds,
            trend_offset: config.sma.trend_offset,
            warmup: config.warmup,
        }
    }

    pub fn context<'a>(
        &'a self,
        series: &'a CandleSeries,
        indicators: &'a IndicatorValues,
    ) -> RuleContext<'a> {
        RuleContext {
            series,
            indicators,
            keys: &self.keys,
            thresholds: self.thresholds,
            trend_offset: self.trend_offset,
        }
    }

    /// Produce `entry_long` / `exit_long` aligned with `series`.
    pub fn evaluate(&self, series: &CandleSeries, indicators: &IndicatorValues) -> SignalSeries {
        let n = series.len();
        let mut signals = SignalSeries::new(n);

        if !has_sufficient_history(n, self.warmup) {
            return signals;
        }

        let ctx = self.context(series, indicators);
        for i in 0..n {
            signals.entry_long[i] = ENTRY_RULES.iter().all(|r| r.evaluate(&ctx, i));
            signals.exit_long[i] = EXIT_RULES.iter().all(|r| r.evaluate(&ctx, i));
        }

        signals
    }

    /// Evaluate every rule at `index` without short-circuiting.
    pub fn diagnose(
        &self,
        series: &CandleSeries,
        indicators: &IndicatorValues,
        index: usize,
    ) -> RuleDiagnosis {
        let sufficient_history = has_sufficient_history(series.len(), self.warmup);
        let ctx = self.context(series, indicators);
        let outcomes = |rules: &[Rule]| -> Vec<RuleOutcome> {
            rules
                .iter()
                .map(|&rule| RuleOutcome {
                    rule,
                    passed: sufficient_history && rule.evaluate(&ctx, index),
                })
                .collect()
        };

        RuleDiagnosis {
            index,
            sufficient_history,
            entry: outcomes(&ENTRY_RULES[..]),
            exit: outcomes(&EXIT_RULES[..]),
        }
    }
}
