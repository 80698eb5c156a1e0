//! Pair runner: wires together loading, evaluation and summary reporting.
//!
//! Three entry points:
//! - `evaluate_pair()`: one in-memory candle series. No I/O.
//! - `evaluate_pairs()`: many in-memory series, in parallel.
//! - `evaluate_files()`: loads CSV files, then evaluates them in parallel. Used by the CLI.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use forcelab_core::domain::Pair;
use forcelab_core::engine::minimum_history;
use forcelab_core::signals::SignalEvent;
use forcelab_core::{evaluate, CandleSeries, ConfigError, Evaluation, StrategyConfig};

use crate::data_loader::{dataset_hash, load_candles_csv, pair_from_path, LoadError};
use crate::export::file_stem_for;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("pair '{pair}' from {path} would overwrite the outputs of {first}")]
    DuplicatePair {
        pair: Pair,
        path: PathBuf,
        first: PathBuf,
    },
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Serializable summary of one pair's evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub pair: Pair,
    pub candle_count: usize,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub warmup: usize,
    pub minimum_history: usize,
    pub sufficient_history: bool,
    pub config: StrategyConfig,
    pub config_fingerprint: String,
    pub dataset_hash: String,
    pub entry_count: usize,
    pub exit_count: usize,
    /// Indices where entry and exit are both raised; left for the consumer to resolve.
    pub conflicts: Vec<usize>,
    pub events: Vec<SignalEvent>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Full result for one pair: the summary plus every aligned series.
#[derive(Debug, Clone)]
pub struct PairReport {
    pub summary: PairSummary,
    pub evaluation: Evaluation,
}

/// A loaded series together with its report.
#[derive(Debug, Clone)]
pub struct PairOutput {
    pub series: CandleSeries,
    pub report: PairReport,
}

/// Outcome for one input file, reported in input order.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub pair: Pair,
    pub result: Result<PairOutput, RunError>,
}

/// Evaluate one pair's candles. Pure computation, no I/O.
pub fn evaluate_pair(
    series: &CandleSeries,
    config: &StrategyConfig,
) -> Result<PairReport, RunError> {
    let span = tracing::info_span!("pair", pair = series.pair(), candles = series.len());
    let _guard = span.enter();

    let evaluation = evaluate(series, config)?;
    if !evaluation.sufficient_history {
        tracing::warn!(
            warmup = config.warmup,
            "fewer candles than the warm-up; every signal is false"
        );
    }

    let signals = &evaluation.signals;
    let summary = PairSummary {
        schema_version: SCHEMA_VERSION,
        pair: series.pair().to_string(),
        candle_count: series.len(),
        first_timestamp: series.candles().first().map(|c| c.timestamp),
        last_timestamp: series.candles().last().map(|c| c.timestamp),
        warmup: config.warmup,
        minimum_history: minimum_history(config),
        sufficient_history: evaluation.sufficient_history,
        config: config.clone(),
        config_fingerprint: config.fingerprint(),
        dataset_hash: dataset_hash(series),
        entry_count: signals.entry_count(),
        exit_count: signals.exit_count(),
        conflicts: signals.conflicts(),
        events: signals.events(series),
    };

    tracing::info!(
        entries = summary.entry_count,
        exits = summary.exit_count,
        "evaluated"
    );

    Ok(PairReport {
        summary,
        evaluation,
    })
}

/// Evaluate many pairs in parallel.
///
/// Pairs share nothing but the read-only config; one pair failing does not
/// affect the others.
pub fn evaluate_pairs(
    pairs: &BTreeMap<Pair, CandleSeries>,
    config: &StrategyConfig,
) -> BTreeMap<Pair, Result<PairReport, RunError>> {
    pairs
        .par_iter()
        .map(|(pair, series)| (pair.clone(), evaluate_pair(series, config)))
        .collect()
}

/// Load each CSV file as one pair (named after its file stem) and evaluate
/// them in parallel.
///
/// One outcome per path, in input order. A file whose pair maps to the same
/// output name as an earlier file fails with `RunError::DuplicatePair`
/// instead of replacing it.
pub fn evaluate_files(paths: &[PathBuf], config: &StrategyConfig) -> Vec<FileOutcome> {
    let mut first_by_stem: HashMap<String, usize> = HashMap::new();
    let jobs: Vec<(&PathBuf, Pair, Option<PathBuf>)> = paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let pair = pair_from_path(path);
            let first = *first_by_stem.entry(file_stem_for(&pair)).or_insert(i);
            let duplicate_of = (first != i).then(|| paths[first].clone());
            (path, pair, duplicate_of)
        })
        .collect();

    jobs.into_par_iter()
        .map(|(path, pair, duplicate_of)| {
            let result = match duplicate_of {
                Some(first) => Err(RunError::DuplicatePair {
                    pair: pair.clone(),
                    path: path.clone(),
                    first,
                }),
                None => load_candles_csv(path, &pair)
                    .map_err(RunError::from)
                    .and_then(|series| {
                        let report = evaluate_pair(&series, config)?;
                        Ok(PairOutput { series, report })
                    }),
            };
            if let Err(e) = &result {
                tracing::warn!(pair = %pair, path = %path.display(), error = %e, "pair failed");
            }
            FileOutcome {
                path: path.clone(),
                pair,
                result,
            }
        })
        .collect()
}
