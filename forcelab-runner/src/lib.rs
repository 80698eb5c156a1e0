//! ForceLab Runner: per-pair pipeline, parallel evaluation, CSV I/O, export.
//!
//! This crate builds on `forcelab-core` to provide:
//! - Candle loading from CSV files
//! - Strategy config files (TOML)
//! - Single-pair and parallel multi-pair evaluation with summaries
//! - Enriched signal table (CSV) and summary (JSON) export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{load_config, load_config_or_default, ConfigFileError};
pub use data_loader::{
    dataset_hash, load_candles_csv, pair_from_path, read_candles_csv, LoadError,
};
pub use export::{
    export_report_json, export_table_csv, file_stem_for, import_report_json, save_outputs,
};
pub use runner::{
    evaluate_files, evaluate_pair, evaluate_pairs, FileOutcome, PairOutput, PairReport,
    PairSummary, RunError, SCHEMA_VERSION,
};
