//! Export: enriched signal table (CSV) and pair summary (JSON).
//!
//! The CSV table has one row per candle: timestamp, OHLCV, every indicator
//! column in evaluation order, then `enter_long` and `exit_long` as 0/1. An
//! undefined indicator value is an empty cell.
//!
//! Persisted JSON carries a `schema_version` field. Unknown versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use forcelab_core::CandleSeries;

use crate::runner::{PairOutput, PairReport, PairSummary, SCHEMA_VERSION};

// ─── CSV export ─────────────────────────────────────────────────────

fn cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Export candles, indicators and signals as one CSV table.
pub fn export_table_csv(report: &PairReport, series: &CandleSeries) -> Result<String> {
    let indicators = &report.evaluation.indicators;
    let signals = &report.evaluation.signals;
    ensure!(
        signals.len() == series.len(),
        "report for '{}' has {} rows but the series has {} candles",
        report.summary.pair,
        signals.len(),
        series.len()
    );

    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["timestamp", "open", "high", "low", "close", "volume"];
    header.extend(indicators.names());
    header.extend(["enter_long", "exit_long"]);
    wtr.write_record(&header)?;

    let columns: Vec<&[f64]> = indicators.iter().map(|(_, values)| values).collect();
    for (i, c) in series.candles().iter().enumerate() {
        let mut row = Vec::with_capacity(header.len());
        row.push(c.timestamp.to_rfc3339());
        row.extend([c.open, c.high, c.low, c.close, c.volume].map(cell));
        row.extend(columns.iter().map(|values| cell(values[i])));
        row.push(flag(signals.entry_long[i]).to_string());
        row.push(flag(signals.exit_long[i]).to_string());
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `PairSummary` to pretty JSON.
pub fn export_report_json(summary: &PairSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize PairSummary to JSON")
}

/// Deserialize a `PairSummary` from JSON, rejecting unknown schema versions.
pub fn import_report_json(json: &str) -> Result<PairSummary> {
    let summary: PairSummary =
        serde_json::from_str(json).context("failed to deserialize PairSummary from JSON")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

// ─── Files ──────────────────────────────────────────────────────────

/// File-name-safe form of a pair name (`BTC/USDT` → `BTC_USDT`).
pub fn file_stem_for(pair: &str) -> String {
    pair.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write `<pair>_signals.csv` (and `<pair>_report.json` when `with_json`)
/// under `output_dir`. Returns the written paths.
pub fn save_outputs(
    output: &PairOutput,
    output_dir: &Path,
    with_json: bool,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let stem = file_stem_for(&output.report.summary.pair);
    let mut written = Vec::new();

    let csv_path = output_dir.join(format!("{stem}_signals.csv"));
    let table = export_table_csv(&output.report, &output.series)?;
    std::fs::write(&csv_path, table)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;
    written.push(csv_path);

    if with_json {
        let json_path = output_dir.join(format!("{stem}_report.json"));
        let json = export_report_json(&output.report.summary)?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("failed to write {}", json_path.display()))?;
        written.push(json_path);
    }

    Ok(written)
}
