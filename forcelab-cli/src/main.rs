//! ForceLab CLI: evaluate candle files, inspect rules, print configuration.
//!
//! Commands:
//! - `signals`: evaluate one or more CSV files (one pair each) and write signal tables
//! - `inspect`: rule-by-rule breakdown at one candle
//! - `config`: print the default (or a loaded) configuration as TOML

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use forcelab_core::engine::minimum_history;
use forcelab_core::evaluate;
use forcelab_core::signals::{RuleOutcome, SignalCombinator};
use forcelab_runner::{
    evaluate_files, load_candles_csv, load_config_or_default, pair_from_path, save_outputs,
};

#[derive(Parser, Debug)]
#[command(
    name = "forcelab",
    version,
    about = "ForceLab CLI: stochastic/MACD/EMA entry and exit signals over candle files"
)]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate candle CSV files and write `<pair>_signals.csv` for each.
    Signals {
        /// Candle files (header: timestamp,open,high,low,close,volume). Pair = file stem.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for signal tables.
        #[arg(long, default_value = "signals")]
        output_dir: PathBuf,

        /// Also write `<pair>_report.json` summaries.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show every entry and exit rule at one candle index.
    Inspect {
        /// Candle file.
        file: PathBuf,

        /// Candle index (0-based).
        #[arg(long)]
        index: usize,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the diagnosis as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the configuration as TOML (defaults unless --file is given).
    Config {
        /// Config file to validate and print in full.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Commands::Signals {
            files,
            config,
            output_dir,
            json,
        } => run_signals(&files, config.as_deref(), &output_dir, json).map(|failed| {
            if failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }),
        Commands::Inspect {
            file,
            index,
            config,
            json,
        } => run_inspect(&file, index, config.as_deref(), json).map(|()| ExitCode::SUCCESS),
        Commands::Config { file } => run_config(file.as_deref()).map(|()| ExitCode::SUCCESS),
    }
}

/// Logs go to stderr so stdout stays clean for command output.
///
/// Level comes from `RUST_LOG`, defaulting to `info`.
fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

/// Returns the number of pairs that failed to load or evaluate.
fn run_signals(
    files: &[PathBuf],
    config_path: Option<&Path>,
    output_dir: &Path,
    json: bool,
) -> Result<usize> {
    let config = load_config_or_default(config_path)?;
    let results = evaluate_files(files, &config);

    println!(
        "{:<20} {:>8} {:>8} {:>8} {:>10}",
        "pair", "candles", "entries", "exits", "history"
    );
    let mut failed = 0;
    for outcome in &results {
        let pair = &outcome.pair;
        match &outcome.result {
            Ok(output) => {
                let s = &output.report.summary;
                println!(
                    "{:<20} {:>8} {:>8} {:>8} {:>10}",
                    pair,
                    s.candle_count,
                    s.entry_count,
                    s.exit_count,
                    if s.sufficient_history { "ok" } else { "short" }
                );
                match save_outputs(output, output_dir, json) {
                    Ok(written) => {
                        for path in written {
                            tracing::debug!(pair = %pair, path = %path.display(), "wrote");
                        }
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("Error writing outputs for {pair}: {e:#}");
                    }
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error for {pair} ({}): {e}", outcome.path.display());
            }
        }
    }

    println!("Signal tables written to: {}", output_dir.display());
    if failed > 0 {
        eprintln!("{failed} of {} pairs failed", results.len());
    }
    Ok(failed)
}

fn run_inspect(file: &Path, index: usize, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config_or_default(config_path)?;
    let pair = pair_from_path(file);
    let series = load_candles_csv(file, &pair)?;
    if index >= series.len() {
        bail!(
            "index {index} is out of range ({} candles in {})",
            series.len(),
            file.display()
        );
    }

    let evaluation = evaluate(&series, &config)?;
    let combinator = SignalCombinator::new(&config);
    let diagnosis = combinator.diagnose(&series, &evaluation.indicators, index);

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        return Ok(());
    }

    // Bounds-checked above.
    let candle = series.candles()[index];
    println!("{pair} @ {index} ({})", candle.timestamp);
    println!(
        "  open {}  high {}  low {}  close {}  volume {}",
        candle.open, candle.high, candle.low, candle.close, candle.volume
    );
    if !diagnosis.sufficient_history {
        println!(
            "  insufficient history: {} candles, warm-up {}",
            series.len(),
            config.warmup
        );
    }

    println!("Indicators:");
    for (name, _) in evaluation.indicators.iter() {
        let shown = evaluation
            .indicators
            .value(name, index)
            .map(|v| format!("{v:.6}"))
            .unwrap_or_else(|| "undefined".into());
        println!("  {name:<24} {shown}");
    }

    print_rules("Entry", &diagnosis.entry, diagnosis.entry_long());
    print_rules("Exit", &diagnosis.exit, diagnosis.exit_long());
    Ok(())
}

fn print_rules(label: &str, outcomes: &[RuleOutcome], result: bool) {
    println!("{label}: {}", if result { "TRUE" } else { "false" });
    for o in outcomes {
        println!(
            "  [{}] {}",
            if o.passed { "pass" } else { "FAIL" },
            o.rule.name()
        );
    }
}

fn run_config(file: Option<&Path>) -> Result<()> {
    let config = load_config_or_default(file)?;
    print!("{}", config.to_toml_string()?);
    println!();
    println!("# fingerprint: {}", config.fingerprint());
    println!("# minimum history: {}", minimum_history(&config));
    Ok(())
}
