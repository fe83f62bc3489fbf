//! Fillbook CLI: realized-PnL reports from fill tapes.
//!
//! Commands:
//! - `report` runs a tape (CSV/JSONL or synthetic) through the ledger and
//!   prints a markdown PnL report, optionally exporting artifacts
//! - `check` validates a tape without running it: duplicate ids, ordering
//!   violations, malformed fills, unconfigured symbols

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use fillbook_core::{Fill, Instruments};
use fillbook_runner::export::export_run;
use fillbook_runner::runner::{run_tape, run_tape_partitioned};
use fillbook_runner::synthetic::synthetic_tape;
use fillbook_runner::tape::load_tape;
use fillbook_runner::MarkdownReportGenerator;

#[derive(Parser)]
#[command(name = "fillbook", about = "Fillbook CLI: position and realized-PnL reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a fill tape through the position ledger and print a PnL report.
    Report {
        /// Path to a fill tape (.csv or .jsonl).
        #[arg(long, conflicts_with = "synthetic")]
        fills: Option<PathBuf>,

        /// Path to the instrument config TOML.
        #[arg(long)]
        instruments: PathBuf,

        /// Generate a synthetic tape instead of loading one.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Seed for the synthetic tape.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Fills per symbol for the synthetic tape.
        #[arg(long, default_value_t = 200)]
        fills_per_symbol: usize,

        /// Process instruments in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Output directory for artifacts (events, positions, report).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the summary as JSON instead of markdown.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Validate a fill tape without applying it.
    Check {
        /// Path to a fill tape (.csv or .jsonl).
        #[arg(long)]
        fills: PathBuf,

        /// Path to the instrument config TOML.
        #[arg(long)]
        instruments: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            fills,
            instruments,
            synthetic,
            seed,
            fills_per_symbol,
            parallel,
            output,
            json,
        } => report(
            fills,
            &instruments,
            synthetic,
            seed,
            fills_per_symbol,
            parallel,
            output,
            json,
        ),
        Commands::Check { fills, instruments } => check(&fills, &instruments),
    }
}

fn load_instruments(path: &Path) -> Result<Instruments> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read instrument config {}", path.display()))?;
    Instruments::from_toml_str(&raw)
        .with_context(|| format!("Invalid instrument config {}", path.display()))
}

#[allow(clippy::too_many_arguments)]
fn report(
    fills_path: Option<PathBuf>,
    instruments_path: &Path,
    synthetic: bool,
    seed: u64,
    fills_per_symbol: usize,
    parallel: bool,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let instruments = load_instruments(instruments_path)?;

    let fills: Vec<Fill> = if synthetic {
        let symbols: Vec<&str> = instruments.symbols().collect();
        eprintln!(
            "Generating synthetic tape: {} symbols x {} fills (seed {})",
            symbols.len(),
            fills_per_symbol,
            seed
        );
        synthetic_tape(&symbols, fills_per_symbol, seed)
    } else {
        let path = match fills_path {
            Some(path) => path,
            None => bail!("either --fills <path> or --synthetic is required"),
        };
        let loaded = load_tape(&path)?;
        if loaded.duplicates_dropped > 0 {
            eprintln!(
                "Dropped {} duplicate fill id(s) from {}",
                loaded.duplicates_dropped,
                path.display()
            );
        }
        loaded.fills
    };

    let result = if parallel {
        run_tape_partitioned(&fills, &instruments)?
    } else {
        run_tape(&fills, &instruments)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result.summary)?);
    } else {
        print!("{}", MarkdownReportGenerator.generate(&result));
    }

    if let Some(dir) = output {
        let paths = export_run(&dir, &result)?;
        eprintln!("Artifacts written to {}", dir.display());
        eprintln!("  report: {}", paths.report_markdown.display());
    }

    Ok(())
}

fn check(fills_path: &Path, instruments_path: &Path) -> Result<()> {
    let instruments = load_instruments(instruments_path)?;
    let loaded = load_tape(fills_path)?;

    let mut problems = 0usize;
    if loaded.duplicates_dropped > 0 {
        problems += loaded.duplicates_dropped;
        println!("duplicate ids: {} dropped (first kept)", loaded.duplicates_dropped);
    }

    let mut last_ts: HashMap<&str, chrono::DateTime<chrono::Utc>> = HashMap::new();
    let mut unconfigured: HashSet<&str> = HashSet::new();

    for fill in &loaded.fills {
        if fill.quantity <= 0 {
            problems += 1;
            println!("fill {}: non-positive quantity {}", fill.id, fill.quantity);
        }
        if !(fill.price > 0.0 && fill.price.is_finite()) {
            problems += 1;
            println!("fill {}: invalid price {}", fill.id, fill.price);
        }
        if !instruments.contains(&fill.symbol) && unconfigured.insert(fill.symbol.as_str()) {
            problems += 1;
            println!("instrument '{}': no point value configured", fill.symbol);
        }
        if let Some(&last) = last_ts.get(fill.symbol.as_str()) {
            if fill.timestamp < last {
                problems += 1;
                println!(
                    "fill {}: out of order for '{}' ({} < {})",
                    fill.id, fill.symbol, fill.timestamp, last
                );
            }
        }
        last_ts.insert(fill.symbol.as_str(), fill.timestamp);
    }

    println!(
        "checked {} fill(s) across {} instrument(s)",
        loaded.fills.len(),
        last_ts.len()
    );

    if problems > 0 {
        bail!("tape check failed: {problems} problem(s)");
    }
    println!("tape OK");
    Ok(())
}
