//! Artifact export (CSV/JSON/markdown) for a tape run.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::report::MarkdownReportGenerator;
use crate::runner::TapeRunResult;
use fillbook_core::{CloseDirection, Position, RealizedPnl};

/// Paths of everything written by `export_run`.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub events_csv: PathBuf,
    pub events_json: PathBuf,
    pub positions_json: PathBuf,
    pub summary_json: PathBuf,
    pub report_markdown: PathBuf,
}

pub fn write_events_csv(path: &Path, events: &[RealizedPnl]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create events CSV {}", path.display()))?;

    writeln!(
        file,
        "symbol,timestamp,direction,closed_quantity,entry_price,exit_price,pnl"
    )?;

    for event in events {
        let direction = match event.direction {
            CloseDirection::SellToCloseLong => "SellToCloseLong",
            CloseDirection::BuyToCoverShort => "BuyToCoverShort",
        };
        writeln!(
            file,
            "{},{},{},{},{:.4},{:.4},{:.4}",
            event.symbol,
            event.timestamp.to_rfc3339(),
            direction,
            event.closed_quantity,
            event.entry_price,
            event.exit_price,
            event.pnl,
        )?;
    }

    Ok(())
}

pub fn write_events_json(path: &Path, events: &[RealizedPnl]) -> Result<()> {
    let json = serde_json::to_string_pretty(events).context("Failed to serialize events")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write events JSON {}", path.display()))?;
    Ok(())
}

pub fn write_positions_json(path: &Path, positions: &[&Position]) -> Result<()> {
    let json = serde_json::to_string_pretty(positions).context("Failed to serialize positions")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write positions JSON {}", path.display()))?;
    Ok(())
}

/// Write all artifacts for a run into `output_dir` (created if missing):
/// events.csv, events.json, positions.json, summary.json, report.md.
pub fn export_run(output_dir: impl AsRef<Path>, result: &TapeRunResult) -> Result<ArtifactPaths> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output dir {}", dir.display()))?;

    let paths = ArtifactPaths {
        events_csv: dir.join("events.csv"),
        events_json: dir.join("events.json"),
        positions_json: dir.join("positions.json"),
        summary_json: dir.join("summary.json"),
        report_markdown: dir.join("report.md"),
    };

    write_events_csv(&paths.events_csv, &result.events)?;
    write_events_json(&paths.events_json, &result.events)?;

    let open: Vec<&Position> = result.open_positions().collect();
    write_positions_json(&paths.positions_json, &open)?;

    let summary = serde_json::to_string_pretty(&result.summary)
        .context("Failed to serialize summary")?;
    std::fs::write(&paths.summary_json, summary)
        .with_context(|| format!("Failed to write {}", paths.summary_json.display()))?;

    let report = MarkdownReportGenerator.generate(result);
    std::fs::write(&paths.report_markdown, report)
        .with_context(|| format!("Failed to write {}", paths.report_markdown.display()))?;

    Ok(paths)
}
