//! Tape loading: the fill-source boundary.
//!
//! A tape is an ordered sequence of fills, supplied as CSV or JSONL.
//! The loader normalizes broker spellings into the `Side` enum, drops
//! duplicate fill ids (keeping the first occurrence, so replayed or
//! overlapping fetch windows cannot double-count), and preserves input
//! order. It never re-sorts: ordering stays the ledger's check.

use fillbook_core::{Fill, FillId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors from the tape loading layer.
#[derive(Debug, Error)]
pub enum TapeError {
    #[error("failed to read tape '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bad CSV row in '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("bad JSON on line {line} of '{path}': {source}")]
    Json {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("tape '{path}' has unrecognized extension (expected .csv or .jsonl)")]
    UnknownFormat { path: String },

    #[error("tape '{path}' contains no fills")]
    EmptyTape { path: String },
}

/// Where a tape came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapeSource {
    Csv,
    Jsonl,
    Synthetic,
}

/// A loaded tape plus load provenance.
#[derive(Debug, Clone)]
pub struct LoadedTape {
    pub fills: Vec<Fill>,
    pub source: TapeSource,
    /// Duplicate fill ids dropped during load (first occurrence kept).
    pub duplicates_dropped: usize,
}

/// Load a tape, choosing the format from the file extension.
pub fn load_tape(path: &Path) -> Result<LoadedTape, TapeError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => load_tape_csv(path),
        Some("jsonl") | Some("ndjson") => load_tape_jsonl(path),
        _ => Err(TapeError::UnknownFormat { path: display(path) }),
    }
}

/// Load a CSV tape with header `id,timestamp,symbol,side,quantity,price`.
pub fn load_tape_csv(path: &Path) -> Result<LoadedTape, TapeError> {
    let file = File::open(path).map_err(|source| TapeError::Io {
        path: display(path),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut fills = Vec::new();
    for row in reader.deserialize::<Fill>() {
        let fill = row.map_err(|source| TapeError::Csv {
            path: display(path),
            source,
        })?;
        fills.push(fill);
    }

    finish(fills, TapeSource::Csv, path)
}

/// Load a JSONL tape: one `Fill` object per line, blank lines skipped.
pub fn load_tape_jsonl(path: &Path) -> Result<LoadedTape, TapeError> {
    let file = File::open(path).map_err(|source| TapeError::Io {
        path: display(path),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut fills = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| TapeError::Io {
            path: display(path),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let fill: Fill = serde_json::from_str(&line).map_err(|source| TapeError::Json {
            path: display(path),
            line: i + 1,
            source,
        })?;
        fills.push(fill);
    }

    finish(fills, TapeSource::Jsonl, path)
}

fn finish(fills: Vec<Fill>, source: TapeSource, path: &Path) -> Result<LoadedTape, TapeError> {
    if fills.is_empty() {
        return Err(TapeError::EmptyTape { path: display(path) });
    }
    let (fills, duplicates_dropped) = dedup_by_fill_id(fills);
    Ok(LoadedTape { fills, source, duplicates_dropped })
}

/// Drop fills whose id was already seen, keeping the first occurrence.
pub fn dedup_by_fill_id(fills: Vec<Fill>) -> (Vec<Fill>, usize) {
    let mut seen: HashSet<FillId> = HashSet::with_capacity(fills.len());
    let before = fills.len();
    let deduped: Vec<Fill> = fills
        .into_iter()
        .filter(|fill| seen.insert(fill.id.clone()))
        .collect();
    let dropped = before - deduped.len();
    (deduped, dropped)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
