//! Run orchestration: fold a tape through the ledger and assemble a
//! reportable result.
//!
//! Two paths produce the same accounting:
//! - `run_tape`: the sequential fold, events in emission order
//! - `run_tape_partitioned`: per-instrument parallel fold (instruments are
//!   fully independent), merged deterministically

use fillbook_core::ledger::{process_tape, TapeResult};
use fillbook_core::{Fill, Instruments, LedgerError, Position, RealizedPnl, ReportId, Symbol};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::summary::{per_instrument, InstrumentSummary, PnlSummary};

/// Errors from a tape run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("tape is empty")]
    EmptyTape,
}

/// Complete result of one tape run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapeRunResult {
    /// Content-addressed identity of (tape, config).
    pub report_id: String,
    pub positions: BTreeMap<Symbol, Position>,
    pub events: Vec<RealizedPnl>,
    pub total_pnl: f64,
    pub summary: PnlSummary,
    pub per_instrument: BTreeMap<String, InstrumentSummary>,
}

impl TapeRunResult {
    fn assemble(result: TapeResult, report_id: String) -> Self {
        let summary = PnlSummary::compute(&result.events);
        let per_instrument = per_instrument(&result.events);
        Self {
            report_id,
            positions: result.positions,
            events: result.events,
            total_pnl: result.total_pnl,
            summary,
            per_instrument,
        }
    }

    /// Open positions in symbol order.
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values().filter(|pos| !pos.is_flat())
    }
}

/// Sequential run: the reference fold over the whole tape in input order.
pub fn run_tape(fills: &[Fill], instruments: &Instruments) -> Result<TapeRunResult, RunError> {
    if fills.is_empty() {
        return Err(RunError::EmptyTape);
    }
    let report_id = ReportId::new(fills, instruments).hash();
    let result = process_tape(fills, instruments)?;
    Ok(TapeRunResult::assemble(result, report_id))
}

/// Parallel run: partition by symbol (preserving within-symbol order),
/// fold each partition on its own rayon task, then merge.
///
/// Merged events are ordered by (timestamp, symbol) with a stable sort, so
/// within-symbol emission order is preserved and the merge is
/// deterministic. Final positions, total PnL, and the event multiset are
/// identical to `run_tape`; only the cross-symbol interleaving of
/// same-timestamp events may differ.
pub fn run_tape_partitioned(
    fills: &[Fill],
    instruments: &Instruments,
) -> Result<TapeRunResult, RunError> {
    if fills.is_empty() {
        return Err(RunError::EmptyTape);
    }
    let report_id = ReportId::new(fills, instruments).hash();

    let mut partitions: BTreeMap<Symbol, Vec<Fill>> = BTreeMap::new();
    for fill in fills {
        partitions.entry(fill.symbol.clone()).or_default().push(fill.clone());
    }

    let partitioned: Vec<(Symbol, Vec<Fill>)> = partitions.into_iter().collect();
    let results: Result<Vec<TapeResult>, LedgerError> = partitioned
        .par_iter()
        .map(|(_, symbol_fills)| process_tape(symbol_fills, instruments))
        .collect();
    let results = results?;

    let mut positions = BTreeMap::new();
    let mut events = Vec::new();
    let mut total_pnl = 0.0;
    for result in results {
        positions.extend(result.positions);
        total_pnl += result.total_pnl;
        events.extend(result.events);
    }
    events.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    Ok(TapeRunResult::assemble(
        TapeResult { positions, events, total_pnl },
        report_id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fillbook_core::{FillId, Side};

    fn fill(n: u64, symbol: &str, side: Side, quantity: i64, price: f64, second: u32) -> Fill {
        Fill {
            id: FillId::from(n),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, second).unwrap(),
            symbol: symbol.into(),
            side,
            quantity,
            price,
        }
    }

    fn config() -> Instruments {
        Instruments::new()
            .with_instrument("MNQ", 2.0)
            .unwrap()
            .with_instrument("ES", 50.0)
            .unwrap()
    }

    fn sample_tape() -> Vec<Fill> {
        vec![
            fill(1, "MNQ", Side::Buy, 2, 100.0, 0),
            fill(2, "ES", Side::Sell, 1, 5000.0, 1),
            fill(3, "MNQ", Side::Sell, 5, 110.0, 2),
            fill(4, "ES", Side::Buy, 1, 4990.0, 3),
            fill(5, "MNQ", Side::Buy, 3, 108.0, 4),
        ]
    }

    #[test]
    fn sequential_run_produces_summary_and_positions() {
        let result = run_tape(&sample_tape(), &config()).unwrap();
        // MNQ close: 10 pts * $2 * 2 = 40; flip short 3 @ 110, then cover
        // 3 @ 108: 2 pts * $2 * 3 = 12; ES: 10 pts * $50 = 500.
        assert_eq!(result.events.len(), 3);
        assert!((result.total_pnl - 552.0).abs() < 1e-9);
        assert_eq!(result.summary.event_count, 3);
        assert!(result.positions["MNQ"].is_flat());
        assert!(result.positions["ES"].is_flat());
        assert_eq!(result.per_instrument.len(), 2);
    }

    #[test]
    fn empty_tape_is_an_error() {
        assert!(matches!(run_tape(&[], &config()), Err(RunError::EmptyTape)));
        assert!(matches!(
            run_tape_partitioned(&[], &config()),
            Err(RunError::EmptyTape)
        ));
    }

    #[test]
    fn partitioned_run_matches_sequential_accounting() {
        let sequential = run_tape(&sample_tape(), &config()).unwrap();
        let partitioned = run_tape_partitioned(&sample_tape(), &config()).unwrap();

        assert_eq!(sequential.report_id, partitioned.report_id);
        assert_eq!(sequential.positions, partitioned.positions);
        assert!((sequential.total_pnl - partitioned.total_pnl).abs() < 1e-9);
        assert_eq!(sequential.events.len(), partitioned.events.len());
        assert_eq!(sequential.summary, partitioned.summary);

        // Same multiset of events: compare after sorting both the same way.
        let mut a = sequential.events.clone();
        let mut b = partitioned.events.clone();
        let key = |e: &RealizedPnl| (e.timestamp, e.symbol.clone());
        a.sort_by_key(key);
        b.sort_by_key(key);
        assert_eq!(a, b);
    }

    #[test]
    fn ledger_errors_propagate_from_both_paths() {
        let tape = vec![fill(1, "CL", Side::Buy, 1, 80.0, 0)];
        assert!(matches!(
            run_tape(&tape, &config()),
            Err(RunError::Ledger(LedgerError::UnconfiguredInstrument { .. }))
        ));
        assert!(matches!(
            run_tape_partitioned(&tape, &config()),
            Err(RunError::Ledger(LedgerError::UnconfiguredInstrument { .. }))
        ));
    }
}
