//! PnL summary metrics: pure functions that compute statistics over
//! realized-PnL events.
//!
//! Every metric is a pure function: event slice in, scalar out. No
//! dependencies on the tape layer or the ledger.

use fillbook_core::RealizedPnl;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate statistics for one run (all instruments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlSummary {
    pub total_pnl: f64,
    pub event_count: usize,
    pub winners: usize,
    pub losers: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl PnlSummary {
    /// Compute all metrics from an event list.
    pub fn compute(events: &[RealizedPnl]) -> Self {
        Self {
            total_pnl: total_pnl(events),
            event_count: events.len(),
            winners: events.iter().filter(|e| e.is_winner()).count(),
            losers: events.iter().filter(|e| !e.is_winner()).count(),
            win_rate: win_rate(events),
            profit_factor: profit_factor(events),
            gross_profit: gross_profit(events),
            gross_loss: gross_loss(events),
            largest_win: largest_win(events),
            largest_loss: largest_loss(events),
        }
    }
}

/// Per-instrument statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub symbol: String,
    pub event_count: usize,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

/// Group events by symbol and summarize each group, in symbol order.
pub fn per_instrument(events: &[RealizedPnl]) -> BTreeMap<String, InstrumentSummary> {
    let mut grouped: BTreeMap<String, Vec<&RealizedPnl>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.symbol.clone()).or_default().push(event);
    }

    grouped
        .into_iter()
        .map(|(symbol, group)| {
            let owned: Vec<RealizedPnl> = group.into_iter().cloned().collect();
            let summary = InstrumentSummary {
                symbol: symbol.clone(),
                event_count: owned.len(),
                total_pnl: total_pnl(&owned),
                win_rate: win_rate(&owned),
                largest_win: largest_win(&owned),
                largest_loss: largest_loss(&owned),
            };
            (symbol, summary)
        })
        .collect()
}

/// Sum of event PnLs.
pub fn total_pnl(events: &[RealizedPnl]) -> f64 {
    events.iter().map(|e| e.pnl).sum()
}

/// Fraction of events with positive PnL. 0.0 for an empty list.
pub fn win_rate(events: &[RealizedPnl]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    events.iter().filter(|e| e.is_winner()).count() as f64 / events.len() as f64
}

/// Gross profit over gross loss. Returns infinity when there are profits
/// but no losses, and 0.0 when there are no profits.
pub fn profit_factor(events: &[RealizedPnl]) -> f64 {
    let profit = gross_profit(events);
    let loss = gross_loss(events);
    if loss < 1e-12 {
        if profit > 0.0 {
            return f64::INFINITY;
        }
        return 0.0;
    }
    profit / loss
}

/// Sum of winning event PnLs.
pub fn gross_profit(events: &[RealizedPnl]) -> f64 {
    events.iter().filter(|e| e.pnl > 0.0).map(|e| e.pnl).sum()
}

/// Absolute sum of losing event PnLs.
pub fn gross_loss(events: &[RealizedPnl]) -> f64 {
    events.iter().filter(|e| e.pnl < 0.0).map(|e| -e.pnl).sum()
}

/// Largest single-event profit, 0.0 if none.
pub fn largest_win(events: &[RealizedPnl]) -> f64 {
    events.iter().map(|e| e.pnl).fold(0.0, f64::max)
}

/// Largest single-event loss as a negative number, 0.0 if none.
pub fn largest_loss(events: &[RealizedPnl]) -> f64 {
    events.iter().map(|e| e.pnl).fold(0.0, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fillbook_core::CloseDirection;

    fn event(symbol: &str, pnl: f64) -> RealizedPnl {
        RealizedPnl {
            symbol: symbol.into(),
            direction: CloseDirection::SellToCloseLong,
            closed_quantity: 1,
            entry_price: 100.0,
            exit_price: 100.0 + pnl,
            pnl,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap(),
        }
    }

    #[test]
    fn summary_over_mixed_events() {
        let events = vec![
            event("MNQ", 40.0),
            event("MNQ", -10.0),
            event("ES", 500.0),
            event("ES", -30.0),
        ];
        let summary = PnlSummary::compute(&events);
        assert_eq!(summary.event_count, 4);
        assert_eq!(summary.winners, 2);
        assert_eq!(summary.losers, 2);
        assert!((summary.total_pnl - 500.0).abs() < 1e-12);
        assert!((summary.win_rate - 0.5).abs() < 1e-12);
        assert!((summary.gross_profit - 540.0).abs() < 1e-12);
        assert!((summary.gross_loss - 40.0).abs() < 1e-12);
        assert!((summary.profit_factor - 13.5).abs() < 1e-12);
        assert_eq!(summary.largest_win, 500.0);
        assert_eq!(summary.largest_loss, -30.0);
    }

    #[test]
    fn empty_events_are_all_zero() {
        let summary = PnlSummary::compute(&[]);
        assert_eq!(summary.total_pnl, 0.0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.profit_factor, 0.0);
        assert_eq!(summary.largest_win, 0.0);
        assert_eq!(summary.largest_loss, 0.0);
    }

    #[test]
    fn profit_factor_with_no_losses_is_infinite() {
        let events = vec![event("MNQ", 10.0)];
        assert!(profit_factor(&events).is_infinite());
    }

    #[test]
    fn per_instrument_groups_by_symbol() {
        let events = vec![event("MNQ", 40.0), event("ES", -30.0), event("MNQ", -10.0)];
        let grouped = per_instrument(&events);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["MNQ"].event_count, 2);
        assert!((grouped["MNQ"].total_pnl - 30.0).abs() < 1e-12);
        assert_eq!(grouped["ES"].event_count, 1);
        // BTreeMap: symbols come out sorted
        let symbols: Vec<&String> = grouped.keys().collect();
        assert_eq!(symbols, vec!["ES", "MNQ"]);
    }
}
