//! Position ledger: reconstructs per-instrument positions and realized PnL
//! from a chronological tape of fills.
//!
//! The state machine distinguishes four outcomes per fill:
//! - open / scale-in (same direction as the position, or flat): the entry
//!   price is re-averaged volume-weighted, no PnL is realized
//! - partial close: part of the open lot is consumed at the fill price
//! - full close: the lot is consumed exactly, the position flattens and the
//!   average price resets
//! - flip: the fill overshoots the open lot; the overshoot becomes a fresh
//!   lot in the opposite direction, priced at the flipping fill
//!
//! Applying a fill is all-or-nothing: every validation runs before any
//! state is touched, and a rejected fill leaves the ledger byte-identical.

use crate::config::Instruments;
use crate::domain::{CloseDirection, Fill, FillId, Position, RealizedPnl, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Rejections surfaced by the ledger. Malformed input and missing
/// configuration are errors; "nothing to close" is not (that is the
/// ordinary `Ok(None)` outcome of an opening or scale-in fill).
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("fill {id} for '{symbol}': quantity must be > 0, got {quantity}")]
    NonPositiveQuantity {
        id: FillId,
        symbol: String,
        quantity: i64,
    },

    #[error("fill {id} for '{symbol}': price must be positive and finite, got {price}")]
    InvalidPrice { id: FillId, symbol: String, price: f64 },

    #[error("no point value configured for instrument '{symbol}' (fill {id})")]
    UnconfiguredInstrument { id: FillId, symbol: String },

    #[error(
        "fill {id} for '{symbol}' at {timestamp} precedes last applied fill at {last_applied}"
    )]
    OutOfOrder {
        id: FillId,
        symbol: String,
        timestamp: DateTime<Utc>,
        last_applied: DateTime<Utc>,
    },
}

fn validate_fill(fill: &Fill) -> Result<(), LedgerError> {
    if fill.quantity <= 0 {
        return Err(LedgerError::NonPositiveQuantity {
            id: fill.id.clone(),
            symbol: fill.symbol.clone(),
            quantity: fill.quantity,
        });
    }
    if !(fill.price > 0.0 && fill.price.is_finite()) {
        return Err(LedgerError::InvalidPrice {
            id: fill.id.clone(),
            symbol: fill.symbol.clone(),
            price: fill.price,
        });
    }
    Ok(())
}

/// Apply one fill to a position, returning the updated position and the
/// realized-PnL event if the fill closed existing exposure.
///
/// Pure: the input position is untouched, and the same inputs always
/// produce the same outputs. `point_value` must be positive, which the
/// config layer guarantees for every registered instrument.
pub fn apply_fill(
    position: &Position,
    fill: &Fill,
    point_value: f64,
) -> Result<(Position, Option<RealizedPnl>), LedgerError> {
    validate_fill(fill)?;

    let pos = position.quantity;
    let same_direction = pos == 0 || (pos > 0) == fill.side.is_buy();

    if same_direction {
        // Opening or scale-in: re-average, never realize.
        let open = pos.abs();
        let avg = if open == 0 {
            fill.price
        } else {
            (position.avg_entry_price * open as f64 + fill.price * fill.quantity as f64)
                / (open + fill.quantity) as f64
        };
        let updated = Position {
            symbol: position.symbol.clone(),
            quantity: pos + fill.side.signed(fill.quantity),
            avg_entry_price: avg,
            opened_at: position.opened_at.or(Some(fill.timestamp)),
        };
        return Ok((updated, None));
    }

    // Opposite direction: closing, covering, or flipping.
    let open = pos.abs();
    let close_qty = fill.quantity.min(open);
    let direction = if pos > 0 {
        CloseDirection::SellToCloseLong
    } else {
        CloseDirection::BuyToCoverShort
    };
    let points = match direction {
        CloseDirection::SellToCloseLong => fill.price - position.avg_entry_price,
        CloseDirection::BuyToCoverShort => position.avg_entry_price - fill.price,
    };
    let event = RealizedPnl {
        symbol: position.symbol.clone(),
        direction,
        closed_quantity: close_qty,
        entry_price: position.avg_entry_price,
        exit_price: fill.price,
        pnl: points * point_value * close_qty as f64,
        timestamp: fill.timestamp,
    };

    let remainder = fill.quantity - close_qty;
    let left = open - close_qty;
    let updated = if remainder > 0 {
        // Flip: the prior lot's economics are fully realized in `event`,
        // so the new lot is priced at the flipping fill, not blended.
        Position {
            symbol: position.symbol.clone(),
            quantity: fill.side.signed(remainder),
            avg_entry_price: fill.price,
            opened_at: Some(fill.timestamp),
        }
    } else if left == 0 {
        Position::flat(position.symbol.clone())
    } else {
        // Partial close: same sign, same average, smaller size.
        Position {
            symbol: position.symbol.clone(),
            quantity: if pos > 0 { left } else { -left },
            avg_entry_price: position.avg_entry_price,
            opened_at: position.opened_at,
        }
    };

    Ok((updated, Some(event)))
}

/// Mutable per-instrument position state, owned by one consumer.
///
/// Holds one `Position` per symbol (created lazily, flat) plus the
/// last-applied timestamp per symbol for the ordering guard. Callers in
/// concurrent contexts must serialize access per instrument; across
/// instruments, independent ledgers may run in parallel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionLedger {
    positions: BTreeMap<Symbol, Position>,
    last_applied: BTreeMap<Symbol, DateTime<Utc>>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one fill, resolving its point value from `instruments`.
    ///
    /// Validation (quantity, price, configuration, ordering) runs before
    /// any mutation; a rejected fill leaves the ledger unchanged.
    pub fn apply(
        &mut self,
        fill: &Fill,
        instruments: &Instruments,
    ) -> Result<Option<RealizedPnl>, LedgerError> {
        validate_fill(fill)?;

        let point_value = instruments.point_value(&fill.symbol).ok_or_else(|| {
            LedgerError::UnconfiguredInstrument {
                id: fill.id.clone(),
                symbol: fill.symbol.clone(),
            }
        })?;

        if let Some(&last) = self.last_applied.get(&fill.symbol) {
            if fill.timestamp < last {
                return Err(LedgerError::OutOfOrder {
                    id: fill.id.clone(),
                    symbol: fill.symbol.clone(),
                    timestamp: fill.timestamp,
                    last_applied: last,
                });
            }
        }

        let current = self
            .positions
            .get(&fill.symbol)
            .cloned()
            .unwrap_or_else(|| Position::flat(fill.symbol.clone()));
        let (updated, event) = apply_fill(&current, fill, point_value)?;

        self.positions.insert(fill.symbol.clone(), updated);
        self.last_applied.insert(fill.symbol.clone(), fill.timestamp);
        Ok(event)
    }

    /// Position for `symbol`, if any fill has been applied for it.
    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// All tracked positions, flat ones included, in symbol order.
    pub fn positions(&self) -> &BTreeMap<Symbol, Position> {
        &self.positions
    }

    /// Positions with open exposure, in symbol order.
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values().filter(|pos| !pos.is_flat())
    }

    pub fn has_exposure(&self, symbol: &str) -> bool {
        self.positions.get(symbol).is_some_and(|pos| !pos.is_flat())
    }

    /// Consume the ledger, keeping only the position map.
    pub fn into_positions(self) -> BTreeMap<Symbol, Position> {
        self.positions
    }
}

/// Result of folding a whole tape through the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapeResult {
    pub positions: BTreeMap<Symbol, Position>,
    pub events: Vec<RealizedPnl>,
    pub total_pnl: f64,
}

/// Fold an ordered tape of fills into final positions, all realized-PnL
/// events in emission order, and their summed PnL.
///
/// A pure fold: re-running over the same input produces identical output.
/// The first invalid fill aborts the run with its error.
pub fn process_tape(fills: &[Fill], instruments: &Instruments) -> Result<TapeResult, LedgerError> {
    let mut ledger = PositionLedger::new();
    let mut events = Vec::new();
    let mut total_pnl = 0.0;

    for fill in fills {
        if let Some(event) = ledger.apply(fill, instruments)? {
            total_pnl += event.pnl;
            events.push(event);
        }
    }

    Ok(TapeResult {
        positions: ledger.into_positions(),
        events,
        total_pnl,
    })
}
