//! RealizedPnl: profit or loss locked in by a closing fill.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of closing produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseDirection {
    /// A sell fill reduced or closed a long position.
    SellToCloseLong,
    /// A buy fill reduced or covered a short position.
    BuyToCoverShort,
}

/// One realized-PnL event, emitted when a fill closes all or part of an
/// open position.
///
/// `closed_quantity` is the portion of the fill that consumed existing
/// exposure; on a flip it is the prior open size, not the full fill size.
/// `timestamp` is the closing fill's timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedPnl {
    pub symbol: String,
    pub direction: CloseDirection,
    pub closed_quantity: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub timestamp: DateTime<Utc>,
}

impl RealizedPnl {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// Price movement captured per unit, before the point-value scaling.
    pub fn points_captured(&self) -> f64 {
        match self.direction {
            CloseDirection::SellToCloseLong => self.exit_price - self.entry_price,
            CloseDirection::BuyToCoverShort => self.entry_price - self.exit_price,
        }
    }
}
