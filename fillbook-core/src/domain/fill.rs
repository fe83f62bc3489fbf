use crate::domain::ids::FillId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Executed trade direction.
///
/// Decided once at the system boundary (tape loader / signal normalizer);
/// the ledger only ever sees this two-valued enum, never raw broker strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy-type execution (opens or adds to a long, reduces or flips a short).
    #[serde(alias = "BUY", alias = "Buy", alias = "B", alias = "b", alias = "long")]
    Buy,
    /// Sell-type execution (opens or adds to a short, reduces or flips a long).
    #[serde(alias = "SELL", alias = "Sell", alias = "S", alias = "s", alias = "short")]
    Sell,
}

impl Side {
    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    /// Sign for position arithmetic: +1 for buys, -1 for sells.
    pub fn sign(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }

    /// Quantity with this side's sign applied.
    pub fn signed(&self, quantity: i64) -> i64 {
        self.sign() * quantity
    }
}

/// Fill record: a broker's report that an order (or part of one) executed.
///
/// `quantity` is always positive; direction lives in `side`. Timestamps are
/// non-decreasing per symbol in a well-formed tape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub id: FillId,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    pub quantity: i64,
    pub price: f64,
}
