use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Net position for one instrument.
///
/// `quantity` is signed: positive = net long, negative = net short, zero =
/// flat. `avg_entry_price` is the volume-weighted entry price of the
/// currently open lot only; it is reset to 0.0 whenever the position
/// flattens so a later, independent position never inherits a stale price.
/// Exposure checks must use `quantity != 0`, never the price field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: i64,
    pub avg_entry_price: f64,
    /// Timestamp of the fill that opened the current lot. `None` when flat.
    pub opened_at: Option<DateTime<Utc>>,
}

impl Position {
    /// A flat position for `symbol`.
    pub fn flat(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: 0,
            avg_entry_price: 0.0,
            opened_at: None,
        }
    }

    pub fn is_long(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_short(&self) -> bool {
        self.quantity < 0
    }

    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    /// Open size regardless of direction.
    pub fn open_quantity(&self) -> i64 {
        self.quantity.abs()
    }

    /// Mark-to-market PnL of the open lot at `price`, in currency units.
    pub fn unrealized_pnl(&self, price: f64, point_value: f64) -> f64 {
        (price - self.avg_entry_price) * point_value * self.quantity as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_position_has_neutral_price() {
        let pos = Position::flat("ES");
        assert!(pos.is_flat());
        assert!(!pos.is_long());
        assert!(!pos.is_short());
        assert_eq!(pos.avg_entry_price, 0.0);
        assert_eq!(pos.opened_at, None);
    }

    #[test]
    fn unrealized_pnl_long_and_short() {
        let mut pos = Position::flat("ES");
        pos.quantity = 2;
        pos.avg_entry_price = 5000.0;
        // Long 2 @ 5000, marked at 5010, $50/pt: 2 * 10 * 50
        assert_eq!(pos.unrealized_pnl(5010.0, 50.0), 1000.0);

        pos.quantity = -2;
        // Short 2 @ 5000, marked at 5010: losing
        assert_eq!(pos.unrealized_pnl(5010.0, 50.0), -1000.0);
    }

    #[test]
    fn open_quantity_is_unsigned() {
        let mut pos = Position::flat("MNQ");
        pos.quantity = -7;
        assert_eq!(pos.open_quantity(), 7);
    }
}
