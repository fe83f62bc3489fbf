//! Domain types for Fillbook.

pub mod fill;
pub mod ids;
pub mod pnl;
pub mod position;

pub use fill::{Fill, Side};
pub use ids::FillId;
pub use pnl::{CloseDirection, RealizedPnl};
pub use position::Position;

/// Symbol type alias
pub type Symbol = String;
