//! Fillbook Core: the position ledger and its domain types.
//!
//! This crate contains the accounting heart of fillbook:
//! - Domain types (fills, positions, realized-PnL events)
//! - Instrument configuration (per-symbol point values, TOML)
//! - The position ledger state machine (scale-in, partial close, full
//!   close, flip) with all-or-nothing fill application
//! - Content-addressed run fingerprinting

pub mod config;
pub mod domain;
pub mod fingerprint;
pub mod ledger;

pub use config::{ConfigError, InstrumentSpec, Instruments};
pub use domain::{CloseDirection, Fill, FillId, Position, RealizedPnl, Side, Symbol};
pub use fingerprint::{config_fingerprint, tape_fingerprint, ReportId};
pub use ledger::{apply_fill, process_tape, LedgerError, PositionLedger, TapeResult};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync, so per-instrument
    /// ledgers can be driven from worker threads without retrofits.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Fill>();
        require_sync::<Fill>();
        require_send::<Side>();
        require_sync::<Side>();
        require_send::<Position>();
        require_sync::<Position>();
        require_send::<RealizedPnl>();
        require_sync::<RealizedPnl>();
        require_send::<PositionLedger>();
        require_sync::<PositionLedger>();
        require_send::<TapeResult>();
        require_sync::<TapeResult>();
        require_send::<Instruments>();
        require_sync::<Instruments>();
        require_send::<LedgerError>();
        require_sync::<LedgerError>();
        require_send::<ReportId>();
        require_sync::<ReportId>();
    }
}
