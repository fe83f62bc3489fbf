//! Fillbook Runner: tape loading, run orchestration, summaries, reports.
//!
//! This crate builds on `fillbook-core` to provide:
//! - CSV/JSONL tape loading with fill-id deduplication
//! - A deterministic synthetic tape generator (debug fill source)
//! - Sequential and per-instrument parallel tape runs
//! - PnL summary metrics and per-instrument breakdowns
//! - Markdown report generation and artifact export

pub mod export;
pub mod report;
pub mod runner;
pub mod summary;
pub mod synthetic;
pub mod tape;

pub use export::{export_run, write_events_csv, write_events_json, ArtifactPaths};
pub use report::MarkdownReportGenerator;
pub use runner::{run_tape, run_tape_partitioned, RunError, TapeRunResult};
pub use summary::{per_instrument, InstrumentSummary, PnlSummary};
pub use synthetic::synthetic_tape;
pub use tape::{load_tape, load_tape_csv, load_tape_jsonl, LoadedTape, TapeError, TapeSource};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn run_result_is_send_sync() {
        assert_send::<TapeRunResult>();
        assert_sync::<TapeRunResult>();
    }

    #[test]
    fn loaded_tape_is_send_sync() {
        assert_send::<LoadedTape>();
        assert_sync::<LoadedTape>();
    }

    #[test]
    fn summaries_are_send_sync() {
        assert_send::<PnlSummary>();
        assert_sync::<PnlSummary>();
        assert_send::<InstrumentSummary>();
        assert_sync::<InstrumentSummary>();
    }
}
