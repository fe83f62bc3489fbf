//! Criterion benchmarks for the ledger hot path.
//!
//! Benchmarks:
//! 1. Single-instrument apply loop (open / scale-in / close cadence)
//! 2. Multi-instrument tape fold via `process_tape`
//! 3. Tape fingerprinting

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fillbook_core::fingerprint::tape_fingerprint;
use fillbook_core::ledger::process_tape;
use fillbook_core::{Fill, FillId, Instruments, PositionLedger, Side};

fn make_tape(symbols: &[&str], fills_per_symbol: usize) -> Vec<Fill> {
    let base = chrono::DateTime::parse_from_rfc3339("2024-03-04T14:30:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let mut tape = Vec::with_capacity(symbols.len() * fills_per_symbol);
    let mut seq = 0u64;
    for (s, symbol) in symbols.iter().enumerate() {
        for i in 0..fills_per_symbol {
            // Alternate buys and sells with drifting size so the ledger
            // exercises scale-ins, partial closes, and flips.
            let side = if i % 3 == 0 { Side::Sell } else { Side::Buy };
            let quantity = 1 + (i % 4) as i64;
            let price = 100.0 + (i as f64 * 0.1).sin() * 5.0 + s as f64;
            seq += 1;
            tape.push(Fill {
                id: FillId::from(seq),
                timestamp: base + chrono::Duration::seconds((i * symbols.len() + s) as i64),
                symbol: (*symbol).into(),
                side,
                quantity,
                price,
            });
        }
    }
    tape.sort_by_key(|fill| fill.timestamp);
    tape
}

fn make_config(symbols: &[&str]) -> Instruments {
    let mut config = Instruments::new();
    for symbol in symbols {
        config = config.with_instrument(*symbol, 2.0).unwrap();
    }
    config
}

fn bench_apply_loop(c: &mut Criterion) {
    let symbols = ["MNQ"];
    let config = make_config(&symbols);
    let mut group = c.benchmark_group("apply_loop");
    for n in [1_000usize, 10_000] {
        let tape = make_tape(&symbols, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &tape, |b, tape| {
            b.iter(|| {
                let mut ledger = PositionLedger::new();
                for fill in tape {
                    black_box(ledger.apply(fill, &config).unwrap());
                }
                ledger
            })
        });
    }
    group.finish();
}

fn bench_process_tape(c: &mut Criterion) {
    let symbols = ["MNQ", "ES", "NQ", "YM", "RTY"];
    let config = make_config(&symbols);
    let tape = make_tape(&symbols, 2_000);
    c.bench_function("process_tape_5x2000", |b| {
        b.iter(|| process_tape(black_box(&tape), &config).unwrap())
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let tape = make_tape(&["MNQ"], 10_000);
    c.bench_function("tape_fingerprint_10000", |b| {
        b.iter(|| tape_fingerprint(black_box(&tape)))
    });
}

criterion_group!(benches, bench_apply_loop, bench_process_tape, bench_fingerprint);
criterion_main!(benches);
