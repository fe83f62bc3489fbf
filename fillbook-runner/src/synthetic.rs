//! Synthetic tape generation.
//!
//! A developer/debug fill source: a seeded random walk producing a
//! plausible mix of opens, scale-ins, partial closes, and flips. Per-symbol
//! sub-seeds are derived with BLAKE3 from the master seed, so the tape for
//! a given (seed, symbol) is identical regardless of symbol order or
//! thread scheduling.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fillbook_core::{Fill, FillId, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Derive a deterministic per-symbol sub-seed from the master seed.
fn sub_seed(master_seed: u64, symbol: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    hasher.update(symbol.as_bytes());
    let hash = hasher.finalize();
    u64::from_le_bytes(hash.as_bytes()[..8].try_into().unwrap())
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap()
}

/// Generate a synthetic tape for `symbols`, `fills_per_symbol` fills each.
///
/// Fills are interleaved across symbols in timestamp order, one per
/// simulated second. Quantities stay small (1..=5) so closes and flips
/// occur often.
pub fn synthetic_tape(symbols: &[&str], fills_per_symbol: usize, seed: u64) -> Vec<Fill> {
    let mut tape = Vec::with_capacity(symbols.len() * fills_per_symbol);

    for (s, symbol) in symbols.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(sub_seed(seed, symbol));
        // Distinct price regime per symbol so reports are readable.
        let mut price = 100.0 * (s + 1) as f64;
        let mut open: i64 = 0;

        for i in 0..fills_per_symbol {
            price = (price + rng.gen_range(-0.75..0.75)).max(1.0);
            let quantity = rng.gen_range(1..=5i64);
            // Lean toward closing when a position is open, so the tape
            // realizes PnL instead of only accumulating exposure.
            let side = if open > 0 && rng.gen_bool(0.6) {
                Side::Sell
            } else if open < 0 && rng.gen_bool(0.6) {
                Side::Buy
            } else if rng.gen_bool(0.5) {
                Side::Buy
            } else {
                Side::Sell
            };
            open += side.signed(quantity);

            tape.push(Fill {
                id: FillId::new(format!("{}-{}", symbol, i + 1)),
                timestamp: base_time() + Duration::seconds((i * symbols.len() + s) as i64),
                symbol: (*symbol).to_string(),
                side,
                quantity,
                price: (price * 4.0).round() / 4.0,
            });
        }
    }

    tape.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    tape
}
