//! Content-addressed identification of a ledger run.
//!
//! A run is identified by what went in: the tape and the instrument
//! config. Hashing both with BLAKE3 over canonical JSON gives a stable id
//! that two identical runs share, which is what makes reports cacheable
//! and regressions diffable.

use crate::config::Instruments;
use crate::domain::Fill;
use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 hex digest of a fill tape, in input order.
pub fn tape_fingerprint(fills: &[Fill]) -> String {
    let mut hasher = blake3::Hasher::new();
    for fill in fills {
        let json = serde_json::to_string(fill).expect("Fill must serialize");
        hasher.update(json.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// BLAKE3 hex digest of the instrument config.
///
/// `Instruments` is backed by a BTreeMap, so serialization order (and
/// therefore the digest) is deterministic.
pub fn config_fingerprint(instruments: &Instruments) -> String {
    let json = serde_json::to_string(instruments).expect("Instruments must serialize");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}

/// Identity of one report: tape digest + config digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportId {
    pub tape_hash: String,
    pub config_hash: String,
}

impl ReportId {
    pub fn new(fills: &[Fill], instruments: &Instruments) -> Self {
        Self {
            tape_hash: tape_fingerprint(fills),
            config_hash: config_fingerprint(instruments),
        }
    }

    /// Combined digest, suitable as a directory or cache key.
    pub fn hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.tape_hash.as_bytes());
        hasher.update(b":");
        hasher.update(self.config_hash.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hash())
    }
}
