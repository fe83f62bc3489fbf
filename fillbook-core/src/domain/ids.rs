use serde::{Deserialize, Serialize};
use std::fmt;

/// Broker-assigned fill identifier.
///
/// Stable across repeated fetches of the same execution window, which makes
/// it usable as an idempotency key when deduplicating a tape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FillId(pub String);

impl FillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for FillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FillId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}
