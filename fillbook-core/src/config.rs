//! Instrument configuration: the per-symbol point-value registry.
//!
//! Point values are static, human-maintained monetary multipliers loaded
//! from TOML. The ledger fails closed for any symbol missing here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from parsing or validating the instrument configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse instrument config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("instrument '{symbol}': point_value must be positive and finite, got {point_value}")]
    InvalidPointValue { symbol: String, point_value: f64 },

    #[error("instrument config defines no instruments")]
    Empty,
}

/// Static metadata for one tradable instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Currency amount one point of price movement represents per unit.
    pub point_value: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// The set of recognized instruments, keyed by symbol.
///
/// BTreeMap keeps serialization and iteration order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instruments {
    #[serde(default)]
    pub instruments: BTreeMap<String, InstrumentSpec>,
}

impl Instruments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML config.
    ///
    /// ```toml
    /// [instruments.MNQ]
    /// point_value = 2.0
    ///
    /// [instruments.ES]
    /// point_value = 50.0
    /// currency = "USD"
    /// ```
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let parsed: Self = toml::from_str(raw)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Register an instrument programmatically (used by tests and the
    /// synthetic tape path).
    pub fn with_instrument(
        mut self,
        symbol: impl Into<String>,
        point_value: f64,
    ) -> Result<Self, ConfigError> {
        let symbol = symbol.into();
        if !(point_value > 0.0 && point_value.is_finite()) {
            return Err(ConfigError::InvalidPointValue { symbol, point_value });
        }
        self.instruments.insert(
            symbol,
            InstrumentSpec { point_value, currency: default_currency() },
        );
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::Empty);
        }
        for (symbol, spec) in &self.instruments {
            if !(spec.point_value > 0.0 && spec.point_value.is_finite()) {
                return Err(ConfigError::InvalidPointValue {
                    symbol: symbol.clone(),
                    point_value: spec.point_value,
                });
            }
        }
        Ok(())
    }

    /// Point value for `symbol`, if configured.
    pub fn point_value(&self, symbol: &str) -> Option<f64> {
        self.instruments.get(symbol).map(|spec| spec.point_value)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.instruments.contains_key(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
