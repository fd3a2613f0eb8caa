//! Currency rate lookup.
//!
//! The normalizer never reads a process-wide table: a [`RateLookup`] is passed in explicitly, so
//! tests (and callers with fresher rates) can supply any table they like.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{StatsError, StatsResult};

/// Code of the base currency. It converts at 1 unless a table says otherwise.
pub const BASE_CURRENCY: &str = "RUR";

/// Maps a currency code to its multiplier into the base currency.
///
/// Returning `None` means "unknown currency"; such postings are dropped.
pub trait RateLookup {
    /// Multiplier for `code`, or `None` when the code is unknown.
    fn rate(&self, code: &str) -> Option<f64>;
}

impl<F> RateLookup for F
where
    F: Fn(&str) -> Option<f64>,
{
    fn rate(&self, code: &str) -> Option<f64> {
        self(code)
    }
}

/// An explicit table of currency multipliers.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: IndexMap<String, f64>,
}

impl RateTable {
    /// Build a table from `(code, multiplier)` pairs.
    ///
    /// Fails if any multiplier is negative or not finite.
    pub fn new<K: Into<String>>(rates: impl IntoIterator<Item = (K, f64)>) -> StatsResult<Self> {
        let rates: IndexMap<String, f64> = rates.into_iter().map(|(k, v)| (k.into(), v)).collect();
        for (code, rate) in &rates {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(StatsError::InvalidRateTable {
                    message: format!("rate for '{code}' must be a finite non-negative number, got {rate}"),
                });
            }
        }
        Ok(Self { rates })
    }

    /// An empty table. Only the base currency resolves.
    pub fn empty() -> Self {
        Self {
            rates: IndexMap::new(),
        }
    }

    /// Load a table from a JSON object file such as `{"USD": 60.66, "EUR": 59.9}`.
    pub fn from_json_path(path: impl AsRef<Path>) -> StatsResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a table from a JSON object string.
    pub fn from_json_str(input: &str) -> StatsResult<Self> {
        let rates: IndexMap<String, f64> = serde_json::from_str(input)?;
        Self::new(rates)
    }

    /// Number of explicitly listed currencies.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// `true` if no currency is explicitly listed.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for RateTable {
    /// Fixed multipliers into roubles.
    fn default() -> Self {
        Self {
            rates: [
                ("AZN", 35.68),
                ("BYR", 23.91),
                ("EUR", 59.90),
                ("GEL", 21.74),
                ("KGS", 0.76),
                ("KZT", 0.13),
                ("RUR", 1.0),
                ("UAH", 1.64),
                ("USD", 60.66),
                ("UZS", 0.0055),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        }
    }
}

impl RateLookup for RateTable {
    fn rate(&self, code: &str) -> Option<f64> {
        match self.rates.get(code) {
            Some(rate) => Some(*rate),
            None if code == BASE_CURRENCY => Some(1.0),
            None => None,
        }
    }
}
