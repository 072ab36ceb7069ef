//! Currency denominations and the world-scoped exchange ratios.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three coin denominations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    Gold,
    Silver,
    Bronze,
}

impl Denomination {
    /// All denominations, largest first. Decomposition order depends on this.
    pub const ALL: [Denomination; 3] = [
        Denomination::Gold,
        Denomination::Silver,
        Denomination::Bronze,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Denomination::Gold => "gold",
            Denomination::Silver => "silver",
            Denomination::Bronze => "bronze",
        }
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversion ratios between adjacent denominations.
///
/// World-scoped configuration: every peer in a session must agree on these
/// for arithmetic to line up. Both ratios must be at least 1, which the
/// constructor and the deserializer enforce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRatios")]
pub struct ExchangeRatios {
    silver_per_gold: u64,
    bronze_per_silver: u64,
}

impl ExchangeRatios {
    pub fn new(silver_per_gold: u64, bronze_per_silver: u64) -> Result<Self, TypeError> {
        if silver_per_gold == 0 {
            return Err(TypeError::InvalidRatio(silver_per_gold));
        }
        if bronze_per_silver == 0 {
            return Err(TypeError::InvalidRatio(bronze_per_silver));
        }
        Ok(Self {
            silver_per_gold,
            bronze_per_silver,
        })
    }

    pub fn silver_per_gold(&self) -> u64 {
        self.silver_per_gold
    }

    pub fn bronze_per_silver(&self) -> u64 {
        self.bronze_per_silver
    }

    /// Bronze value of one gold coin, `None` on overflow.
    pub fn bronze_per_gold(&self) -> Option<u64> {
        self.silver_per_gold.checked_mul(self.bronze_per_silver)
    }
}

impl Default for ExchangeRatios {
    fn default() -> Self {
        Self {
            silver_per_gold: 10,
            bronze_per_silver: 10,
        }
    }
}

/// Unvalidated mirror used during deserialization.
#[derive(Deserialize)]
struct RawRatios {
    #[serde(default = "default_ratio")]
    silver_per_gold: u64,
    #[serde(default = "default_ratio")]
    bronze_per_silver: u64,
}

fn default_ratio() -> u64 {
    10
}

impl TryFrom<RawRatios> for ExchangeRatios {
    type Error = TypeError;

    fn try_from(raw: RawRatios) -> Result<Self, Self::Error> {
        ExchangeRatios::new(raw.silver_per_gold, raw.bronze_per_silver)
    }
}
