//! Three-denomination coin balance.

use crate::denomination::Denomination;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical coin counts held by an actor, one count per denomination.
///
/// Counts are unsigned by construction: no committed mutation can produce a
/// negative balance because the type cannot represent one. Host-supplied
/// values go through [`Balance::from_host_value`], which floors fractions and
/// clamps negatives before they ever reach arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub gold: u64,
    pub silver: u64,
    pub bronze: u64,
}

impl Balance {
    pub const ZERO: Balance = Balance {
        gold: 0,
        silver: 0,
        bronze: 0,
    };

    pub fn new(gold: u64, silver: u64, bronze: u64) -> Self {
        Self {
            gold,
            silver,
            bronze,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Coin count for a single denomination.
    pub fn get(&self, unit: Denomination) -> u64 {
        match unit {
            Denomination::Gold => self.gold,
            Denomination::Silver => self.silver,
            Denomination::Bronze => self.bronze,
        }
    }

    /// Replace the count for a single denomination.
    pub fn with(&self, unit: Denomination, count: u64) -> Self {
        let mut out = *self;
        match unit {
            Denomination::Gold => out.gold = count,
            Denomination::Silver => out.silver = count,
            Denomination::Bronze => out.bronze = count,
        }
        out
    }

    /// Per-denomination addition, `None` if any count overflows.
    pub fn checked_add(&self, other: &Balance) -> Option<Balance> {
        Some(Balance {
            gold: self.gold.checked_add(other.gold)?,
            silver: self.silver.checked_add(other.silver)?,
            bronze: self.bronze.checked_add(other.bronze)?,
        })
    }

    /// Per-denomination subtraction, `None` if any count falls short.
    pub fn checked_sub(&self, other: &Balance) -> Option<Balance> {
        Some(Balance {
            gold: self.gold.checked_sub(other.gold)?,
            silver: self.silver.checked_sub(other.silver)?,
            bronze: self.bronze.checked_sub(other.bronze)?,
        })
    }

    /// Whether every denomination covers the corresponding count in `other`.
    pub fn covers(&self, other: &Balance) -> bool {
        self.gold >= other.gold && self.silver >= other.silver && self.bronze >= other.bronze
    }

    /// Sanitize a host-stored flag value into a balance.
    ///
    /// Missing fields read as zero. Fractional counts are floored, and
    /// negative or non-numeric values clamp to zero. Anything the host hands
    /// back is usable after this.
    pub fn from_host_value(value: &serde_json::Value) -> Balance {
        Balance {
            gold: sanitize_count(value.get("gold")),
            silver: sanitize_count(value.get("silver")),
            bronze: sanitize_count(value.get("bronze")),
        }
    }

    /// Host-storable representation of this balance.
    pub fn to_host_value(&self) -> serde_json::Value {
        serde_json::json!({
            "gold": self.gold,
            "silver": self.silver,
            "bronze": self.bronze,
        })
    }
}

fn sanitize_count(value: Option<&serde_json::Value>) -> u64 {
    let n = value.and_then(serde_json::Value::as_f64).unwrap_or(0.0);
    let n = n.floor();
    if n.is_finite() && n > 0.0 {
        // Saturating cast: absurdly large host values pin at u64::MAX.
        n as u64
    } else {
        0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}g {}s {}b", self.gold, self.silver, self.bronze)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn checked_sub_refuses_any_shortfall() {
        let have = Balance::new(1, 5, 0);
        let want = Balance::new(2, 0, 0);
        assert_eq!(have.checked_sub(&want), None);
        // And nothing about `have` changed.
        assert_eq!(have, Balance::new(1, 5, 0));
    }

    #[test]
    fn checked_sub_is_per_denomination() {
        let have = Balance::new(3, 2, 1);
        let got = have.checked_sub(&Balance::new(1, 2, 0)).unwrap();
        assert_eq!(got, Balance::new(2, 0, 1));
    }

    #[test]
    fn covers_matches_checked_sub() {
        let have = Balance::new(4, 0, 9);
        assert!(have.covers(&Balance::new(4, 0, 9)));
        assert!(!have.covers(&Balance::new(4, 1, 0)));
    }

    #[test]
    fn host_values_are_sanitized() {
        let raw = json!({ "gold": 2.9, "silver": -3, "bronze": "junk" });
        assert_eq!(Balance::from_host_value(&raw), Balance::new(2, 0, 0));
    }

    #[test]
    fn missing_host_fields_read_as_zero() {
        assert_eq!(Balance::from_host_value(&json!({})), Balance::ZERO);
        assert_eq!(
            Balance::from_host_value(&json!({ "silver": 7 })),
            Balance::new(0, 7, 0)
        );
    }

    #[test]
    fn host_value_roundtrip() {
        let bal = Balance::new(1, 2, 3);
        assert_eq!(Balance::from_host_value(&bal.to_host_value()), bal);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Balance::new(1, 0, 25).to_string(), "1g 0s 25b");
    }
}
