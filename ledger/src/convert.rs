//! Conversion between coin counts and scalar base-unit value.
//!
//! The base unit is the smallest denomination (bronze). All value comparisons
//! in settlement go through these three functions.

use crate::error::LedgerError;
use tablesync_types::{Balance, Denomination, ExchangeRatios};

/// Base-unit value of a single coin of `unit`.
pub fn coin_value(unit: Denomination, ratios: &ExchangeRatios) -> Result<u64, LedgerError> {
    match unit {
        Denomination::Gold => ratios.bronze_per_gold().ok_or(LedgerError::Overflow),
        Denomination::Silver => Ok(ratios.bronze_per_silver()),
        Denomination::Bronze => Ok(1),
    }
}

/// Total base-unit value of a balance.
pub fn to_base(balance: &Balance, ratios: &ExchangeRatios) -> Result<u64, LedgerError> {
    let gold = balance
        .gold
        .checked_mul(coin_value(Denomination::Gold, ratios)?)
        .ok_or(LedgerError::Overflow)?;
    let silver = balance
        .silver
        .checked_mul(coin_value(Denomination::Silver, ratios)?)
        .ok_or(LedgerError::Overflow)?;
    gold.checked_add(silver)
        .and_then(|v| v.checked_add(balance.bronze))
        .ok_or(LedgerError::Overflow)
}

/// Greedy largest-first decomposition of a base-unit total into coins.
///
/// The result is canonical: silver stays below `silver_per_gold` and bronze
/// below `bronze_per_silver`.
pub fn from_base(total: u64, ratios: &ExchangeRatios) -> Result<Balance, LedgerError> {
    let per_gold = coin_value(Denomination::Gold, ratios)?;
    let per_silver = coin_value(Denomination::Silver, ratios)?;
    let gold = total / per_gold;
    let rem = total % per_gold;
    Ok(Balance {
        gold,
        silver: rem / per_silver,
        bronze: rem % per_silver,
    })
}
