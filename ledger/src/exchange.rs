//! Denomination exchange with asymmetric rounding.
//!
//! Converting downward in value is always exact. Converting upward floors to
//! whole coins and hands back the unconvertible remainder in the source
//! denomination, so a too-small exchange is a visible no-op rather than a
//! value loss.

use crate::convert::coin_value;
use crate::error::LedgerError;
use tablesync_types::{Balance, Denomination, ExchangeRatios};

/// Result of exchanging `amount` coins of one denomination for another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangeOutcome {
    /// Whole coins of the target denomination produced.
    pub gained: u64,
    /// Source coins that could not convert to a whole target coin.
    pub remainder: u64,
}

/// Compute the outcome of exchanging `amount` coins of `from` into `to`.
///
/// Rounding is asymmetric: a more valuable source coin always converts
/// exactly, a less valuable one floors and reports the leftover source coins.
pub fn exchange(
    amount: u64,
    from: Denomination,
    to: Denomination,
    ratios: &ExchangeRatios,
) -> Result<ExchangeOutcome, LedgerError> {
    if from == to {
        return Err(LedgerError::SameUnitExchange);
    }
    let from_val = coin_value(from, ratios)?;
    let to_val = coin_value(to, ratios)?;

    if from_val > to_val {
        let per = from_val / to_val;
        let gained = amount.checked_mul(per).ok_or(LedgerError::Overflow)?;
        Ok(ExchangeOutcome {
            gained,
            remainder: 0,
        })
    } else if from_val < to_val {
        let ratio = to_val / from_val;
        Ok(ExchangeOutcome {
            gained: amount / ratio,
            remainder: amount % ratio,
        })
    } else {
        // Distinct units can share a value when a ratio is 1.
        Ok(ExchangeOutcome {
            gained: amount,
            remainder: 0,
        })
    }
}

/// Exchange coins within a single balance and return the updated balance.
///
/// Requires `amount` physical coins of `from` on hand. The remainder stays in
/// the source denomination, so total value is conserved exactly.
pub fn apply_exchange(
    balance: Balance,
    amount: u64,
    from: Denomination,
    to: Denomination,
    ratios: &ExchangeRatios,
) -> Result<Balance, LedgerError> {
    let outcome = exchange(amount, from, to, ratios)?;
    let have = balance.get(from);
    if have < amount {
        return Err(LedgerError::InsufficientSpecificFunds);
    }
    let converted = amount - outcome.remainder;
    let gained_total = balance
        .get(to)
        .checked_add(outcome.gained)
        .ok_or(LedgerError::Overflow)?;
    Ok(balance
        .with(from, have - converted)
        .with(to, gained_total))
}
