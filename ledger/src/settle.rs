//! Commit-time settlement math.
//!
//! These are the operations the arbitrating peer applies against freshly
//! fetched balances. Each returns the new balance or an error with the input
//! untouched; nothing here persists anything.

use crate::convert::{coin_value, from_base, to_base};
use crate::error::LedgerError;
use tablesync_types::{Balance, Denomination, ExchangeRatios};

/// Credit an explicit per-denomination delta.
pub fn add(balance: Balance, delta: &Balance) -> Result<Balance, LedgerError> {
    balance.checked_add(delta).ok_or(LedgerError::Overflow)
}

/// Debit an explicit per-denomination delta, all or nothing.
pub fn remove_specific(balance: Balance, delta: &Balance) -> Result<Balance, LedgerError> {
    balance
        .checked_sub(delta)
        .ok_or(LedgerError::InsufficientSpecificFunds)
}

/// Debit `amount` coins' worth of `unit` from a balance by total value.
///
/// Physical coins of the requested denomination are spent first, up to
/// availability; a debit they fully cover leaves every other denomination
/// untouched. Only the value still owed is taken by re-decomposing the
/// entire remaining balance, which may break larger coins. The quoted
/// amount is fixed; which physical coins leave is decided here, against
/// the balance passed in.
pub fn debit_value(
    balance: Balance,
    amount: u64,
    unit: Denomination,
    ratios: &ExchangeRatios,
) -> Result<Balance, LedgerError> {
    let unit_value = coin_value(unit, ratios)?;
    let need = amount.checked_mul(unit_value).ok_or(LedgerError::Overflow)?;
    let have = to_base(&balance, ratios)?;
    if have < need {
        return Err(LedgerError::InsufficientFunds {
            required_base: need,
            available_base: have,
        });
    }

    let on_hand = balance.get(unit);
    let pay_direct = on_hand.min(amount);
    let rest = balance.with(unit, on_hand - pay_direct);
    if pay_direct == amount {
        // Paid entirely in coins of the requested unit; the rest of the
        // purse keeps its exact coin mix.
        return Ok(rest);
    }
    // No overflow: (amount - pay_direct) * unit_value <= need.
    let still_owed = (amount - pay_direct) * unit_value;
    let rest_base = to_base(&rest, ratios)?;
    from_base(rest_base - still_owed, ratios)
}

/// Credit `amount` coins' worth of `unit`, re-decomposing the new total.
pub fn credit_value(
    balance: Balance,
    amount: u64,
    unit: Denomination,
    ratios: &ExchangeRatios,
) -> Result<Balance, LedgerError> {
    let unit_value = coin_value(unit, ratios)?;
    let gained = amount.checked_mul(unit_value).ok_or(LedgerError::Overflow)?;
    let total = to_base(&balance, ratios)?
        .checked_add(gained)
        .ok_or(LedgerError::Overflow)?;
    from_base(total, ratios)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios() -> ExchangeRatios {
        ExchangeRatios::default()
    }

    #[test]
    fn value_debit_breaks_larger_coins() {
        // One gold coin covers a 5-silver debit by decomposing.
        let out = debit_value(Balance::new(1, 0, 0), 5, Denomination::Silver, &ratios()).unwrap();
        assert_eq!(out, Balance::new(0, 5, 0));
    }

    #[test]
    fn value_debit_spends_requested_unit_first() {
        let out = debit_value(Balance::new(0, 7, 3), 5, Denomination::Silver, &ratios()).unwrap();
        assert_eq!(out, Balance::new(0, 2, 3));
    }

    #[test]
    fn covered_value_debit_leaves_other_coins_unbroken() {
        // 20 silver exceeds a gold coin's worth; paying 3 of them must not
        // canonicalize the remaining 17 into gold.
        let out = debit_value(Balance::new(0, 20, 5), 3, Denomination::Silver, &ratios()).unwrap();
        assert_eq!(out, Balance::new(0, 17, 5));
    }

    #[test]
    fn zero_value_debit_is_a_no_op() {
        let hoard = Balance::new(0, 13, 250);
        let out = debit_value(hoard, 0, Denomination::Gold, &ratios()).unwrap();
        assert_eq!(out, hoard);
    }

    #[test]
    fn value_debit_mixes_direct_and_decomposed_payment() {
        // 3 silver on hand, remaining 2 silver of value comes out of bronze.
        let out = debit_value(Balance::new(0, 3, 45), 5, Denomination::Silver, &ratios()).unwrap();
        assert_eq!(out, Balance::new(0, 2, 5));
    }

    #[test]
    fn value_debit_rejects_insufficient_total() {
        let err = debit_value(Balance::new(0, 4, 9), 5, Denomination::Silver, &ratios());
        assert_eq!(
            err,
            Err(LedgerError::InsufficientFunds {
                required_base: 50,
                available_base: 49,
            })
        );
    }

    #[test]
    fn value_credit_redecomposes_new_total() {
        let out = credit_value(Balance::new(0, 9, 5), 7, Denomination::Silver, &ratios()).unwrap();
        assert_eq!(out, Balance::new(1, 6, 5));
    }

    #[test]
    fn value_debit_then_credit_conserves_value() {
        let r = ratios();
        let sender = Balance::new(2, 1, 7);
        let recipient = Balance::new(0, 0, 3);
        let before =
            to_base(&sender, &r).unwrap() + to_base(&recipient, &r).unwrap();

        let sender_after = debit_value(sender, 13, Denomination::Silver, &r).unwrap();
        let recipient_after = credit_value(recipient, 13, Denomination::Silver, &r).unwrap();

        let after =
            to_base(&sender_after, &r).unwrap() + to_base(&recipient_after, &r).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn specific_debit_is_all_or_nothing() {
        let have = Balance::new(1, 5, 0);
        assert_eq!(
            remove_specific(have, &Balance::new(2, 0, 0)),
            Err(LedgerError::InsufficientSpecificFunds)
        );
        assert_eq!(
            remove_specific(have, &Balance::new(1, 2, 0)),
            Ok(Balance::new(0, 3, 0))
        );
    }

    #[test]
    fn add_checks_overflow() {
        assert_eq!(
            add(Balance::new(u64::MAX, 0, 0), &Balance::new(1, 0, 0)),
            Err(LedgerError::Overflow)
        );
        assert_eq!(
            add(Balance::new(1, 2, 3), &Balance::new(4, 5, 6)),
            Ok(Balance::new(5, 7, 9))
        );
    }
}
