use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The sender's total value cannot cover a value-mode debit.
    #[error("insufficient funds: need {required_base} base units, have {available_base}")]
    InsufficientFunds {
        required_base: u64,
        available_base: u64,
    },

    /// A specific per-denomination debit found at least one denomination short.
    #[error("insufficient coins of the requested denominations")]
    InsufficientSpecificFunds,

    /// Exchanging a denomination for itself is meaningless.
    #[error("cannot exchange a denomination for itself")]
    SameUnitExchange,

    /// A coin count or base-unit total exceeded the representable range.
    #[error("arithmetic overflow in coin computation")]
    Overflow,
}
