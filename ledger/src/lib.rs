//! Pure coin arithmetic over three-denomination balances.
//!
//! Everything here is side-effect free: conversion between coin counts and a
//! scalar base-unit value, denomination exchange with its asymmetric rounding,
//! and the settlement math the arbitrating peer runs at commit time. Functions
//! take balances by value and return fresh ones; callers persist the result.

pub mod convert;
pub mod error;
pub mod exchange;
pub mod settle;

pub use convert::{coin_value, from_base, to_base};
pub use error::LedgerError;
pub use exchange::{apply_exchange, exchange, ExchangeOutcome};
pub use settle::{add, credit_value, debit_value, remove_specific};
