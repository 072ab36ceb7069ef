//! Fundamental types for the tablesync session protocol.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! host document identifiers, offer identifiers, currency denominations, exchange
//! ratios, and the three-denomination balance record.

pub mod balance;
pub mod denomination;
pub mod error;
pub mod ids;

pub use balance::Balance;
pub use denomination::{Denomination, ExchangeRatios};
pub use error::TypeError;
pub use ids::{ActorId, ItemId, OfferId, UserId};
