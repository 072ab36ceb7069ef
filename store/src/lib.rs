//! Actor persistence seam.
//!
//! The embedding host owns all durable state: actors, their flag storage, and
//! their embedded item documents. This crate defines the trait the rest of the
//! workspace talks to, the balance wrapper that sanitizes flag reads, and an
//! in-memory backend for tests and embeddings without a host.

pub mod balance_store;
pub mod error;
pub mod host;
pub mod memory;

pub use balance_store::{BalanceStore, CURRENCY_FLAG};
pub use error::StoreError;
pub use host::{ActorHost, ItemData, ItemRecord};
pub use memory::MemoryHost;
