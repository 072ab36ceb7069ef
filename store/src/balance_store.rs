//! Balance persistence over actor flag storage.

use crate::host::ActorHost;
use crate::StoreError;
use std::sync::Arc;
use tablesync_types::{ActorId, Balance};

/// Flag key under which an actor's coin balance lives.
pub const CURRENCY_FLAG: &str = "currency";

/// The only read and write path for balances.
///
/// Reads sanitize whatever the host hands back (missing flag, fractions,
/// negatives) into a well-formed [`Balance`]; writes store the canonical
/// host representation. An actor that has never held coins reads as zero.
#[derive(Clone)]
pub struct BalanceStore {
    host: Arc<dyn ActorHost>,
}

impl BalanceStore {
    pub fn new(host: Arc<dyn ActorHost>) -> Self {
        Self { host }
    }

    pub async fn get(&self, actor: &ActorId) -> Result<Balance, StoreError> {
        match self.host.get_flag(actor, CURRENCY_FLAG).await? {
            Some(raw) => Ok(Balance::from_host_value(&raw)),
            None => Ok(Balance::ZERO),
        }
    }

    pub async fn set(&self, actor: &ActorId, balance: Balance) -> Result<(), StoreError> {
        self.host
            .set_flag(actor, CURRENCY_FLAG, balance.to_host_value())
            .await
    }
}
