//! Host-side actor storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tablesync_types::{ActorId, ItemId};

/// An item document embedded in an actor, as the host reports it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub img: String,
    /// Host item type, e.g. `"weapon"`. Compared case-insensitively.
    pub kind: String,
    /// Full host-side source data, carried opaquely for duplication.
    pub data: serde_json::Value,
}

impl ItemRecord {
    /// The id-less creation payload that duplicates this item exactly.
    pub fn to_data(&self) -> ItemData {
        ItemData {
            name: self.name.clone(),
            img: self.img.clone(),
            kind: self.kind.clone(),
            data: self.data.clone(),
        }
    }
}

/// Creation payload for a new embedded item. The host assigns the id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemData {
    pub name: String,
    pub img: String,
    pub kind: String,
    pub data: serde_json::Value,
}

/// Trait for the host's actor collection.
///
/// Flag storage is keyed JSON per actor; items are embedded documents. Every
/// durable mutation in the workspace goes through one of these methods.
#[async_trait::async_trait]
pub trait ActorHost: Send + Sync {
    async fn actor_exists(&self, actor: &ActorId) -> Result<bool, StoreError>;

    /// Display name of an actor, `None` if the actor is unknown.
    async fn actor_name(&self, actor: &ActorId) -> Result<Option<String>, StoreError>;

    /// Read a flag value, `None` if the actor has never stored one.
    async fn get_flag(
        &self,
        actor: &ActorId,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError>;

    async fn set_flag(
        &self,
        actor: &ActorId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Resolve an embedded item, `None` if it no longer exists.
    async fn get_item(
        &self,
        actor: &ActorId,
        item: &ItemId,
    ) -> Result<Option<ItemRecord>, StoreError>;

    /// Create an embedded item from its source data, returning the new id.
    async fn create_item(&self, actor: &ActorId, data: ItemData) -> Result<ItemId, StoreError>;

    async fn delete_item(&self, actor: &ActorId, item: &ItemId) -> Result<(), StoreError>;
}
