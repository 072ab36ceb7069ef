//! In-memory actor backend.
//!
//! Backs tests and hostless embeddings. Also supports one-shot failure
//! injection so commit-time partial-failure paths can be exercised.

use crate::host::{ActorHost, ItemData, ItemRecord};
use crate::StoreError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tablesync_types::{ActorId, ItemId};
use tokio::sync::RwLock;

#[derive(Default)]
struct ActorState {
    name: String,
    flags: HashMap<String, serde_json::Value>,
    items: HashMap<ItemId, ItemRecord>,
}

#[derive(Default)]
pub struct MemoryHost {
    actors: RwLock<HashMap<ActorId, ActorState>>,
    next_item: AtomicU64,
    fail_next_set_flag: AtomicBool,
    fail_next_create_item: AtomicBool,
    fail_next_delete_item: AtomicBool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_actor(&self, id: impl Into<ActorId>) {
        let id = id.into();
        let name = id.as_str().to_string();
        self.add_named_actor(id, name).await;
    }

    pub async fn add_named_actor(&self, id: impl Into<ActorId>, name: impl Into<String>) {
        let mut actors = self.actors.write().await;
        let state = actors.entry(id.into()).or_default();
        state.name = name.into();
    }

    /// Insert an item with a caller-chosen id, for test setup.
    pub async fn put_item(&self, actor: &ActorId, record: ItemRecord) {
        let mut actors = self.actors.write().await;
        let state = actors.entry(actor.clone()).or_default();
        state.items.insert(record.id.clone(), record);
    }

    pub async fn item_count(&self, actor: &ActorId) -> usize {
        self.actors
            .read()
            .await
            .get(actor)
            .map(|s| s.items.len())
            .unwrap_or(0)
    }

    /// Make the next `set_flag` call fail with a backend error.
    pub fn fail_next_set_flag(&self) {
        self.fail_next_set_flag.store(true, Ordering::SeqCst);
    }

    /// Make the next `create_item` call fail with a backend error.
    pub fn fail_next_create_item(&self) {
        self.fail_next_create_item.store(true, Ordering::SeqCst);
    }

    /// Make the next `delete_item` call fail with a backend error.
    pub fn fail_next_delete_item(&self) {
        self.fail_next_delete_item.store(true, Ordering::SeqCst);
    }

    fn injected(&self, flag: &AtomicBool, op: &str) -> Result<(), StoreError> {
        if flag.swap(false, Ordering::SeqCst) {
            Err(StoreError::Backend(format!("injected {op} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl ActorHost for MemoryHost {
    async fn actor_exists(&self, actor: &ActorId) -> Result<bool, StoreError> {
        Ok(self.actors.read().await.contains_key(actor))
    }

    async fn actor_name(&self, actor: &ActorId) -> Result<Option<String>, StoreError> {
        Ok(self.actors.read().await.get(actor).map(|s| s.name.clone()))
    }

    async fn get_flag(
        &self,
        actor: &ActorId,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let actors = self.actors.read().await;
        let state = actors
            .get(actor)
            .ok_or_else(|| StoreError::ActorNotFound(actor.clone()))?;
        Ok(state.flags.get(key).cloned())
    }

    async fn set_flag(
        &self,
        actor: &ActorId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.injected(&self.fail_next_set_flag, "set_flag")?;
        let mut actors = self.actors.write().await;
        let state = actors
            .get_mut(actor)
            .ok_or_else(|| StoreError::ActorNotFound(actor.clone()))?;
        state.flags.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_item(
        &self,
        actor: &ActorId,
        item: &ItemId,
    ) -> Result<Option<ItemRecord>, StoreError> {
        let actors = self.actors.read().await;
        let state = actors
            .get(actor)
            .ok_or_else(|| StoreError::ActorNotFound(actor.clone()))?;
        Ok(state.items.get(item).cloned())
    }

    async fn create_item(&self, actor: &ActorId, data: ItemData) -> Result<ItemId, StoreError> {
        self.injected(&self.fail_next_create_item, "create_item")?;
        let mut actors = self.actors.write().await;
        let state = actors
            .get_mut(actor)
            .ok_or_else(|| StoreError::ActorNotFound(actor.clone()))?;
        let id = ItemId::new(format!(
            "item-{}",
            self.next_item.fetch_add(1, Ordering::SeqCst) + 1
        ));
        state.items.insert(
            id.clone(),
            ItemRecord {
                id: id.clone(),
                name: data.name,
                img: data.img,
                kind: data.kind,
                data: data.data,
            },
        );
        Ok(id)
    }

    async fn delete_item(&self, actor: &ActorId, item: &ItemId) -> Result<(), StoreError> {
        self.injected(&self.fail_next_delete_item, "delete_item")?;
        let mut actors = self.actors.write().await;
        let state = actors
            .get_mut(actor)
            .ok_or_else(|| StoreError::ActorNotFound(actor.clone()))?;
        state
            .items
            .remove(item)
            .ok_or_else(|| StoreError::ItemNotFound(item.clone()))?;
        Ok(())
    }
}
