use tablesync_types::{ActorId, ItemId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
