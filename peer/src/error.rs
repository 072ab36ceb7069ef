use tablesync_types::ItemId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("ledger error: {0}")]
    Ledger(#[from] tablesync_ledger::LedgerError),

    #[error("store error: {0}")]
    Store(#[from] tablesync_store::StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("offer would move no coins")]
    EmptyOffer,

    #[error("no recipient selected")]
    NoRecipientSelected,

    #[error("recipient unavailable: {0}")]
    RecipientUnavailable(String),

    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("item type not allowed for transfer: {0}")]
    DisallowedItemType(String),

    #[error("not permitted: {0}")]
    NotPermitted(&'static str),
}
