//! Session peer for synchronising tabletop session state across processes.
//!
//! Every peer:
//! - Broadcasts typed messages on one shared fire-and-forget channel
//! - Self-filters inbound traffic by content, role, and ownership
//! - Prompts its user through a synchronous event bus
//! - Commits cross-actor mutations only when configured as the arbitrator
//!
//! Currency offers, item transfers, and roll requests each live in their
//! own engine; [`Peer`] wires them together and runs the dispatch loop.

pub mod config;
pub mod currency;
pub mod directory;
pub mod error;
pub mod events;
pub mod gate;
pub mod items;
pub mod logging;
pub mod peer;
pub mod rolls;
pub mod settled;
pub mod transport;

pub use config::{Role, SessionConfig};
pub use currency::CurrencyEngine;
pub use directory::{SessionDirectory, SessionUser, StaticDirectory};
pub use error::PeerError;
pub use events::{EventBus, NoticeLevel, PeerEvent};
pub use gate::ArbitrationGate;
pub use items::{item_type_allowed, ItemEngine, ALLOWED_ITEM_TYPES};
pub use logging::{init_logging, LogFormat};
pub use peer::Peer;
pub use rolls::{RollEngine, RollSpec};
pub use settled::{SettledOffers, DEFAULT_SETTLED_CAPACITY};
pub use transport::{ChannelAdapter, MemoryHub};
