//! Wire message types for the shared module channel.
//!
//! Every payload this module broadcasts or consumes is one variant of
//! [`Message`], discriminated on the wire by a `type` string. Dispatch is an
//! exhaustive match; adding a variant forces every handler to decide what to
//! do with it. Messages are immutable values: they are built once, broadcast,
//! and echoed back verbatim inside later messages of the same flow.

pub mod envelope;

pub use envelope::{Envelope, MODULE_CHANNEL};

use serde::{Deserialize, Serialize};
use tablesync_types::{ActorId, Balance, Denomination, ItemId, OfferId, UserId};

/// Everything that travels on the module channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    CurrencyOffer(CurrencyOffer),
    CurrencyOfferDecision(CurrencyOfferDecision),
    ItemTransferRequest(ItemTransferRequest),
    ItemTransferOffer(ItemTransferOffer),
    ItemTransferResponse(ItemTransferResponse),
    Info(InfoBroadcast),
    CurrencyRefresh(CurrencyRefresh),
    RollRequest(RollRequest),
}

/// What a currency offer proposes to move.
///
/// Specific terms name physical coins per denomination. Value terms fix a
/// scalar amount of one denomination; which physical coins leave the sender
/// is resolved at commit time, not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum OfferTerms {
    Specific { delta: Balance },
    Value { amount: u64, unit: Denomination },
}

/// A proposal to move coins from one actor to another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyOffer {
    pub id: OfferId,
    pub sender_id: ActorId,
    pub recipient_id: ActorId,
    #[serde(flatten)]
    pub terms: OfferTerms,
}

/// The recipient's answer, echoing the full original offer so the
/// arbitrating peer needs no local offer state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyOfferDecision {
    pub id: OfferId,
    pub accepted: bool,
    pub offer: CurrencyOffer,
}

/// A player's request to hand an item to another player, addressed to the
/// arbitrating peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTransferRequest {
    pub from_user_id: UserId,
    pub from_actor_id: ActorId,
    pub item_id: ItemId,
    pub to_user_id: UserId,
}

/// The arbitrator's relay of a transfer request to the recipient, enriched
/// with the display metadata only the arbitrator could resolve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTransferOffer {
    #[serde(flatten)]
    pub request: ItemTransferRequest,
    pub from_user_name: String,
    pub item_name: String,
    pub item_img: String,
    pub item_type: String,
    pub to_actor_id: ActorId,
}

/// The recipient's answer, echoing the enriched offer back to the arbitrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTransferResponse {
    pub accepted: bool,
    pub offer: ItemTransferOffer,
    pub responder_user_id: UserId,
}

/// One-way notification, shown only by peers whose user is listed.
/// An empty recipient list addresses everyone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoBroadcast {
    pub to_user_ids: Vec<UserId>,
    pub message: String,
}

/// Tells peers that the listed actors' balances changed, so any view of
/// them should re-read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRefresh {
    pub actor_ids: Vec<ActorId>,
}

/// A GM's prompt for one player to make a skill roll.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollRequest {
    pub from_gm: UserId,
    pub to_user: UserId,
    pub actor_id: ActorId,
    pub skill_key: String,
    pub skill_label: String,
    pub pool_mods: PoolModifiers,
    pub roll_mode: RollMode,
    pub label: String,
}

/// Dice pool adjustments attached to a roll request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolModifiers {
    pub difficulty: u8,
    pub challenge: u8,
    pub setback: u8,
    pub boost: u8,
}

/// Host chat visibility for the requested roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    PublicRoll,
    GmRoll,
    BlindRoll,
    SelfRoll,
}

impl Default for RollMode {
    fn default() -> Self {
        RollMode::PublicRoll
    }
}
