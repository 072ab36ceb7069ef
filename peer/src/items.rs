//! Item transfers: sender validation, arbitrator relay, and the
//! create-then-delete move.
//!
//! The move is two sequential host writes, not a transaction. Create runs
//! first so a failure loses nothing; a delete failure after a successful
//! create leaves the item on both actors, which is flagged to both parties
//! for manual correction rather than reconciled automatically.

use std::sync::Arc;

use tablesync_messages::{
    InfoBroadcast, ItemTransferOffer, ItemTransferRequest, ItemTransferResponse, Message,
};
use tablesync_store::{ActorHost, ItemRecord};
use tablesync_types::{ActorId, ItemId, UserId};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::directory::SessionDirectory;
use crate::events::{EventBus, PeerEvent};
use crate::gate::ArbitrationGate;
use crate::transport::ChannelAdapter;
use crate::PeerError;

/// Item types that may change hands. Compared case-insensitively; both
/// spellings of armour are accepted.
pub const ALLOWED_ITEM_TYPES: [&str; 4] = ["armour", "armor", "gear", "weapon"];

/// Shown when an item carries no image of its own.
const FALLBACK_ITEM_IMG: &str = "icons/svg/item-bag.svg";

pub fn item_type_allowed(kind: &str) -> bool {
    let kind = kind.to_ascii_lowercase();
    ALLOWED_ITEM_TYPES.iter().any(|allowed| *allowed == kind)
}

pub struct ItemEngine {
    config: Arc<SessionConfig>,
    gate: ArbitrationGate,
    host: Arc<dyn ActorHost>,
    directory: Arc<dyn SessionDirectory>,
    outbound: ChannelAdapter,
    events: Arc<EventBus>,
}

impl ItemEngine {
    pub(crate) fn new(
        config: Arc<SessionConfig>,
        gate: ArbitrationGate,
        host: Arc<dyn ActorHost>,
        directory: Arc<dyn SessionDirectory>,
        outbound: ChannelAdapter,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            gate,
            host,
            directory,
            outbound,
            events,
        }
    }

    // ── Sender side ─────────────────────────────────────────────────────

    /// Offer an item from an owned actor to another user. `to_user` is the
    /// raw dialog selection, which may be empty.
    ///
    /// Everything here is sender-local validation; the arbitrator
    /// re-validates at relay and again at commit, because the item can
    /// vanish or change while the offer is in flight.
    pub async fn send_item(
        &self,
        from_actor: &ActorId,
        item: &ItemId,
        to_user: Option<&UserId>,
    ) -> Result<(), PeerError> {
        self.ensure_enabled()?;
        if !self.gate.may_commit()
            && !self.directory.owns_actor(self.gate.user_id(), from_actor)
        {
            return Err(PeerError::NotPermitted(
                "only the owner or the arbitrator may give away an actor's items",
            ));
        }

        let record = self
            .host
            .get_item(from_actor, item)
            .await?
            .ok_or_else(|| PeerError::ItemNotFound(item.clone()))?;
        if !item_type_allowed(&record.kind) {
            return Err(PeerError::DisallowedItemType(record.kind));
        }

        let to_user = to_user.ok_or(PeerError::NoRecipientSelected)?;
        if self.gate.is_self(to_user) {
            return Err(PeerError::RecipientUnavailable(
                "cannot send an item to yourself".to_string(),
            ));
        }
        let eligible = self.directory.eligible_recipients();
        if !eligible.iter().any(|user| &user.id == to_user) {
            return Err(PeerError::RecipientUnavailable(format!(
                "user {to_user} cannot receive items right now"
            )));
        }

        info!(item = %item, from = %from_actor, to = %to_user, "broadcasting item transfer request");
        self.outbound
            .emit(Message::ItemTransferRequest(ItemTransferRequest {
                from_user_id: self.gate.user_id().clone(),
                from_actor_id: from_actor.clone(),
                item_id: item.clone(),
                to_user_id: to_user.clone(),
            }));
        Ok(())
    }

    /// Answer a relayed offer. The response echoes the enriched offer so
    /// the arbitrator needs no local request state.
    pub fn respond_to_offer(
        &self,
        offer: ItemTransferOffer,
        accepted: bool,
    ) -> Result<(), PeerError> {
        self.ensure_enabled()?;
        self.outbound
            .emit(Message::ItemTransferResponse(ItemTransferResponse {
                accepted,
                offer,
                responder_user_id: self.gate.user_id().clone(),
            }));
        Ok(())
    }

    // ── Arbitrator relay ────────────────────────────────────────────────

    /// Resolve all parties and the item, then relay an enriched offer to
    /// the recipient. Resolution failures notify the sender only.
    pub async fn handle_request(&self, request: ItemTransferRequest) -> Result<(), PeerError> {
        if !self.config.enable_item_send {
            debug!("item transfers disabled, request ignored");
            return Ok(());
        }
        if !self.gate.may_commit() {
            return Ok(());
        }

        let from_user = self.directory.user(&request.from_user_id);
        let to_user = self.directory.user(&request.to_user_id);
        let to_actor = to_user.as_ref().and_then(|user| user.character.clone());
        let record = self.lookup_item(&request.from_actor_id, &request.item_id).await;

        let (from_user, record, to_actor) = match (from_user, record, to_actor) {
            (Some(f), Some(r), Some(a)) => (f, r, a),
            _ => {
                warn!(item = %request.item_id, "item transfer request did not resolve, sender notified");
                self.broadcast_info(
                    vec![request.from_user_id.clone()],
                    "Item transfer could not be delivered".to_string(),
                );
                return Ok(());
            }
        };

        if !item_type_allowed(&record.kind) {
            self.broadcast_info(
                vec![request.from_user_id.clone()],
                "Only armour, gear, and weapon items can be sent".to_string(),
            );
            return Ok(());
        }

        info!(item = %request.item_id, to = %request.to_user_id, "relaying item offer to recipient");
        let item_img = if record.img.is_empty() {
            FALLBACK_ITEM_IMG.to_string()
        } else {
            record.img.clone()
        };
        self.outbound.emit(Message::ItemTransferOffer(ItemTransferOffer {
            request,
            from_user_name: from_user.name,
            item_name: record.name,
            item_img,
            item_type: record.kind,
            to_actor_id: to_actor,
        }));
        Ok(())
    }

    /// Recipient side of the relay: prompt only the addressed user.
    pub fn handle_offer(&self, offer: ItemTransferOffer) -> Result<(), PeerError> {
        if !self.config.enable_item_send {
            return Ok(());
        }
        if !self.gate.addressed_to_us(&offer.request.to_user_id) {
            return Ok(());
        }
        self.events.emit(&PeerEvent::ItemOfferPrompt { offer });
        Ok(())
    }

    /// The arbitrator's commit: re-resolve the item, duplicate it onto the
    /// recipient actor, then delete the original.
    pub async fn handle_response(&self, response: ItemTransferResponse) -> Result<(), PeerError> {
        if !self.config.enable_item_send {
            debug!("item transfers disabled, response ignored");
            return Ok(());
        }
        if !self.gate.may_commit() {
            return Ok(());
        }

        let offer = &response.offer;
        let request = &offer.request;
        let sender_only = vec![request.from_user_id.clone()];
        let both_parties = vec![request.from_user_id.clone(), request.to_user_id.clone()];

        if !response.accepted {
            let decliner = self.user_display_name(&request.to_user_id);
            info!(item = %request.item_id, "item offer declined by {decliner}");
            self.broadcast_info(
                sender_only,
                format!("Item offer declined by {decliner}"),
            );
            return Ok(());
        }

        let from_actor_name = self.actor_display_name(&request.from_actor_id).await;
        // Re-resolve: the item may have been deleted or moved since the
        // offer was relayed.
        let record = match self.lookup_item(&request.from_actor_id, &request.item_id).await {
            Some(record) => record,
            None => {
                self.broadcast_info(
                    both_parties,
                    format!("The offered item is no longer on {from_actor_name}"),
                );
                return Ok(());
            }
        };
        if !item_type_allowed(&record.kind) {
            self.broadcast_info(
                both_parties,
                "The offered item can no longer be sent".to_string(),
            );
            return Ok(());
        }

        if let Err(e) = self.host.create_item(&offer.to_actor_id, record.to_data()).await {
            error!(item = %request.item_id, error = %e, "item duplication failed, nothing moved");
            self.broadcast_info(both_parties, "Item transfer failed".to_string());
            return Ok(());
        }
        if let Err(e) = self.host.delete_item(&request.from_actor_id, &request.item_id).await {
            // The copy exists and the original could not be removed. Flag
            // the duplicate; nothing here rolls back.
            error!(
                item = %request.item_id,
                error = %e,
                "item delete failed after duplication, item now exists on both actors"
            );
            self.broadcast_info(
                both_parties,
                format!(
                    "Item transfer incomplete: {} now exists on both actors and one copy must be removed manually",
                    offer.item_name
                ),
            );
            return Ok(());
        }

        let to_actor_name = self.actor_display_name(&offer.to_actor_id).await;
        info!(item = %request.item_id, "item transferred: {from_actor_name} -> {to_actor_name}");
        self.broadcast_info(
            both_parties,
            format!(
                "{} transferred from {from_actor_name} to {to_actor_name}",
                offer.item_name
            ),
        );
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn ensure_enabled(&self) -> Result<(), PeerError> {
        if self.config.enable_item_send {
            Ok(())
        } else {
            Err(PeerError::NotPermitted("item transfers are disabled"))
        }
    }

    async fn lookup_item(&self, actor: &ActorId, item: &ItemId) -> Option<ItemRecord> {
        match self.host.get_item(actor, item).await {
            Ok(found) => found,
            Err(e) => {
                warn!(actor = %actor, item = %item, error = %e, "item lookup failed");
                None
            }
        }
    }

    fn broadcast_info(&self, to_user_ids: Vec<UserId>, message: String) {
        self.outbound.emit(Message::Info(InfoBroadcast {
            to_user_ids,
            message,
        }));
    }

    fn user_display_name(&self, user: &UserId) -> String {
        self.directory
            .user(user)
            .map(|u| u.name)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    async fn actor_display_name(&self, actor: &ActorId) -> String {
        match self.host.actor_name(actor).await {
            Ok(Some(name)) => name,
            Ok(None) => "Unknown".to_string(),
            Err(e) => {
                warn!(actor = %actor, error = %e, "actor name lookup failed");
                "Unknown".to_string()
            }
        }
    }
}
