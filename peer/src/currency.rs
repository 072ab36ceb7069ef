//! Currency operations: self-service edits, cross-actor offers, and the
//! arbitrator's commit path.
//!
//! Self-service edits touch only one actor and commit locally through the
//! balance store. Cross-actor moves travel the offer protocol: the sender
//! broadcasts a `CurrencyOffer`, the recipient's peer prompts and broadcasts
//! a `CurrencyOfferDecision`, and the arbitrator alone commits, against
//! balances re-fetched at commit time rather than those the offer saw.

use std::sync::Arc;

use tablesync_ledger::{apply_exchange, settle, ExchangeOutcome};
use tablesync_messages::{
    CurrencyOffer, CurrencyOfferDecision, CurrencyRefresh, InfoBroadcast, Message, OfferTerms,
};
use tablesync_store::{ActorHost, BalanceStore};
use tablesync_types::{ActorId, Balance, Denomination, OfferId, UserId};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::directory::SessionDirectory;
use crate::events::{EventBus, NoticeLevel, PeerEvent};
use crate::gate::ArbitrationGate;
use crate::settled::SettledOffers;
use crate::transport::ChannelAdapter;
use crate::PeerError;

pub struct CurrencyEngine {
    config: Arc<SessionConfig>,
    gate: ArbitrationGate,
    host: Arc<dyn ActorHost>,
    balances: BalanceStore,
    directory: Arc<dyn SessionDirectory>,
    outbound: ChannelAdapter,
    events: Arc<EventBus>,
    settled: Mutex<SettledOffers>,
}

impl CurrencyEngine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: Arc<SessionConfig>,
        gate: ArbitrationGate,
        host: Arc<dyn ActorHost>,
        balances: BalanceStore,
        directory: Arc<dyn SessionDirectory>,
        outbound: ChannelAdapter,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            gate,
            host,
            balances,
            directory,
            outbound,
            events,
            settled: Mutex::new(SettledOffers::default()),
        }
    }

    /// Current balance of an actor, zero if none was ever stored.
    pub async fn balance_of(&self, actor: &ActorId) -> Result<Balance, PeerError> {
        Ok(self.balances.get(actor).await?)
    }

    // ── Self-service edits (single actor, no arbitration) ──────────────

    /// Credit coins to an actor this user owns.
    pub async fn add_coins(&self, actor: &ActorId, delta: Balance) -> Result<Balance, PeerError> {
        self.ensure_enabled()?;
        self.ensure_may_edit(actor)?;
        let current = self.balances.get(actor).await?;
        let updated = settle::add(current, &delta)?;
        self.persist_and_announce(actor, updated).await?;
        Ok(updated)
    }

    /// Debit an explicit per-denomination delta, all or nothing.
    pub async fn remove_coins_specific(
        &self,
        actor: &ActorId,
        delta: Balance,
    ) -> Result<Balance, PeerError> {
        self.ensure_enabled()?;
        self.ensure_may_edit(actor)?;
        let current = self.balances.get(actor).await?;
        let updated = settle::remove_specific(current, &delta)?;
        self.persist_and_announce(actor, updated).await?;
        Ok(updated)
    }

    /// Debit a value-mode amount, breaking larger coins as needed.
    pub async fn remove_coins_by_value(
        &self,
        actor: &ActorId,
        amount: u64,
        unit: Denomination,
    ) -> Result<Balance, PeerError> {
        self.ensure_enabled()?;
        self.ensure_may_edit(actor)?;
        let current = self.balances.get(actor).await?;
        let updated = settle::debit_value(current, amount, unit, &self.config.ratios)?;
        self.persist_and_announce(actor, updated).await?;
        Ok(updated)
    }

    /// Convert coins between denominations within one actor's purse.
    ///
    /// Upward conversions floor; the unconvertible remainder stays in the
    /// source denomination, so total value never changes.
    pub async fn exchange_coins(
        &self,
        actor: &ActorId,
        amount: u64,
        from: Denomination,
        to: Denomination,
    ) -> Result<(Balance, ExchangeOutcome), PeerError> {
        self.ensure_enabled()?;
        self.ensure_may_edit(actor)?;
        let outcome = tablesync_ledger::exchange(amount, from, to, &self.config.ratios)?;
        let current = self.balances.get(actor).await?;
        let updated = apply_exchange(current, amount, from, to, &self.config.ratios)?;
        self.persist_and_announce(actor, updated).await?;
        Ok((updated, outcome))
    }

    // ── Offer protocol, sender side ─────────────────────────────────────

    /// Broadcast a specific-mode offer: exact coins per denomination.
    pub async fn send_coins_specific(
        &self,
        from_actor: &ActorId,
        to_actor: &ActorId,
        delta: Balance,
    ) -> Result<OfferId, PeerError> {
        self.ensure_enabled()?;
        self.ensure_may_edit(from_actor)?;
        if delta.is_zero() {
            return Err(PeerError::EmptyOffer);
        }
        // Soft check against the cached balance; the arbitrator re-validates
        // against fresh state at commit.
        let current = self.balances.get(from_actor).await?;
        settle::remove_specific(current, &delta)?;
        self.send_offer(from_actor, to_actor, OfferTerms::Specific { delta })
            .await
    }

    /// Broadcast a value-mode offer: a scalar amount of one denomination.
    /// Which physical coins leave the sender is decided at commit time.
    pub async fn send_coins_by_value(
        &self,
        from_actor: &ActorId,
        to_actor: &ActorId,
        amount: u64,
        unit: Denomination,
    ) -> Result<OfferId, PeerError> {
        self.ensure_enabled()?;
        self.ensure_may_edit(from_actor)?;
        if amount == 0 {
            return Err(PeerError::EmptyOffer);
        }
        let current = self.balances.get(from_actor).await?;
        settle::debit_value(current, amount, unit, &self.config.ratios)?;
        self.send_offer(from_actor, to_actor, OfferTerms::Value { amount, unit })
            .await
    }

    /// Callers gate on toggle and ownership before building the offer.
    async fn send_offer(
        &self,
        from_actor: &ActorId,
        to_actor: &ActorId,
        terms: OfferTerms,
    ) -> Result<OfferId, PeerError> {
        if from_actor == to_actor {
            return Err(PeerError::RecipientUnavailable(
                "offer targets the sending actor".to_string(),
            ));
        }
        let offer = CurrencyOffer {
            id: OfferId::new(),
            sender_id: from_actor.clone(),
            recipient_id: to_actor.clone(),
            terms,
        };
        let id = offer.id;
        info!(offer = %id, from = %from_actor, to = %to_actor, "broadcasting coin offer");
        self.outbound.emit(Message::CurrencyOffer(offer));
        Ok(id)
    }

    /// Answer a delivered offer. The decision echoes the full offer so the
    /// arbitrator needs no local offer state.
    pub fn respond_to_offer(
        &self,
        offer: CurrencyOffer,
        accepted: bool,
    ) -> Result<(), PeerError> {
        self.ensure_enabled()?;
        self.outbound
            .emit(Message::CurrencyOfferDecision(CurrencyOfferDecision {
                id: offer.id,
                accepted,
                offer,
            }));
        Ok(())
    }

    // ── Offer protocol, receiving side ──────────────────────────────────

    /// Every peer sees every offer; prompt only if this user owns the
    /// recipient actor, or this peer arbitrates.
    pub async fn handle_offer(&self, offer: CurrencyOffer) -> Result<(), PeerError> {
        if !self.config.enable_currency {
            debug!("currency disabled, offer ignored");
            return Ok(());
        }
        let owns_recipient = self
            .directory
            .owns_actor(self.gate.user_id(), &offer.recipient_id);
        if !self.gate.currency_offer_concerns_us(owns_recipient) {
            return Ok(());
        }
        let sender_name = self.display_name_of(&offer.sender_id).await;
        self.events
            .emit(&PeerEvent::CurrencyOfferPrompt { offer, sender_name });
        Ok(())
    }

    pub async fn handle_decision(
        &self,
        decision: CurrencyOfferDecision,
    ) -> Result<(), PeerError> {
        if !self.config.enable_currency {
            debug!("currency disabled, decision ignored");
            return Ok(());
        }
        if !self.gate.may_commit() {
            self.toast_decision_to_sender(&decision).await;
            return Ok(());
        }

        {
            let mut settled = self.settled.lock().await;
            if settled.contains(&decision.id) {
                debug!(offer = %decision.id, "decision replayed for settled offer, dropped");
                return Ok(());
            }
            settled.insert(decision.id);
        }

        let offer = &decision.offer;
        if !decision.accepted {
            info!(offer = %decision.id, "coin offer declined");
            let recipient_name = self.display_name_of(&offer.recipient_id).await;
            self.broadcast_info(
                self.with_arbitrators(self.directory.owners_of(&offer.sender_id)),
                format!("{recipient_name} declined the coin offer"),
            );
            return Ok(());
        }

        // Commit-time failures become notifications, never errors thrown
        // back through dispatch.
        if let Err(e) = self.commit_offer(offer).await {
            warn!(offer = %decision.id, error = %e, "coin offer commit failed");
            self.broadcast_info(
                self.with_arbitrators(self.directory.owners_of(&offer.sender_id)),
                format!("Coin transfer failed: {e}"),
            );
        }
        Ok(())
    }

    /// The arbitrator's commit: re-fetch both balances, validate, debit the
    /// sender, credit the recipient. Nothing persists if validation fails.
    async fn commit_offer(&self, offer: &CurrencyOffer) -> Result<(), PeerError> {
        if offer.sender_id == offer.recipient_id {
            return Err(PeerError::RecipientUnavailable(
                "offer targets the sending actor".to_string(),
            ));
        }
        for actor in [&offer.sender_id, &offer.recipient_id] {
            if !self.host.actor_exists(actor).await? {
                return Err(PeerError::RecipientUnavailable(format!(
                    "actor {actor} not found"
                )));
            }
        }

        let sender_balance = self.balances.get(&offer.sender_id).await?;
        let recipient_balance = self.balances.get(&offer.recipient_id).await?;
        let ratios = &self.config.ratios;

        let (new_sender, new_recipient) = match &offer.terms {
            OfferTerms::Specific { delta } => {
                let debited = settle::remove_specific(sender_balance, delta)?;
                let credited = settle::add(recipient_balance, delta)?;
                (debited, credited)
            }
            OfferTerms::Value { amount, unit } => {
                let debited = settle::debit_value(sender_balance, *amount, *unit, ratios)?;
                let credited = settle::credit_value(recipient_balance, *amount, *unit, ratios)?;
                (debited, credited)
            }
        };

        self.balances.set(&offer.sender_id, new_sender).await?;
        if let Err(e) = self.balances.set(&offer.recipient_id, new_recipient).await {
            // The debit persisted but the credit did not. Flag it; nothing
            // here rolls back.
            error!(
                offer = %offer.id,
                error = %e,
                "recipient credit failed after sender debit, balances inconsistent"
            );
            self.broadcast_info(
                self.parties(offer),
                "Coin transfer failed partway; balances may need correction".to_string(),
            );
            return Ok(());
        }

        let sender_name = self.display_name_of(&offer.sender_id).await;
        let recipient_name = self.display_name_of(&offer.recipient_id).await;
        let what = describe_terms(&offer.terms);
        info!(offer = %offer.id, "coin offer committed: {sender_name} -> {recipient_name} ({what})");
        self.broadcast_info(
            self.parties(offer),
            format!("{sender_name} sent {what} to {recipient_name}"),
        );
        self.outbound.emit(Message::CurrencyRefresh(CurrencyRefresh {
            actor_ids: vec![offer.sender_id.clone(), offer.recipient_id.clone()],
        }));
        Ok(())
    }

    /// Balance-change fanout: every peer re-reads the listed actors.
    pub fn handle_refresh(&self, refresh: CurrencyRefresh) -> Result<(), PeerError> {
        if !self.config.enable_currency {
            return Ok(());
        }
        for actor in refresh.actor_ids {
            self.events.emit(&PeerEvent::BalanceChanged { actor });
        }
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn ensure_enabled(&self) -> Result<(), PeerError> {
        if self.config.enable_currency {
            Ok(())
        } else {
            Err(PeerError::NotPermitted("currency is disabled"))
        }
    }

    /// Only an owning user or the arbitrator may edit an actor's coins.
    fn ensure_may_edit(&self, actor: &ActorId) -> Result<(), PeerError> {
        if self.gate.may_commit() || self.directory.owns_actor(self.gate.user_id(), actor) {
            Ok(())
        } else {
            Err(PeerError::NotPermitted(
                "only the owner or the arbitrator may edit an actor's coins",
            ))
        }
    }

    async fn persist_and_announce(
        &self,
        actor: &ActorId,
        balance: Balance,
    ) -> Result<(), PeerError> {
        self.balances.set(actor, balance).await?;
        // The refresh echoes back to this peer too; BalanceChanged fires
        // from the echo, keeping one code path for local and remote edits.
        self.outbound.emit(Message::CurrencyRefresh(CurrencyRefresh {
            actor_ids: vec![actor.clone()],
        }));
        Ok(())
    }

    /// A non-committing peer that owns the sending actor gets a toast when
    /// the recipient answers; nobody else reacts.
    async fn toast_decision_to_sender(&self, decision: &CurrencyOfferDecision) {
        let offer = &decision.offer;
        if !self
            .directory
            .owns_actor(self.gate.user_id(), &offer.sender_id)
        {
            return;
        }
        let recipient_name = self.display_name_of(&offer.recipient_id).await;
        let verb = if decision.accepted { "accepted" } else { "declined" };
        self.events.emit(&PeerEvent::Notice {
            level: NoticeLevel::Info,
            text: format!("{recipient_name} {verb} your coin offer"),
        });
    }

    fn broadcast_info(&self, to_user_ids: Vec<UserId>, message: String) {
        self.outbound.emit(Message::Info(InfoBroadcast {
            to_user_ids,
            message,
        }));
    }

    /// Owners of both sides of an offer plus the arbitrator users,
    /// deduplicated.
    fn parties(&self, offer: &CurrencyOffer) -> Vec<UserId> {
        let mut users = self.directory.owners_of(&offer.sender_id);
        for user in self.directory.owners_of(&offer.recipient_id) {
            if !users.contains(&user) {
                users.push(user);
            }
        }
        self.with_arbitrators(users)
    }

    /// Appends the arbitrator users to a notice recipient list. An empty
    /// `to_user_ids` addresses everyone, so a list built from actor owners
    /// alone would broadcast a private notice whenever no user owns the
    /// actors involved.
    fn with_arbitrators(&self, mut users: Vec<UserId>) -> Vec<UserId> {
        for user in self.directory.active_users() {
            if user.is_arbitrator && !users.contains(&user.id) {
                users.push(user.id);
            }
        }
        users
    }

    async fn display_name_of(&self, actor: &ActorId) -> String {
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

fn describe_terms(terms: &OfferTerms) -> String {
    match terms {
        OfferTerms::Specific { delta } => delta.to_string(),
        OfferTerms::Value { amount, unit } => format!("{amount} {unit}"),
    }
}
