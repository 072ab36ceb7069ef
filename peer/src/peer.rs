//! The session peer: engine wiring plus inbound message dispatch.

use std::sync::Arc;

use tablesync_messages::{Envelope, InfoBroadcast, Message};
use tablesync_store::{ActorHost, BalanceStore};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::currency::CurrencyEngine;
use crate::directory::SessionDirectory;
use crate::events::{EventBus, NoticeLevel, PeerEvent};
use crate::gate::ArbitrationGate;
use crate::items::ItemEngine;
use crate::rolls::RollEngine;
use crate::transport::ChannelAdapter;
use crate::PeerError;

/// One connected process in a session.
///
/// Owns the three engines and the dispatch loop. All inter-peer traffic
/// arrives through [`Peer::run`] (or [`Peer::handle_envelope`] directly);
/// user intent arrives through the engines' public operations.
pub struct Peer {
    config: Arc<SessionConfig>,
    gate: ArbitrationGate,
    events: Arc<EventBus>,
    currency: CurrencyEngine,
    items: ItemEngine,
    rolls: RollEngine,
}

impl Peer {
    /// Wire a peer from its config and collaborators.
    ///
    /// Subscribe presentation listeners on `events` before calling this;
    /// the bus is shared immutably afterwards.
    pub fn new(
        config: SessionConfig,
        host: Arc<dyn ActorHost>,
        directory: Arc<dyn SessionDirectory>,
        outbound: ChannelAdapter,
        events: EventBus,
    ) -> Self {
        let config = Arc::new(config);
        let gate = ArbitrationGate::new(config.role, config.user_id.clone());
        let events = Arc::new(events);
        let balances = BalanceStore::new(host.clone());

        let currency = CurrencyEngine::new(
            config.clone(),
            gate.clone(),
            host.clone(),
            balances,
            directory.clone(),
            outbound.clone(),
            events.clone(),
        );
        let items = ItemEngine::new(
            config.clone(),
            gate.clone(),
            host,
            directory.clone(),
            outbound.clone(),
            events.clone(),
        );
        let rolls = RollEngine::new(
            config.clone(),
            gate.clone(),
            directory,
            outbound,
            events.clone(),
        );

        info!(user = %config.user_id, role = ?config.role, "session peer ready");
        Self {
            config,
            gate,
            events,
            currency,
            items,
            rolls,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn gate(&self) -> &ArbitrationGate {
        &self.gate
    }

    pub fn currency(&self) -> &CurrencyEngine {
        &self.currency
    }

    pub fn items(&self) -> &ItemEngine {
        &self.items
    }

    pub fn rolls(&self) -> &RollEngine {
        &self.rolls
    }

    /// Process inbound envelopes until the channel closes.
    ///
    /// One at a time, each handler run to completion before the next
    /// message is looked at; a peer never observes torn state from its own
    /// handlers.
    pub async fn run(&self, mut inbox: UnboundedReceiver<Envelope>) {
        while let Some(envelope) = inbox.recv().await {
            self.handle_envelope(envelope).await;
        }
        debug!("inbound channel closed, peer loop ended");
    }

    /// Dispatch one envelope. Handler errors are logged, never fatal.
    pub async fn handle_envelope(&self, envelope: Envelope) {
        if !envelope.is_module_channel() {
            debug!(channel = %envelope.channel, "ignoring foreign channel traffic");
            return;
        }
        let result = match envelope.message {
            Message::CurrencyOffer(offer) => self.currency.handle_offer(offer).await,
            Message::CurrencyOfferDecision(decision) => {
                self.currency.handle_decision(decision).await
            }
            Message::CurrencyRefresh(refresh) => self.currency.handle_refresh(refresh),
            Message::ItemTransferRequest(request) => self.items.handle_request(request).await,
            Message::ItemTransferOffer(offer) => self.items.handle_offer(offer),
            Message::ItemTransferResponse(response) => self.items.handle_response(response).await,
            Message::Info(info) => self.handle_info(info),
            Message::RollRequest(request) => self.rolls.handle_request(request),
        };
        if let Err(e) = result {
            warn!(error = %e, "message handling failed");
        }
    }

    /// Info broadcasts become toasts on every listed peer; an empty list
    /// addresses everyone.
    fn handle_info(&self, info: InfoBroadcast) -> Result<(), PeerError> {
        if !self.gate.info_concerns_us(&info.to_user_ids) {
            return Ok(());
        }
        self.events.emit(&PeerEvent::Notice {
            level: NoticeLevel::Info,
            text: info.message,
        });
        Ok(())
    }
}
