//! Events surfaced to the embedding presentation layer.

use tablesync_messages::{CurrencyOffer, ItemTransferOffer, RollRequest};
use tablesync_types::ActorId;

/// Severity of a [`PeerEvent::Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// Peer-level events that observers can subscribe to via the [`EventBus`].
///
/// Prompts are fire-and-forget: the handler that publishes one returns
/// immediately, and the user's answer comes back later through the
/// engine's `respond_*` operation.
#[derive(Clone, Debug)]
pub enum PeerEvent {
    /// A currency offer addressed to an actor this user owns (or this peer
    /// arbitrates) awaits an accept/decline choice.
    CurrencyOfferPrompt {
        offer: CurrencyOffer,
        sender_name: String,
    },
    /// An item offer addressed to this user awaits an accept/decline choice.
    ItemOfferPrompt { offer: ItemTransferOffer },
    /// The arbitrator asked this user to make a skill roll.
    RollPrompt {
        request: RollRequest,
        gm_name: String,
    },
    /// A toast-style notification.
    Notice { level: NoticeLevel, text: String },
    /// An actor's balance changed; any view of it should re-read.
    BalanceChanged { actor: ActorId },
}

/// Synchronous fan-out event bus for peer events.
///
/// Listeners are invoked inline on the emitting task; keep handlers fast to
/// avoid stalling message dispatch.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&PeerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&PeerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &PeerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&PeerEvent::BalanceChanged {
            actor: "a1".into(),
        });

        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::new();
        bus.emit(&PeerEvent::Notice {
            level: NoticeLevel::Info,
            text: "hello".into(),
        }); // should not panic
    }

    #[test]
    fn listener_sees_correct_variant() {
        let notices = Arc::new(AtomicUsize::new(0));
        let refreshes = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let n = Arc::clone(&notices);
        let r = Arc::clone(&refreshes);
        bus.subscribe(Box::new(move |event| match event {
            PeerEvent::Notice { .. } => {
                n.fetch_add(1, Ordering::SeqCst);
            }
            PeerEvent::BalanceChanged { .. } => {
                r.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }));

        bus.emit(&PeerEvent::Notice {
            level: NoticeLevel::Warn,
            text: "low funds".into(),
        });
        bus.emit(&PeerEvent::BalanceChanged {
            actor: "a1".into(),
        });

        assert_eq!(notices.load(Ordering::SeqCst), 1);
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }
}
