//! Channel transport: fire-and-forget outbound emits plus an in-process
//! broadcast hub with the module channel's delivery semantics.

use tablesync_messages::{Envelope, Message};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::warn;

/// Outbound half of the broadcast channel.
///
/// `emit` never fails from the caller's point of view: delivery is
/// at-most-once with no acknowledgement, so a closed channel is logged
/// and the message is dropped, exactly as a disconnected socket would
/// drop it.
#[derive(Clone)]
pub struct ChannelAdapter {
    tx: UnboundedSender<Envelope>,
}

impl ChannelAdapter {
    pub fn new(tx: UnboundedSender<Envelope>) -> Self {
        Self { tx }
    }

    /// Broadcast a message on the module channel.
    pub fn emit(&self, message: Message) {
        let envelope = Envelope::on_module_channel(message);
        if self.tx.send(envelope).is_err() {
            warn!("outbound channel closed, message dropped");
        }
    }
}

struct PeerLink {
    outbox: UnboundedReceiver<Envelope>,
    inbox: UnboundedSender<Envelope>,
}

/// In-process hub that fans every emitted envelope out to every attached
/// peer, the emitter included.
///
/// Drives multi-peer tests and hostless embeddings. `dispatch_pending`
/// moves messages synchronously, so a test can emit, dispatch, then
/// assert, with no background task racing the assertions.
#[derive(Default)]
pub struct MemoryHub {
    links: Mutex<Vec<PeerLink>>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one peer: returns its outbound adapter and its inbox.
    pub async fn attach(&self) -> (ChannelAdapter, UnboundedReceiver<Envelope>) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        self.links.lock().await.push(PeerLink {
            outbox: out_rx,
            inbox: in_tx,
        });
        (ChannelAdapter::new(out_tx), in_rx)
    }

    /// Deliver every queued envelope to every inbox, repeating until no
    /// peer has anything left queued. Returns how many envelopes moved.
    pub async fn dispatch_pending(&self) -> usize {
        let mut links = self.links.lock().await;
        let mut moved = 0;
        loop {
            let mut batch = Vec::new();
            for link in links.iter_mut() {
                while let Ok(envelope) = link.outbox.try_recv() {
                    batch.push(envelope);
                }
            }
            if batch.is_empty() {
                break;
            }
            moved += batch.len();
            for envelope in batch {
                for link in links.iter() {
                    // A detached peer's inbox is gone; skip it.
                    let _ = link.inbox.send(envelope.clone());
                }
            }
        }
        moved
    }
}
