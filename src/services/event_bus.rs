//! Cross-window publish/subscribe over a closed set of events.
//!
//! Backed by a `tokio::sync::broadcast` channel: every subscriber sees every
//! envelope published after it subscribed, at most once. A subscriber that
//! falls behind the channel capacity loses the oldest envelopes.

use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::types::events::{BrowserEvent, Envelope, WindowId};

/// Default number of envelopes buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Envelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Fire-and-forget; having no subscribers is not an error.
    pub fn publish(&self, origin: &str, event: BrowserEvent) {
        let envelope = Envelope {
            origin: origin.to_string(),
            event,
        };
        if self.tx.send(envelope).is_err() {
            tracing::trace!("broadcast with no subscribers");
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// A publisher bound to one window's id.
    pub fn publisher(&self, origin: &str) -> Publisher {
        Publisher {
            bus: self.clone(),
            origin: origin.to_string(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Publishes on behalf of a fixed origin window.
#[derive(Clone)]
pub struct Publisher {
    bus: EventBus,
    origin: WindowId,
}

impl Publisher {
    pub fn publish(&self, event: BrowserEvent) {
        self.bus.publish(&self.origin, event);
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

/// One window's receiving end.
pub struct Subscription {
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    /// Returns every envelope received since the last drain, without waiting.
    pub fn drain(&mut self) -> Vec<Envelope> {
        let mut pending = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(envelope) => pending.push(envelope),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "broadcast subscriber lagged, events lost");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        pending
    }
}
