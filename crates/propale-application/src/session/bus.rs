//! Per-session event channel.
//!
//! One unbounded channel per session: the orchestrator publishes, an external
//! streaming relay pulls. At most one consumer may attach; without a consumer,
//! events accumulate until the session is removed from the registry.

use tokio::sync::Mutex;
use tokio::sync::mpsc;

use propale_core::SessionEvent;

/// Ordered, best-effort event channel for one session.
pub struct SessionEventBus {
    sender: mpsc::UnboundedSender<SessionEvent>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<SessionEvent>>>,
}

impl SessionEventBus {
    /// Creates the channel pair for a new session.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// Publishes an event; never blocks.
    pub fn publish(&self, event: SessionEvent) {
        tracing::debug!(kind = event.kind(), "publishing session event");
        // Non-blocking send - if the consumer went away we just skip
        let _ = self.sender.send(event);
    }

    /// Hands out the consumer end, once.
    ///
    /// Returns `None` if a consumer already attached; this channel is
    /// explicitly single-consumer.
    pub async fn take_stream(&self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.receiver.lock().await.take()
    }
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new()
    }
}
