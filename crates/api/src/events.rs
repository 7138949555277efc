//! Fan-out of collection lifecycle changes.
//!
//! Handlers publish after their transaction commits; subscribers (the aging refresher in
//! the server binary) recompute whatever depends on the agent's outstanding cash.
//! Publishing never blocks a request and is a no-op when nobody listens.

use codledger_core::collections::CollectionEvent;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast channel of [`CollectionEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CollectionEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl EventBus {
    /// Sends `event` to every current subscriber.
    pub fn publish(&self, event: CollectionEvent) {
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(?event, receivers, "Collection event published");
            }
            Err(_) => {
                tracing::trace!(?event, "No subscribers for collection event");
            }
        }
    }

    /// Sends each event in order.
    pub fn publish_all(&self, events: impl IntoIterator<Item = CollectionEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// New receiver that sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codledger_shared::types::{AgentId, CollectionId};

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let agent_id = AgentId::new();
        let event = CollectionEvent::CollectionVerified {
            collection_id: CollectionId::new(),
            agent_id,
        };

        bus.publish(event);

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event);
        assert_eq!(received.agent_id(), agent_id);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::default();
        bus.publish_all([CollectionEvent::DepositVerified {
            deposit_id: codledger_shared::types::DepositId::new(),
            agent_id: AgentId::new(),
        }]);
    }
}
