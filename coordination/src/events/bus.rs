//! Event bus for desk coordination
//!
//! Pub/sub messaging over a Tokio broadcast channel. Publishing with no
//! subscribers is not an error; the session records remain the source of
//! truth and events are an observability layer on top.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::types::DeskEvent;

/// Channel capacity for broadcast
const CHANNEL_CAPACITY: usize = 256;

/// Shared reference to an EventBus
pub type SharedEventBus = Arc<EventBus>;

/// Event bus backed by a broadcast channel
pub struct EventBus {
    sender: broadcast::Sender<DeskEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Create a shared reference to this event bus
    pub fn shared(self) -> SharedEventBus {
        Arc::new(self)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: DeskEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(count) => debug!(event_type, receivers = count, "Event published"),
            Err(_) => debug!(event_type, "Event published (no receivers)"),
        }
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.sender.subscribe()
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if the bus has any subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
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
    use chrono::Utc;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();
        assert!(bus.has_subscribers());

        bus.publish(DeskEvent::CoordinationStarted {
            decision_type: "trading".to_string(),
            agents: 3,
            timestamp: Utc::now(),
        });

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_type(), "coordination_started");
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        // Must not panic or error
        bus.publish(DeskEvent::AgentActivationChanged {
            agent_id: "a-1".to_string(),
            active: false,
            timestamp: Utc::now(),
        });
    }
}
