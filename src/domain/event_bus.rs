//! Broadcast channel for freshly posted notifications.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every accepted
//! notification is published through the bus, and each SSE connection
//! subscribes to receive it.

use tokio::sync::broadcast;

use super::Notification;

/// Broadcast bus for [`Notification`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Notification>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Returns the number of receivers that received it. With no active
    /// receivers the notification is silently dropped.
    pub fn publish(&self, notification: Notification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AlertType, NotificationId};

    fn make_notification(id: NotificationId) -> Notification {
        Notification {
            id,
            name: Some("Gate".to_string()),
            time: None,
            message: Some("Visitor at the gate".to_string()),
            location: Some("gate".to_string()),
            image: None,
            alert_type: AlertType::Info,
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(make_notification(NotificationId::new())), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_the_same_notification() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let id = NotificationId::new();
        assert_eq!(bus.publish(make_notification(id)), 2);

        let Ok(n1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(n2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(n1.id, id);
        assert_eq!(n2.id, id);
    }

    #[test]
    fn dropped_subscribers_stop_counting() {
        let bus = EventBus::new(16);
        let rx = bus.subscribe();
        drop(rx);
        assert_eq!(bus.publish(make_notification(NotificationId::new())), 0);
    }
}
