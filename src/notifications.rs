//! Publish/subscribe registry for order and payout events.
//!
//! The hub is a single task that owns the recipient map; clients talk to it
//! through its mailbox. A subscription is an explicit handle: dropping it
//! disconnects the recipient and the hub prunes the entry on its next
//! delivery attempt or count. Delivery is best effort, never exactly-once.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::domain::{Money, OrderId, OrderStatus, PayoutId, RecipientId};
use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    OrderPlaced { order_id: OrderId, total: Money },
    OrderStatusChanged { order_id: OrderId, from: OrderStatus, to: OrderStatus },
    OrderCancelled { order_id: OrderId, note: Option<String> },
    PayoutCreated { payout_id: PayoutId, total_payout: Money },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub recipient: RecipientId,
    pub event: NotificationEvent,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(recipient: impl Into<RecipientId>, event: NotificationEvent, at: DateTime<Utc>) -> Self {
        Self { recipient: recipient.into(), event, at }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotificationError {
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl NotificationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Internal
    }
}

/// Receiving end of one recipient's feed.
#[derive(Debug)]
pub struct Subscription {
    recipient: RecipientId,
    receiver: mpsc::Receiver<Notification>,
}

impl Subscription {
    pub fn recipient(&self) -> &RecipientId {
        &self.recipient
    }

    /// Waits for the next event. `None` once the hub has dropped this feed.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Notification> {
        self.receiver.try_recv().ok()
    }
}

// =============================================================================
// Messages
// =============================================================================

type ServiceResponse<T> = oneshot::Sender<Result<T, NotificationError>>;

#[derive(Debug)]
pub enum HubRequest {
    Subscribe { recipient: RecipientId, respond_to: ServiceResponse<Subscription> },
    Unsubscribe { recipient: RecipientId, respond_to: ServiceResponse<bool> },
    SubscriberCount { respond_to: ServiceResponse<usize> },
    Publish { notification: Notification },
}

// =============================================================================
// Hub
// =============================================================================

pub struct NotificationHub {
    receiver: mpsc::Receiver<HubRequest>,
    subscribers: HashMap<RecipientId, mpsc::Sender<Notification>>,
    feed_capacity: usize,
}

impl NotificationHub {
    /// `feed_capacity` bounds each recipient's undelivered backlog.
    pub fn new(buffer_size: usize, feed_capacity: usize) -> (Self, NotificationClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let hub = Self { receiver, subscribers: HashMap::new(), feed_capacity: feed_capacity.max(1) };
        (hub, NotificationClient { sender })
    }

    #[instrument(name = "notification_hub", skip(self))]
    pub async fn run(mut self) {
        info!("Notification hub starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                HubRequest::Subscribe { recipient, respond_to } => {
                    let (tx, rx) = mpsc::channel(self.feed_capacity);
                    if self.subscribers.insert(recipient.clone(), tx).is_some() {
                        debug!(recipient = %recipient, "Replaced existing subscription");
                    }
                    let _ = respond_to.send(Ok(Subscription { recipient, receiver: rx }));
                }
                HubRequest::Unsubscribe { recipient, respond_to } => {
                    let _ = respond_to.send(Ok(self.subscribers.remove(&recipient).is_some()));
                }
                HubRequest::SubscriberCount { respond_to } => {
                    self.subscribers.retain(|_, feed| !feed.is_closed());
                    let _ = respond_to.send(Ok(self.subscribers.len()));
                }
                HubRequest::Publish { notification } => self.deliver(notification),
            }
        }
        info!("Notification hub stopped");
    }

    fn deliver(&mut self, notification: Notification) {
        let recipient = notification.recipient.clone();
        let Some(feed) = self.subscribers.get(&recipient) else {
            debug!(recipient = %recipient, "No subscriber, dropping event");
            return;
        };
        match feed.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(recipient = %recipient, "Subscriber feed full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(recipient = %recipient, "Subscriber disconnected");
                self.subscribers.remove(&recipient);
            }
        }
    }
}

// =============================================================================
// Client
// =============================================================================

#[derive(Clone)]
pub struct NotificationClient {
    sender: mpsc::Sender<HubRequest>,
}

impl NotificationClient {
    /// Fire-and-forget. Never waits on the hub; a saturated hub drops the event.
    pub fn publish(&self, notification: Notification) {
        match self.sender.try_send(HubRequest::Publish { notification }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!("Notification hub saturated, dropping event"),
            Err(TrySendError::Closed(_)) => debug!("Notification hub closed, dropping event"),
        }
    }
}

crate::client_method!(NotificationClient => fn subscribe(recipient: RecipientId) -> Subscription as HubRequest::Subscribe, Error = NotificationError);
crate::client_method!(NotificationClient => fn unsubscribe(recipient: RecipientId) -> bool as HubRequest::Unsubscribe, Error = NotificationError);
crate::client_method!(NotificationClient => fn subscriber_count() -> usize as HubRequest::SubscriberCount, Error = NotificationError);

#[cfg(test)]
mod tests {
    use super::*;

    fn start(feed_capacity: usize) -> NotificationClient {
        let (hub, client) = NotificationHub::new(16, feed_capacity);
        tokio::spawn(hub.run());
        client
    }

    fn placed(recipient: &str, order: &str) -> Notification {
        Notification::new(
            RecipientId::new(recipient),
            NotificationEvent::OrderPlaced { order_id: OrderId::new(order), total: Money::new(10) },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_subscriber_receives_only_own_events() {
        let hub = start(8);
        let mut alice = hub.subscribe(RecipientId::new("alice")).await.unwrap();

        hub.publish(placed("bob", "order_1"));
        hub.publish(placed("alice", "order_2"));

        let received = alice.recv().await.unwrap();
        assert_eq!(received.recipient, RecipientId::new("alice"));
        assert!(matches!(received.event, NotificationEvent::OrderPlaced { ref order_id, .. } if order_id.as_str() == "order_2"));
        assert!(alice.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_pruned() {
        let hub = start(8);
        let first = hub.subscribe(RecipientId::new("alice")).await.unwrap();
        let _second = hub.subscribe(RecipientId::new("bob")).await.unwrap();
        assert_eq!(hub.subscriber_count().await.unwrap(), 2);

        drop(first);
        assert_eq!(hub.subscriber_count().await.unwrap(), 1);
        assert!(hub.unsubscribe(RecipientId::new("bob")).await.unwrap());
        assert!(!hub.unsubscribe(RecipientId::new("bob")).await.unwrap());
        assert_eq!(hub.subscriber_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_feed() {
        let hub = start(8);
        let mut old = hub.subscribe(RecipientId::new("alice")).await.unwrap();
        let mut new = hub.subscribe(RecipientId::new("alice")).await.unwrap();

        hub.publish(placed("alice", "order_1"));
        assert!(new.recv().await.is_some());
        // The replaced sender was dropped by the hub.
        assert!(old.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_full_feed_drops_events() {
        let hub = start(1);
        let mut alice = hub.subscribe(RecipientId::new("alice")).await.unwrap();

        hub.publish(placed("alice", "order_1"));
        hub.publish(placed("alice", "order_2"));
        // Round-trip through the mailbox so both publishes have been handled.
        hub.subscriber_count().await.unwrap();

        assert!(alice.try_recv().is_some());
        assert!(alice.try_recv().is_none());
    }
}
