//! # Subscription Broker
//!
//! The only shared mutable state in the relay: which connection is
//! subscribed to which channel, and how to push a frame to it. Both maps
//! are sharded (`DashMap`), so traffic on one channel never contends
//! with another.
//!
//! ## Delivery semantics
//!
//! At-most-once. A broadcast snapshots the channel's subscriber set,
//! then pushes the encoded frame into each subscriber's bounded queue
//! with `try_send`: a full or closed queue drops that subscriber's frame
//! and the broadcast moves on. A slow subscriber can only ever lose its
//! own frames.

use dashmap::DashMap;
use ep_01_message_authority::FanoutGateway;
use shared_types::{DeliveryEnvelope, RelayMessage, SubscriberFrame};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier assigned to a connection at registration. Never travels on
/// the wire.
pub type ConnectionId = Uuid;

/// One registered subscriber connection.
struct ConnectionEntry {
    /// Frame queue toward the subscriber.
    sender: mpsc::Sender<String>,
    /// Channels this connection is registered for.
    channels: Vec<String>,
}

/// Point-in-time broker counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokerStats {
    /// Messages accepted for fanout.
    pub messages_published: u64,
    /// Frames handed into subscriber queues.
    pub frames_delivered: u64,
    /// Frames dropped on full or closed queues.
    pub frames_dropped: u64,
}

/// Channel registry and fanout engine.
pub struct SubscriptionBroker {
    /// Channel name to the ids subscribed to it.
    channels: DashMap<String, HashSet<ConnectionId>>,
    /// Connection id to its queue and channel list.
    connections: DashMap<ConnectionId, ConnectionEntry>,
    /// Messages accepted for fanout.
    messages_published: AtomicU64,
    /// Frames handed into subscriber queues.
    frames_delivered: AtomicU64,
    /// Frames dropped on full or closed queues.
    frames_dropped: AtomicU64,
}

impl SubscriptionBroker {
    /// Create an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            connections: DashMap::new(),
            messages_published: AtomicU64::new(0),
            frames_delivered: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
        }
    }

    /// Register a connection for a set of channels.
    ///
    /// Returns the id the session must later pass to [`unregister`].
    /// Registering the same sender twice creates two independent
    /// registrations; the session owns exactly one.
    ///
    /// [`unregister`]: SubscriptionBroker::unregister
    pub fn register(&self, channels: Vec<String>, sender: mpsc::Sender<String>) -> ConnectionId {
        let id = Uuid::new_v4();
        for channel in &channels {
            self.channels.entry(channel.clone()).or_default().insert(id);
        }
        self.connections
            .insert(id, ConnectionEntry { sender, channels });
        debug!(connection = %id, "Subscriber registered");
        id
    }

    /// Remove a connection from every channel it was registered for.
    ///
    /// Idempotent; called proactively by the subscriber session when the
    /// transport closes or errors.
    pub fn unregister(&self, id: ConnectionId) {
        let Some((_, entry)) = self.connections.remove(&id) else {
            return;
        };
        for channel in &entry.channels {
            if let Some(mut subscribers) = self.channels.get_mut(channel) {
                subscribers.remove(&id);
            }
        }
        // Sweep empty channel sets in a second pass so no shard guard is
        // held across the removal.
        for channel in &entry.channels {
            self.channels.remove_if(channel, |_, subs| subs.is_empty());
        }
        debug!(connection = %id, "Subscriber unregistered");
    }

    /// Fan a message out to everyone subscribed to `channel` right now.
    ///
    /// The subscriber set is snapshotted once at dispatch: connections
    /// registered after the snapshot see nothing of this message, and a
    /// registration change mid-broadcast cannot tear the delivery.
    pub fn publish(&self, channel: &str, message: RelayMessage) -> usize {
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let targets: Vec<ConnectionId> = match self.channels.get(channel) {
            Some(subscribers) => subscribers.iter().copied().collect(),
            None => Vec::new(),
        };
        if targets.is_empty() {
            debug!(channel = %channel, "No subscribers; message evaporates");
            return 0;
        }

        let frame = serde_json::to_string(&SubscriberFrame::Delivery(DeliveryEnvelope {
            channel: channel.to_string(),
            message,
        }))
        .expect("delivery frames serialize to JSON");

        let mut delivered = 0;
        for id in targets {
            let Some(entry) = self.connections.get(&id) else {
                continue;
            };
            match entry.sender.try_send(frame.clone()) {
                Ok(()) => {
                    delivered += 1;
                    self.frames_delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(_) => {
                    self.frames_dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        connection = %id,
                        channel = %channel,
                        "Subscriber queue unavailable; frame dropped"
                    );
                }
            }
        }
        debug!(channel = %channel, delivered, "Broadcast complete");
        delivered
    }

    /// Number of connections currently subscribed to a channel.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, |subs| subs.len())
    }

    /// Number of live registered connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Snapshot the delivery counters.
    #[must_use]
    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            messages_published: self.messages_published.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for SubscriptionBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapter handing accepted messages from the authority to a shared
/// broker.
pub struct BrokerFanout {
    broker: Arc<SubscriptionBroker>,
}

impl BrokerFanout {
    /// Wrap a shared broker as the authority's fanout gateway.
    #[must_use]
    pub fn new(broker: Arc<SubscriptionBroker>) -> Self {
        Self { broker }
    }
}

#[async_trait::async_trait]
impl FanoutGateway for BrokerFanout {
    async fn broadcast(&self, channel: &str, message: RelayMessage) -> usize {
        self.broker.publish(channel, message)
    }
}
