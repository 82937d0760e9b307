//! # Subscriber Session
//!
//! Drives one duplex connection from handshake to teardown. The session
//! owns the connection's lifecycle; the broker only holds the frame
//! sender, so the session must deregister proactively when the client
//! side goes away.
//!
//! Frame order on a connection: the handshake is the first client frame,
//! the ack (or rejection) is the first relay frame, and only then may
//! deliveries flow. The ack is enqueued before the connection registers
//! with the broker, so no concurrent publish can slot a delivery ahead
//! of it on the shared frame channel.

use crate::broker::SubscriptionBroker;
use ep_01_message_authority::MessageAuthorityApi;
use shared_types::{FrameConn, SubscribeHandshake, SubscriberFrame};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Run one subscriber connection to completion.
///
/// Any handshake failure sends a rejection frame and returns without
/// registering. After a successful handshake the registration is held
/// until the client closes its sending half, then removed.
pub async fn run_subscriber_session<A: MessageAuthorityApi>(
    authority: Arc<A>,
    broker: Arc<SubscriptionBroker>,
    conn: FrameConn,
) {
    let (tx, mut rx) = conn.split();

    let Some(first) = rx.recv().await else {
        debug!("Connection closed before handshake");
        return;
    };

    let handshake: SubscribeHandshake = match serde_json::from_str(&first) {
        Ok(handshake) => handshake,
        Err(error) => {
            debug!(%error, "Unreadable handshake frame");
            reject(&tx, "malformed handshake").await;
            return;
        }
    };

    let token = match authority.validate_subscribe(&handshake) {
        Ok(token) => token,
        Err(error) => {
            reject(&tx, &error.to_string()).await;
            return;
        }
    };

    // Ack first, register second. A connection the broker knows about is
    // publishable, and the ack must be the first frame in the queue.
    let ack =
        serde_json::to_string(&SubscriberFrame::SubscribeAck).expect("ack frame serializes to JSON");
    if tx.send(ack).await.is_err() {
        debug!("Connection closed before ack");
        return;
    }

    let id = broker.register(token.channels.clone(), tx.clone());
    debug!(connection = %id, channels = ?token.channels, "Subscriber session established");

    // Hold the registration open. Client frames after the handshake
    // carry no meaning and are discarded.
    while rx.recv().await.is_some() {}

    broker.unregister(id);
    debug!(connection = %id, "Subscriber session ended");
}

/// Send a rejection frame, best effort; the connection is closing.
async fn reject(tx: &mpsc::Sender<String>, reason: &str) {
    let frame = serde_json::to_string(&SubscriberFrame::SubscribeRejected {
        reason: reason.to_string(),
    })
    .expect("rejection frame serializes to JSON");
    let _ = tx.send(frame).await;
}
