//! # Client Protocol Engine
//!
//! Drives the two-phase token protocol from the client side: request a
//! token, solve its challenge, honor its delay, redeem it. A subscribe
//! keeps at most one live transport; a new subscribe replaces the old one
//! before the new connection opens. The protocol phase of the most recent
//! operation is observable as a [`SessionState`].

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::Mutex;
use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey};
use shared_types::entities::{PublishToken, RelayMessage, SubscribeToken};
use shared_types::transport::{FrameConn, DEFAULT_FRAME_CAPACITY};
use shared_types::wire::{
    InitiatePublishRequest, InitiateSubscribeRequest, PublishRequest, SubscribeHandshake,
    SubscriberFrame,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::ports::RelayConnector;
use crate::solver;
use crate::verify::verify_delivery;

// =============================================================================
// SESSION STATE
// =============================================================================

/// Protocol phase of the most recent engine operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing in flight.
    Idle,
    /// Waiting for the relay to issue a token.
    RequestingToken,
    /// Searching for a challenge solution, then sleeping out the delay.
    SolvingChallenge,
    /// Token submitted, waiting for the relay's verdict.
    Redeeming,
    /// Handshake acknowledged; the reader forwards verified deliveries.
    SubscribedAwaitingFrames,
}

/// Client engine configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// How long to wait for the subscribe acknowledgement, in ms.
    pub handshake_timeout_ms: u64,
    /// Overall challenge solve budget, in ms.
    pub solve_budget_ms: u64,
    /// Capacity of the verified-delivery buffer handed to the caller.
    pub delivery_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: 2_000,
            solve_budget_ms: solver::DEFAULT_SOLVE_BUDGET_MS,
            delivery_buffer: DEFAULT_FRAME_CAPACITY,
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

struct ActiveSubscription {
    reader: JoinHandle<()>,
}

/// Client-side protocol engine over one relay connector.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct ClientProtocolEngine<C: RelayConnector> {
    connector: C,
    keypair: Ed25519KeyPair,
    config: EngineConfig,
    state: Mutex<SessionState>,
    active: Mutex<Option<ActiveSubscription>>,
}

impl<C: RelayConnector> ClientProtocolEngine<C> {
    /// Create an engine with default configuration.
    #[must_use]
    pub fn new(connector: C, keypair: Ed25519KeyPair) -> Self {
        Self::with_config(connector, keypair, EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    #[must_use]
    pub fn with_config(connector: C, keypair: Ed25519KeyPair, config: EngineConfig) -> Self {
        Self {
            connector,
            keypair,
            config,
            state: Mutex::new(SessionState::Idle),
            active: Mutex::new(None),
        }
    }

    /// The engine's identity key.
    #[must_use]
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// Current protocol phase.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    /// Publish one message to one channel.
    ///
    /// Signs the payload, requests a token, solves the challenge, honors
    /// the delay, and redeems. Ends in `Idle` whether it succeeds or not.
    pub async fn publish(&self, channel: &str, message: &str) -> Result<(), ClientError> {
        let result = self.run_publish(channel, message).await;
        self.set_state(SessionState::Idle);
        result
    }

    async fn run_publish(&self, channel: &str, message: &str) -> Result<(), ClientError> {
        self.set_state(SessionState::RequestingToken);
        let request = InitiatePublishRequest {
            sender_public_key: self.keypair.public_key().to_hex(),
            channel: channel.to_string(),
            message_size: message.len() as u64,
            message_signature: self.keypair.sign(message.as_bytes()).to_hex(),
        };
        let issued = self.connector.initiate_publish(&request).await?;

        // Read difficulty and delay out of the token; the string itself is
        // echoed back untouched.
        let token = PublishToken::from_json(&issued.publish_token).map_err(|_| {
            ClientError::UnexpectedResponse("unparseable publish token".to_string())
        })?;

        self.set_state(SessionState::SolvingChallenge);
        let solution = solver::solve_and_wait(
            issued.publish_token.as_bytes(),
            token.difficulty,
            token.delay_ms,
            self.config.solve_budget_ms,
        )
        .await?;

        self.set_state(SessionState::Redeeming);
        let response = self
            .connector
            .publish(&PublishRequest {
                publish_token: issued.publish_token,
                token_signature: issued.token_signature,
                message_json: message.to_string(),
                challenge_response: solution,
            })
            .await?;

        if !response.success {
            return Err(ClientError::Rejected {
                reason: "publish refused".to_string(),
            });
        }
        debug!(channel, size = message.len(), "Publish accepted");
        Ok(())
    }

    /// Open a subscription, replacing any previous one.
    ///
    /// The previous reader is aborted and joined before the new connection
    /// opens, so the engine never holds two live transports at once. The
    /// relay prunes the dead registration on its own schedule.
    pub async fn subscribe(&self, channels: Vec<String>) -> Result<Subscription, ClientError> {
        match self.run_subscribe(channels).await {
            Ok(subscription) => {
                self.set_state(SessionState::SubscribedAwaitingFrames);
                Ok(subscription)
            }
            Err(error) => {
                self.set_state(SessionState::Idle);
                Err(error)
            }
        }
    }

    async fn run_subscribe(&self, channels: Vec<String>) -> Result<Subscription, ClientError> {
        self.set_state(SessionState::RequestingToken);
        let issued = self
            .connector
            .initiate_subscribe(&InitiateSubscribeRequest {
                channels: channels.clone(),
            })
            .await?;
        let token = SubscribeToken::from_json(&issued.subscribe_token).map_err(|_| {
            ClientError::UnexpectedResponse("unparseable subscribe token".to_string())
        })?;

        self.set_state(SessionState::SolvingChallenge);
        let solution = solver::solve_and_wait(
            issued.subscribe_token.as_bytes(),
            token.difficulty,
            token.delay_ms,
            self.config.solve_budget_ms,
        )
        .await?;

        // Replace, never merge: the old transport goes away before the new
        // connection exists.
        self.teardown_active().await;

        self.set_state(SessionState::Redeeming);
        let FrameConn { tx, mut rx } = self.connector.open_subscribe().await?;

        let handshake = SubscribeHandshake {
            channels: channels.clone(),
            subscribe_token: issued.subscribe_token,
            token_signature: issued.token_signature,
            challenge_response: solution,
        };
        let frame =
            serde_json::to_string(&handshake).expect("handshake fields serialize to JSON");
        tx.send(frame).await.map_err(|_| {
            ClientError::Transport("connection closed before handshake".to_string())
        })?;

        let waited_ms = self.config.handshake_timeout_ms;
        let first = tokio::time::timeout(Duration::from_millis(waited_ms), rx.recv())
            .await
            .map_err(|_| ClientError::HandshakeTimeout { waited_ms })?;
        let Some(raw) = first else {
            return Err(ClientError::Transport(
                "connection closed during handshake".to_string(),
            ));
        };
        match serde_json::from_str::<SubscriberFrame>(&raw) {
            Ok(SubscriberFrame::SubscribeAck) => {}
            Ok(SubscriberFrame::SubscribeRejected { reason }) => {
                return Err(ClientError::HandshakeRejected { reason });
            }
            Ok(SubscriberFrame::Delivery(_)) => {
                return Err(ClientError::UnexpectedResponse(
                    "delivery before acknowledgement".to_string(),
                ));
            }
            Err(_) => {
                return Err(ClientError::UnexpectedResponse(
                    "unparseable handshake frame".to_string(),
                ));
            }
        }

        let (delivery_tx, delivery_rx) = mpsc::channel(self.config.delivery_buffer);
        let reader_channels = channels.clone();
        let reader = tokio::spawn(async move {
            read_deliveries(tx, rx, reader_channels, delivery_tx).await;
        });
        *self.active.lock() = Some(ActiveSubscription { reader });
        debug!(channels = ?channels, "Subscription established");

        Ok(Subscription {
            rx: delivery_rx,
            channels,
        })
    }

    /// Abort the previous reader and wait for it to finish. The reader
    /// owns the transport halves, so the join is what closes them.
    async fn teardown_active(&self) {
        let previous = self.active.lock().take();
        if let Some(active) = previous {
            active.reader.abort();
            let _ = active.reader.await;
            debug!("Previous subscription transport torn down");
        }
    }
}

/// Pump one subscriber transport until it dies.
///
/// Holds the outbound half open so the relay sees a live peer; dropping
/// both halves on exit is what tears the registration down.
async fn read_deliveries(
    _outbound: mpsc::Sender<String>,
    mut inbound: mpsc::Receiver<String>,
    channels: Vec<String>,
    delivery_tx: mpsc::Sender<RelayMessage>,
) {
    while let Some(raw) = inbound.recv().await {
        let envelope = match serde_json::from_str::<SubscriberFrame>(&raw) {
            Ok(SubscriberFrame::Delivery(envelope)) => envelope,
            Ok(_) => {
                warn!("Unexpected control frame after acknowledgement, closing");
                return;
            }
            Err(_) => {
                warn!("Unparseable frame after acknowledgement, closing");
                return;
            }
        };

        if let Err(error) = verify_delivery(&envelope, &channels) {
            warn!(%error, channel = %envelope.channel, "Delivery failed verification, closing");
            return;
        }

        if delivery_tx.send(envelope.message).await.is_err() {
            // Caller dropped the subscription handle.
            return;
        }
    }
}

// =============================================================================
// SUBSCRIPTION HANDLE
// =============================================================================

/// A live subscription handing over verified messages.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<RelayMessage>,
    channels: Vec<String>,
}

impl Subscription {
    /// Receive the next verified message.
    ///
    /// `None` means the delivery channel closed: the transport is gone or
    /// a frame failed verification.
    pub async fn recv(&mut self) -> Option<RelayMessage> {
        self.rx.recv().await
    }

    /// Channels this subscription covers, in handshake order.
    #[must_use]
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Wrap into a stream of verified messages.
    #[must_use]
    pub fn into_stream(self) -> MessageStream {
        MessageStream { subscription: self }
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct MessageStream {
    subscription: Subscription,
}

impl Stream for MessageStream {
    type Item = RelayMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.subscription.rx.poll_recv(cx)
    }
}
