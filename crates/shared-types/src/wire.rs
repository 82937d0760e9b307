//! # Wire Payloads
//!
//! Request/response payloads for the two-phase token protocol and the
//! frames exchanged over a subscriber connection. Everything on the wire
//! is JSON text.
//!
//! Clients must pass `*_token` and `token_signature` strings through
//! unmodified between issuance and redemption; the relay authenticates
//! the exact bytes it issued.

use crate::entities::RelayMessage;
use serde::{Deserialize, Serialize};

// =============================================================================
// TOKEN ISSUANCE
// =============================================================================

/// Request a permission token for one publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatePublishRequest {
    /// The publisher's Ed25519 public key, hex-encoded.
    pub sender_public_key: String,
    /// Target channel name.
    pub channel: String,
    /// Byte length of the payload that will be published.
    pub message_size: u64,
    /// The publisher's signature over the payload, hex-encoded.
    pub message_signature: String,
}

/// A freshly issued publish token and its authenticating signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatePublishResponse {
    /// The serialized token, to be echoed back verbatim.
    pub publish_token: String,
    /// The relay's signature over the token bytes, hex-encoded.
    pub token_signature: String,
}

/// Request a permission token for one subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateSubscribeRequest {
    /// Channels to subscribe to, order significant.
    pub channels: Vec<String>,
}

/// A freshly issued subscribe token and its authenticating signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateSubscribeResponse {
    /// The serialized token, to be echoed back verbatim.
    pub subscribe_token: String,
    /// The relay's signature over the token bytes, hex-encoded.
    pub token_signature: String,
}

// =============================================================================
// TOKEN REDEMPTION
// =============================================================================

/// Redeem a publish token with its proof-of-work solution and payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    /// The token string exactly as issued.
    pub publish_token: String,
    /// The token signature exactly as issued.
    pub token_signature: String,
    /// The payload; must match the token's `message_size` in bytes.
    pub message_json: String,
    /// Solution such that `SHA1(token ++ solution)` meets the difficulty.
    pub challenge_response: String,
}

/// Outcome of a publish redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponse {
    /// True when the message was accepted and broadcast.
    pub success: bool,
}

/// First client frame on a subscriber connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeHandshake {
    /// Channels to register; must equal the token's list element-wise.
    pub channels: Vec<String>,
    /// The token string exactly as issued.
    pub subscribe_token: String,
    /// The token signature exactly as issued.
    pub token_signature: String,
    /// Solution such that `SHA1(token ++ solution)` meets the difficulty.
    pub challenge_response: String,
}

// =============================================================================
// SUBSCRIBER FRAMES
// =============================================================================

/// One delivered message, addressed to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEnvelope {
    /// Channel this delivery belongs to.
    pub channel: String,
    /// The stamped message.
    pub message: RelayMessage,
}

/// Every relay-to-subscriber frame after the handshake was read.
///
/// The first frame on a successful connection is always `SubscribeAck`;
/// every later frame is a `Delivery`. Ordering on one connection is
/// guaranteed by the underlying channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum SubscriberFrame {
    /// Handshake accepted; deliveries may follow.
    SubscribeAck,
    /// Handshake rejected; the connection closes after this frame.
    SubscribeRejected {
        /// Human-readable rejection reason.
        reason: String,
    },
    /// A stamped message for one of the registered channels.
    Delivery(DeliveryEnvelope),
}
