//! # Core Domain Entities
//!
//! Defines the protocol entities exchanged between the relay and its
//! clients. None of these are ever persisted; the relay holds a message
//! only for the duration of one fanout.
//!
//! ## Clusters
//!
//! - **Permission tokens**: `PublishToken`, `SubscribeToken`
//! - **Stamped messages**: `RelayMessage`, `SystemStamp`
//!
//! ## Byte layout
//!
//! Tokens and stamps are signed over their serialized JSON form, so the
//! byte layout must be stable: `to_json` serializes the struct itself and
//! field declaration order fixes the key order. Clients echo the exact
//! string back; the relay never re-serializes a presented token.

use serde::{Deserialize, Serialize};

/// A moment in time, expressed as milliseconds since the Unix epoch.
pub type EpochMillis = u64;

// =============================================================================
// CLUSTER A: PERMISSION TOKENS
// =============================================================================

/// A signed permission to publish one message.
///
/// Issued by the relay on request, returned to the relay on redemption.
/// The relay keeps no record of issued tokens: authenticity is proven by
/// re-signing the presented bytes with the relay key and comparing the
/// deterministic Ed25519 signatures byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishToken {
    /// When the token was issued.
    pub timestamp: EpochMillis,
    /// Leading zero bits the challenge solution must reach.
    pub difficulty: u32,
    /// Minimum age of the token before it may be redeemed.
    pub delay_ms: u64,
    /// The publisher's Ed25519 public key, hex-encoded.
    pub sender_public_key: String,
    /// Target channel name.
    pub channel: String,
    /// Exact byte length the published payload must have.
    pub message_size: u64,
    /// The publisher's signature over the payload, hex-encoded.
    pub message_signature: String,
}

impl PublishToken {
    /// Serialize to the exact byte form the relay signs.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("token fields serialize to JSON")
    }

    /// Parse a presented token string.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// A signed permission to open one subscription.
///
/// The embedded channel list is authoritative: the handshake must present
/// the same channels in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeToken {
    /// When the token was issued.
    pub timestamp: EpochMillis,
    /// Leading zero bits the challenge solution must reach.
    pub difficulty: u32,
    /// Minimum age of the token before it may be redeemed.
    pub delay_ms: u64,
    /// Channels this subscription covers, in presentation order.
    pub channels: Vec<String>,
}

impl SubscribeToken {
    /// Serialize to the exact byte form the relay signs.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("token fields serialize to JSON")
    }

    /// Parse a presented token string.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

// =============================================================================
// CLUSTER B: STAMPED MESSAGES
// =============================================================================

/// The relay's countersignature payload.
///
/// Serialized, signed with the relay key, and embedded in the outgoing
/// `RelayMessage` as `system_signature_payload`. Subscribers re-verify the
/// signature and then compare every stamped field against the enclosing
/// message, so a relay stamp cannot be transplanted onto altered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStamp {
    /// Channel the message was accepted for.
    pub channel: String,
    /// The publisher's public key, hex-encoded.
    pub sender_public_key: String,
    /// Acceptance time, stamped by the relay.
    pub timestamp: EpochMillis,
    /// The publisher's signature over the payload, hex-encoded.
    pub message_signature: String,
}

impl SystemStamp {
    /// Serialize to the exact byte form the relay signs.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("stamp fields serialize to JSON")
    }

    /// Parse a stamp payload presented inside a delivery.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// A fully stamped message as broadcast to subscribers.
///
/// Carries both ends of the trust chain: the sender's signature over the
/// payload and the relay's signature over the `SystemStamp`. Immutable
/// once emitted; the relay forgets it after fanout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Channel the message was accepted for.
    pub channel: String,
    /// The publisher's public key, hex-encoded.
    pub sender_public_key: String,
    /// Acceptance time, stamped by the relay.
    pub timestamp: EpochMillis,
    /// The opaque application payload.
    pub message_json: String,
    /// The publisher's signature over `message_json`, hex-encoded.
    pub message_signature: String,
    /// The serialized `SystemStamp` the relay signed.
    pub system_signature_payload: String,
    /// The relay's signature over the stamp payload, hex-encoded.
    pub system_signature: String,
    /// The relay's public key, hex-encoded.
    pub system_public_key: String,
}
