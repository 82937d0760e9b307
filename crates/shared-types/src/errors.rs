//! # Error Taxonomy
//!
//! Defines the rejection classes shared by the relay-side crates. Every
//! failure terminates only the triggering operation; nothing is partially
//! applied and nothing is retried server-side.

use thiserror::Error;

/// Rejections at token issuance time.
///
/// Raised synchronously before any token is built; an issuance failure
/// has no side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// Channel name empty or outside the allowed charset.
    #[error("Invalid channel name: {channel:?}")]
    InvalidChannel { channel: String },

    /// Declared payload size outside the accepted bounds.
    #[error("Invalid message size: {size} not within {min}..={max} bytes")]
    InvalidMessageSize { size: u64, min: u64, max: u64 },

    /// Subscription covers more channels than allowed.
    #[error("Too many channels: {count} requested, at most {max}")]
    TooManyChannels { count: usize, max: usize },
}

/// Rejections at token redemption time.
///
/// Ordered roughly as the relay checks them: authenticity, shape,
/// temporal policy, content, proof of work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedeemError {
    /// Presented token bytes do not re-sign to the presented signature.
    #[error("Token signature invalid")]
    InvalidSignature,

    /// Token authenticated but does not parse into the expected shape.
    #[error("Token malformed")]
    MalformedToken,

    /// Token redeemed before its mandatory delay elapsed.
    #[error("Token redeemed too soon: {remaining_ms}ms of delay remaining")]
    TooSoon { remaining_ms: u64 },

    /// Token older than the validity window.
    #[error("Token expired: {age_ms}ms past issuance")]
    Expired { age_ms: u64 },

    /// Payload length differs from the size the token was issued for.
    #[error("Message size mismatch: token covers {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// Sender's signature does not verify over the payload.
    #[error("Sender signature invalid")]
    BadSenderSignature,

    /// Challenge solution does not reach the required difficulty.
    #[error("Challenge solution does not meet difficulty {difficulty}")]
    BadChallenge { difficulty: u32 },

    /// Handshake channel list differs from the token's embedded list.
    #[error("Subscribed channels do not match the token")]
    ChannelMismatch,

    /// Redemption input failed a check that also applies at issuance.
    #[error(transparent)]
    Intent(#[from] IntentError),
}
