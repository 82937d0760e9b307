//! # Client Errors
//!
//! Failure modes of the client protocol engine, split by phase:
//! operation-level failures (`ClientError`) and per-delivery verification
//! failures (`DeliveryError`).

use thiserror::Error;

use crate::ports::ConnectorError;

/// Errors surfaced by publish and subscribe operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The connection to the relay failed or closed mid-operation.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The relay answered with something other than the expected payload.
    #[error("Unexpected relay response: {0}")]
    UnexpectedResponse(String),

    /// The relay refused the operation.
    #[error("Rejected by relay: {reason}")]
    Rejected {
        /// Refusal reason as reported by the relay.
        reason: String,
    },

    /// The challenge was not solved within the configured budget.
    #[error("Challenge unsolved after {budget_ms} ms")]
    SolveTimeout {
        /// The budget that ran out, in milliseconds.
        budget_ms: u64,
    },

    /// No handshake acknowledgement arrived in time.
    #[error("No subscribe acknowledgement within {waited_ms} ms")]
    HandshakeTimeout {
        /// How long the engine waited, in milliseconds.
        waited_ms: u64,
    },

    /// The relay rejected the subscribe handshake.
    #[error("Subscribe handshake rejected: {reason}")]
    HandshakeRejected {
        /// Rejection reason from the relay's first frame.
        reason: String,
    },
}

impl From<ConnectorError> for ClientError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Rejected { reason } => ClientError::Rejected { reason },
            ConnectorError::Transport(detail) => ClientError::Transport(detail),
        }
    }
}

/// Verification failures for a single delivered frame.
///
/// Every variant is fatal for the subscription: the reader closes the
/// transport instead of skipping the frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The frame did not parse as a delivery envelope.
    #[error("Malformed delivery frame")]
    MalformedFrame,

    /// The delivery names a channel this subscription never asked for.
    #[error("Delivery for unexpected channel: {channel}")]
    UnexpectedChannel {
        /// The channel the envelope claimed.
        channel: String,
    },

    /// The sender's signature does not cover the payload.
    #[error("Sender signature verification failed")]
    BadSenderSignature,

    /// The relay's signature does not cover the stamp payload.
    #[error("System signature verification failed")]
    BadSystemSignature,

    /// A stamped field disagrees with the enclosing message.
    #[error("Stamped field does not match message: {field}")]
    FieldMismatch {
        /// Name of the first disagreeing field.
        field: &'static str,
    },
}
