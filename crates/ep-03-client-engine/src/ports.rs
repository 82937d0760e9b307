//! # Outbound Ports
//!
//! The engine's view of a relay. `RelayConnector` abstracts the transport:
//! request/response calls for token issuance and publish redemption, plus a
//! duplex frame connection per subscription.

use async_trait::async_trait;
use shared_types::transport::FrameConn;
use shared_types::wire::{
    InitiatePublishRequest, InitiatePublishResponse, InitiateSubscribeRequest,
    InitiateSubscribeResponse, PublishRequest, PublishResponse,
};
use thiserror::Error;

/// Errors a connector can surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// The relay refused the request.
    #[error("Rejected by relay: {reason}")]
    Rejected {
        /// Refusal reason as reported by the relay.
        reason: String,
    },

    /// The transport failed before a response arrived.
    #[error("Transport failure: {0}")]
    Transport(String),
}

/// Transport seam between the engine and one relay.
#[async_trait]
pub trait RelayConnector: Send + Sync {
    /// Request a publish token.
    async fn initiate_publish(
        &self,
        request: &InitiatePublishRequest,
    ) -> Result<InitiatePublishResponse, ConnectorError>;

    /// Redeem a publish token.
    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, ConnectorError>;

    /// Request a subscribe token.
    async fn initiate_subscribe(
        &self,
        request: &InitiateSubscribeRequest,
    ) -> Result<InitiateSubscribeResponse, ConnectorError>;

    /// Open a fresh duplex frame connection for one subscription.
    ///
    /// The returned connection carries the client side; the relay side is
    /// expected to read the handshake as its first frame.
    async fn open_subscribe(&self) -> Result<FrameConn, ConnectorError>;
}
