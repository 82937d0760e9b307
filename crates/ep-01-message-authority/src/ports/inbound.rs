//! # Inbound Ports (Driving Ports / API)
//!
//! The public API of the message authority. A transport listener, the
//! in-process loopback, and the subscriber session all drive the relay
//! through this trait.

use shared_types::{
    InitiatePublishRequest, InitiatePublishResponse, InitiateSubscribeRequest,
    InitiateSubscribeResponse, IntentError, PublishRequest, PublishResponse, RedeemError,
    SubscribeHandshake, SubscribeToken,
};

/// Primary Message Authority API.
///
/// This is the main entry point for token issuance and redemption.
/// Implementations must be thread-safe (`Send + Sync`); every method is
/// a stateless request/response call.
#[async_trait::async_trait]
pub trait MessageAuthorityApi: Send + Sync {
    // =========================================================================
    // Token Issuance
    // =========================================================================

    /// Validate a publish intent and issue a signed publish token.
    ///
    /// # Errors
    /// * `IntentError::InvalidChannel` - channel name outside the charset
    /// * `IntentError::InvalidMessageSize` - declared size out of bounds
    fn initiate_publish(
        &self,
        request: &InitiatePublishRequest,
    ) -> Result<InitiatePublishResponse, IntentError>;

    /// Validate a channel list and issue a signed subscribe token.
    ///
    /// # Errors
    /// * `IntentError::TooManyChannels` - list longer than the policy allows
    /// * `IntentError::InvalidChannel` - any name outside the charset
    fn initiate_subscribe(
        &self,
        request: &InitiateSubscribeRequest,
    ) -> Result<InitiateSubscribeResponse, IntentError>;

    // =========================================================================
    // Token Redemption
    // =========================================================================

    /// Redeem a publish token: run the full check chain and, on success,
    /// stamp the message and broadcast it through the fanout gateway.
    ///
    /// Atomic: any failure aborts with no broadcast; success broadcasts
    /// exactly once.
    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, RedeemError>;

    /// Redeem a subscribe token presented in a handshake.
    ///
    /// Pure validation; the caller registers the connection on success.
    fn validate_subscribe(
        &self,
        handshake: &SubscribeHandshake,
    ) -> Result<SubscribeToken, RedeemError>;
}
