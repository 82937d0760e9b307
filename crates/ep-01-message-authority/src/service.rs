//! # Message Authority Service
//!
//! Application service that implements `MessageAuthorityApi`: validates
//! intents, issues tokens, runs the redemption check chains in a fixed
//! order, and broadcasts accepted messages through the fanout gateway.
//!
//! ## Check order
//!
//! Publish: authenticate, parse, temporal window, size, sender signature,
//! challenge. Subscribe: authenticate, parse, channel-list equality,
//! temporal window, challenge. The orders are part of the protocol's
//! observable behavior (a request failing two checks reports the earlier
//! one) and are not to be rearranged.

use crate::domain::tokens::TokenService;
use crate::domain::validation;
use crate::ports::inbound::MessageAuthorityApi;
use crate::ports::outbound::FanoutGateway;
use shared_crypto::{meets_difficulty, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use shared_types::{
    EpochMillis, InitiatePublishRequest, InitiatePublishResponse, InitiateSubscribeRequest,
    InitiateSubscribeResponse, IntentError, PublishRequest, PublishResponse, RedeemError,
    RelayPolicy, SubscribeHandshake, SubscribeToken,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Current wall-clock time in epoch milliseconds.
fn now_ms() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// Message Authority Service.
///
/// Generic over the fanout gateway so tests can observe broadcasts and
/// the runtime can plug in the subscription broker.
pub struct MessageAuthority<F: FanoutGateway> {
    tokens: TokenService,
    policy: RelayPolicy,
    fanout: F,
}

impl<F: FanoutGateway> MessageAuthority<F> {
    /// Create a new authority around the relay keypair.
    #[must_use]
    pub fn new(keypair: Ed25519KeyPair, policy: RelayPolicy, fanout: F) -> Self {
        Self {
            tokens: TokenService::new(keypair),
            policy,
            fanout,
        }
    }

    /// The relay's public key.
    #[must_use]
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.tokens.public_key()
    }

    /// The policy this authority runs under.
    #[must_use]
    pub fn policy(&self) -> &RelayPolicy {
        &self.policy
    }

    /// Issue a publish token at an explicit clock reading.
    pub fn initiate_publish_at(
        &self,
        request: &InitiatePublishRequest,
        now: EpochMillis,
    ) -> Result<InitiatePublishResponse, IntentError> {
        validation::check_channel(&request.channel)?;
        validation::check_message_size(request.message_size, &self.policy)?;

        debug!(
            channel = %request.channel,
            message_size = request.message_size,
            "Issued publish token"
        );
        Ok(self.tokens.issue_publish(request, self.policy.publish, now))
    }

    /// Issue a subscribe token at an explicit clock reading.
    pub fn initiate_subscribe_at(
        &self,
        request: &InitiateSubscribeRequest,
        now: EpochMillis,
    ) -> Result<InitiateSubscribeResponse, IntentError> {
        validation::check_channels(&request.channels, &self.policy)?;

        debug!(channels = ?request.channels, "Issued subscribe token");
        Ok(self
            .tokens
            .issue_subscribe(request.channels.clone(), self.policy.subscribe, now))
    }

    /// Redeem a publish token at an explicit clock reading.
    pub async fn publish_at(
        &self,
        request: &PublishRequest,
        now: EpochMillis,
    ) -> Result<PublishResponse, RedeemError> {
        match self.run_publish(request, now).await {
            Ok(response) => Ok(response),
            Err(error) => {
                warn!(%error, "Publish rejected");
                Err(error)
            }
        }
    }

    /// Validate a subscribe handshake at an explicit clock reading.
    pub fn validate_subscribe_at(
        &self,
        handshake: &SubscribeHandshake,
        now: EpochMillis,
    ) -> Result<SubscribeToken, RedeemError> {
        match self.run_validate_subscribe(handshake, now) {
            Ok(token) => Ok(token),
            Err(error) => {
                warn!(%error, "Subscribe rejected");
                Err(error)
            }
        }
    }

    async fn run_publish(
        &self,
        request: &PublishRequest,
        now: EpochMillis,
    ) -> Result<PublishResponse, RedeemError> {
        let token = self
            .tokens
            .authenticate_publish(&request.publish_token, &request.token_signature)?;

        self.check_window(token.timestamp, token.delay_ms, now)?;

        let actual = request.message_json.len() as u64;
        if actual != token.message_size {
            return Err(RedeemError::SizeMismatch {
                expected: token.message_size,
                actual,
            });
        }

        let sender_key = Ed25519PublicKey::from_hex(&token.sender_public_key)
            .map_err(|_| RedeemError::BadSenderSignature)?;
        let message_signature = Ed25519Signature::from_hex(&token.message_signature)
            .map_err(|_| RedeemError::BadSenderSignature)?;
        sender_key
            .verify(request.message_json.as_bytes(), &message_signature)
            .map_err(|_| RedeemError::BadSenderSignature)?;

        if !meets_difficulty(
            request.publish_token.as_bytes(),
            &request.challenge_response,
            token.difficulty,
        ) {
            return Err(RedeemError::BadChallenge {
                difficulty: token.difficulty,
            });
        }

        let message = self.tokens.stamp_message(&token, &request.message_json, now);
        let delivered = self.fanout.broadcast(&token.channel, message).await;
        info!(
            channel = %token.channel,
            delivered,
            "Message accepted and broadcast"
        );
        Ok(PublishResponse { success: true })
    }

    fn run_validate_subscribe(
        &self,
        handshake: &SubscribeHandshake,
        now: EpochMillis,
    ) -> Result<SubscribeToken, RedeemError> {
        let token = self
            .tokens
            .authenticate_subscribe(&handshake.subscribe_token, &handshake.token_signature)?;

        // Channel equality comes before the temporal checks.
        if handshake.channels != token.channels {
            return Err(RedeemError::ChannelMismatch);
        }

        self.check_window(token.timestamp, token.delay_ms, now)?;

        if !meets_difficulty(
            handshake.subscribe_token.as_bytes(),
            &handshake.challenge_response,
            token.difficulty,
        ) {
            return Err(RedeemError::BadChallenge {
                difficulty: token.difficulty,
            });
        }

        debug!(channels = ?token.channels, "Subscribe handshake validated");
        Ok(token)
    }

    /// Enforce `delay_ms <= |now - issued| <= window`.
    ///
    /// The absolute difference admits future-dated tokens inside the
    /// window; kept as-is so redemption behavior stays unchanged.
    fn check_window(
        &self,
        issued: EpochMillis,
        delay_ms: u64,
        now: EpochMillis,
    ) -> Result<(), RedeemError> {
        let age = now.abs_diff(issued);
        if age < delay_ms {
            return Err(RedeemError::TooSoon {
                remaining_ms: delay_ms - age,
            });
        }
        if age > self.policy.token_window_ms {
            return Err(RedeemError::Expired { age_ms: age });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<F: FanoutGateway> MessageAuthorityApi for MessageAuthority<F> {
    fn initiate_publish(
        &self,
        request: &InitiatePublishRequest,
    ) -> Result<InitiatePublishResponse, IntentError> {
        self.initiate_publish_at(request, now_ms())
    }

    fn initiate_subscribe(
        &self,
        request: &InitiateSubscribeRequest,
    ) -> Result<InitiateSubscribeResponse, IntentError> {
        self.initiate_subscribe_at(request, now_ms())
    }

    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, RedeemError> {
        self.publish_at(request, now_ms()).await
    }

    fn validate_subscribe(
        &self,
        handshake: &SubscribeHandshake,
    ) -> Result<SubscribeToken, RedeemError> {
        self.validate_subscribe_at(handshake, now_ms())
    }
}

// =============================================================================
// TESTS
// =============================================================================
