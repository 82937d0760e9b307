//! # Token Service
//!
//! Builds, signs, authenticates, and countersigns tokens with the relay
//! key. Issuance serializes the token struct once and signs those exact
//! bytes; redemption re-signs the presented bytes and requires the
//! deterministic signatures to match byte-for-byte. No issued token is
//! ever recorded.

use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use shared_types::{
    EpochMillis, GatePolicy, InitiatePublishRequest, InitiatePublishResponse,
    InitiateSubscribeResponse, PublishToken, RedeemError, RelayMessage, SubscribeToken,
    SystemStamp,
};

/// Signs and authenticates everything the relay vouches for: permission
/// tokens and system stamps.
pub struct TokenService {
    keypair: Ed25519KeyPair,
}

impl TokenService {
    /// Create a token service around the relay keypair.
    #[must_use]
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        Self { keypair }
    }

    /// The relay's public key, as embedded in outgoing stamps.
    #[must_use]
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// Issue a publish token for a validated intent.
    ///
    /// The token embeds the policy active at issuance; redemption honors
    /// the embedded values, so a policy change never invalidates tokens
    /// already in flight.
    #[must_use]
    pub fn issue_publish(
        &self,
        request: &InitiatePublishRequest,
        gate: GatePolicy,
        now: EpochMillis,
    ) -> InitiatePublishResponse {
        let token = PublishToken {
            timestamp: now,
            difficulty: gate.difficulty,
            delay_ms: gate.delay_ms,
            sender_public_key: request.sender_public_key.clone(),
            channel: request.channel.clone(),
            message_size: request.message_size,
            message_signature: request.message_signature.clone(),
        };
        let serialized = token.to_json();
        let signature = self.keypair.sign(serialized.as_bytes());
        InitiatePublishResponse {
            publish_token: serialized,
            token_signature: signature.to_hex(),
        }
    }

    /// Issue a subscribe token for a validated channel list.
    #[must_use]
    pub fn issue_subscribe(
        &self,
        channels: Vec<String>,
        gate: GatePolicy,
        now: EpochMillis,
    ) -> InitiateSubscribeResponse {
        let token = SubscribeToken {
            timestamp: now,
            difficulty: gate.difficulty,
            delay_ms: gate.delay_ms,
            channels,
        };
        let serialized = token.to_json();
        let signature = self.keypair.sign(serialized.as_bytes());
        InitiateSubscribeResponse {
            subscribe_token: serialized,
            token_signature: signature.to_hex(),
        }
    }

    /// Authenticate and parse a presented publish token.
    pub fn authenticate_publish(
        &self,
        token: &str,
        signature_hex: &str,
    ) -> Result<PublishToken, RedeemError> {
        self.authenticate(token, signature_hex)?;
        PublishToken::from_json(token).map_err(|_| RedeemError::MalformedToken)
    }

    /// Authenticate and parse a presented subscribe token.
    pub fn authenticate_subscribe(
        &self,
        token: &str,
        signature_hex: &str,
    ) -> Result<SubscribeToken, RedeemError> {
        self.authenticate(token, signature_hex)?;
        SubscribeToken::from_json(token).map_err(|_| RedeemError::MalformedToken)
    }

    /// Countersign an accepted message.
    ///
    /// Builds the stamp over the token's fields plus the acceptance time,
    /// signs its serialized form, and assembles the broadcast message.
    #[must_use]
    pub fn stamp_message(
        &self,
        token: &PublishToken,
        message_json: &str,
        now: EpochMillis,
    ) -> RelayMessage {
        let stamp = SystemStamp {
            channel: token.channel.clone(),
            sender_public_key: token.sender_public_key.clone(),
            timestamp: now,
            message_signature: token.message_signature.clone(),
        };
        let payload = stamp.to_json();
        let signature = self.keypair.sign(payload.as_bytes());
        RelayMessage {
            channel: token.channel.clone(),
            sender_public_key: token.sender_public_key.clone(),
            timestamp: now,
            message_json: message_json.to_string(),
            message_signature: token.message_signature.clone(),
            system_signature_payload: payload,
            system_signature: signature.to_hex(),
            system_public_key: self.public_key().to_hex(),
        }
    }

    /// Re-sign the presented bytes and require signature equality.
    ///
    /// Sound only because Ed25519 signatures are deterministic: the relay
    /// key over the same bytes always yields the same 64 bytes.
    fn authenticate(&self, token: &str, signature_hex: &str) -> Result<(), RedeemError> {
        let presented =
            Ed25519Signature::from_hex(signature_hex).map_err(|_| RedeemError::InvalidSignature)?;
        let expected = self.keypair.sign(token.as_bytes());
        if expected != presented {
            return Err(RedeemError::InvalidSignature);
        }
        Ok(())
    }
}
