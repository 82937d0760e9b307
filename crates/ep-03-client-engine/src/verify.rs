//! # Delivery Verification
//!
//! Re-derives the full trust chain of a delivered message on the client:
//! channel membership, the sender's signature over the payload, the relay's
//! signature over the stamp, and byte equality of every stamped field with
//! the enclosing message. Checks run in that order and the first failure
//! wins.

use shared_crypto::{Ed25519PublicKey, Ed25519Signature};
use shared_types::entities::SystemStamp;
use shared_types::wire::DeliveryEnvelope;

use crate::errors::DeliveryError;

fn parse_key(raw: &str) -> Result<Ed25519PublicKey, DeliveryError> {
    Ed25519PublicKey::from_hex(raw).map_err(|_| DeliveryError::MalformedFrame)
}

fn parse_signature(raw: &str) -> Result<Ed25519Signature, DeliveryError> {
    Ed25519Signature::from_hex(raw).map_err(|_| DeliveryError::MalformedFrame)
}

/// Verify one delivery against the channels this subscription covers.
///
/// Passing means the payload is exactly what the named sender signed and
/// exactly what the relay accepted, for a channel that was asked for.
pub fn verify_delivery(
    envelope: &DeliveryEnvelope,
    expected_channels: &[String],
) -> Result<(), DeliveryError> {
    let message = &envelope.message;

    if !expected_channels.iter().any(|c| c == &envelope.channel) {
        return Err(DeliveryError::UnexpectedChannel {
            channel: envelope.channel.clone(),
        });
    }

    let sender_key = parse_key(&message.sender_public_key)?;
    let sender_signature = parse_signature(&message.message_signature)?;
    sender_key
        .verify(message.message_json.as_bytes(), &sender_signature)
        .map_err(|_| DeliveryError::BadSenderSignature)?;

    let system_key = parse_key(&message.system_public_key)?;
    let system_signature = parse_signature(&message.system_signature)?;
    system_key
        .verify(
            message.system_signature_payload.as_bytes(),
            &system_signature,
        )
        .map_err(|_| DeliveryError::BadSystemSignature)?;

    let stamp = SystemStamp::from_json(&message.system_signature_payload)
        .map_err(|_| DeliveryError::MalformedFrame)?;

    if stamp.channel != envelope.channel || stamp.channel != message.channel {
        return Err(DeliveryError::FieldMismatch { field: "channel" });
    }
    if stamp.sender_public_key != message.sender_public_key {
        return Err(DeliveryError::FieldMismatch {
            field: "sender_public_key",
        });
    }
    if stamp.timestamp != message.timestamp {
        return Err(DeliveryError::FieldMismatch { field: "timestamp" });
    }
    if stamp.message_signature != message.message_signature {
        return Err(DeliveryError::FieldMismatch {
            field: "message_signature",
        });
    }

    Ok(())
}
