//! # Key Helpers
//!
//! Small client-side conveniences around identity keys: a stable short
//! identifier for display and a keypair self-check.

use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey};

/// Bytes of the SHA-256 fingerprint used for the short identifier.
const SHORT_ID_BYTES: usize = 8;

/// A stable short identifier for a public key.
///
/// Hex prefix of the key's SHA-256 fingerprint, 16 characters. Suitable
/// for logs and display, not for authentication.
#[must_use]
pub fn short_id(public_key: &Ed25519PublicKey) -> String {
    let fingerprint = public_key.fingerprint();
    hex::encode(&fingerprint[..SHORT_ID_BYTES])
}

/// Check that a public key and a secret seed form a working pair.
///
/// Signs a probe message with the seed and verifies it under the given
/// public key.
#[must_use]
pub fn is_valid_keypair(public_key: &Ed25519PublicKey, seed: &[u8; 32]) -> bool {
    let keypair = Ed25519KeyPair::from_seed(*seed);
    let probe = b"keypair self check";
    let signature = keypair.sign(probe);
    public_key.verify(probe, &signature).is_ok()
}
