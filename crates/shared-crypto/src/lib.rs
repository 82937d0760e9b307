//! # Shared Crypto - Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Token authentication, message signing |
//! | `challenge` | SHA-1 hashcash | Proof-of-work gating |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, which is what allows a signature
//!   to double as a MAC over token bytes
//! - **Challenge**: bound to one token's exact bytes; solutions cannot be
//!   cached or replayed across tokens
//! - Secret key material is zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod challenge;
pub mod errors;
pub mod signatures;

// Re-exports
pub use challenge::{challenge_digest, leading_zero_bits, meets_difficulty, DIGEST_BITS};
pub use errors::CryptoError;
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
