//! # Proof-of-Work Challenge
//!
//! SHA-1 hashcash bound to a token's exact serialized bytes. A solution
//! is a string such that `SHA1(token_bytes ++ solution)` starts with at
//! least `difficulty` zero bits. Because the token bytes are the prefix,
//! a solution is worthless for any other token: nothing to cache, nothing
//! to replay.
//!
//! ## Bit counting
//!
//! The zero-bit count runs over the digest's full fixed width. Reading
//! the digest as a number would silently drop leading zero bytes; the
//! byte-wise walk below keeps them.

use sha1::{Digest, Sha1};

/// Digest width in bits.
pub const DIGEST_BITS: u32 = 160;

/// Digest binding a candidate solution to one token's bytes.
#[must_use]
pub fn challenge_digest(token_bytes: &[u8], solution: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(token_bytes);
    hasher.update(solution);
    hasher.finalize().into()
}

/// Count leading zero bits over the digest's full width.
#[must_use]
pub fn leading_zero_bits(digest: &[u8]) -> u32 {
    let mut bits = 0;
    for byte in digest {
        if *byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }
    bits
}

/// Whether `solution` meets `difficulty` for this token's bytes.
///
/// Difficulty 0 accepts any solution. Expected solving cost doubles with
/// each additional bit.
#[must_use]
pub fn meets_difficulty(token_bytes: &[u8], solution: &str, difficulty: u32) -> bool {
    leading_zero_bits(&challenge_digest(token_bytes, solution.as_bytes())) >= difficulty
}
