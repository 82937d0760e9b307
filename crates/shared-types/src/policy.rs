//! # Relay Policy
//!
//! Tunable anti-abuse parameters. Changing any of these requires no
//! protocol change: tokens embed the difficulty and delay that were
//! active when they were issued, and redemption honors the embedded
//! values.

use serde::{Deserialize, Serialize};

/// Default leading zero bits required of a challenge solution.
pub const DEFAULT_DIFFICULTY: u32 = 13;

/// Default minimum token age before redemption, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Tokens older than this are expired, in milliseconds.
pub const TOKEN_WINDOW_MS: u64 = 60_000;

/// Maximum channels a single subscription may cover.
pub const MAX_SUBSCRIBE_CHANNELS: usize = 10;

/// Smallest accepted payload, in bytes (inclusive).
pub const MIN_MESSAGE_SIZE: u64 = 1;

/// Largest accepted payload, in bytes (inclusive).
pub const MAX_MESSAGE_SIZE: u64 = 20_000;

/// Proof-of-work cost attached to one operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatePolicy {
    /// Leading zero bits the solution digest must reach.
    pub difficulty: u32,
    /// Minimum token age before redemption.
    pub delay_ms: u64,
}

/// The full policy block the relay runs under.
///
/// Publish and subscribe carry independent knobs so an operator can price
/// them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPolicy {
    /// Cost of redeeming a publish token.
    pub publish: GatePolicy,
    /// Cost of redeeming a subscribe token.
    pub subscribe: GatePolicy,
    /// Maximum token age at redemption.
    pub token_window_ms: u64,
    /// Maximum channels per subscription.
    pub max_channels: usize,
    /// Smallest accepted payload, in bytes.
    pub min_message_size: u64,
    /// Largest accepted payload, in bytes.
    pub max_message_size: u64,
}

impl Default for RelayPolicy {
    fn default() -> Self {
        Self {
            publish: GatePolicy {
                difficulty: DEFAULT_DIFFICULTY,
                delay_ms: DEFAULT_DELAY_MS,
            },
            subscribe: GatePolicy {
                difficulty: DEFAULT_DIFFICULTY,
                delay_ms: DEFAULT_DELAY_MS,
            },
            token_window_ms: TOKEN_WINDOW_MS,
            max_channels: MAX_SUBSCRIBE_CHANNELS,
            min_message_size: MIN_MESSAGE_SIZE,
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}
