//! # Relay Configuration
//!
//! Policy knobs and key material for one relay process. `Default` is the
//! standard policy; [`RelayConfig::from_env`] applies environment
//! overrides on top of it.

use shared_types::policy::RelayPolicy;
use tracing::{info, warn};

/// Configuration for one relay instance.
#[derive(Clone, Debug, Default)]
pub struct RelayConfig {
    /// Gating policy applied at issuance and redemption.
    pub policy: RelayPolicy,
    /// Fixed relay key seed; `None` generates a fresh keypair per process.
    pub relay_seed: Option<[u8; 32]>,
}

impl RelayConfig {
    /// Build a configuration from the environment.
    ///
    /// Recognized variables:
    /// - `EPHEMERA_RELAY_SEED` - hex keypair seed, 64 chars
    /// - `EPHEMERA_PUBLISH_DIFFICULTY` / `EPHEMERA_PUBLISH_DELAY_MS`
    /// - `EPHEMERA_SUBSCRIBE_DIFFICULTY` / `EPHEMERA_SUBSCRIBE_DELAY_MS`
    ///
    /// Malformed values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Override relay seed from environment
        if let Ok(seed_hex) = std::env::var("EPHEMERA_RELAY_SEED") {
            if let Ok(seed_bytes) = hex::decode(&seed_hex) {
                if seed_bytes.len() == 32 {
                    let mut seed = [0u8; 32];
                    seed.copy_from_slice(&seed_bytes);
                    config.relay_seed = Some(seed);
                    info!("Loaded relay seed from environment");
                } else {
                    warn!("EPHEMERA_RELAY_SEED must be 32 bytes (64 hex chars)");
                }
            } else {
                warn!("EPHEMERA_RELAY_SEED is not valid hex");
            }
        }

        // Override gate policies from environment
        if let Ok(value) = std::env::var("EPHEMERA_PUBLISH_DIFFICULTY") {
            if let Ok(parsed) = value.parse() {
                config.policy.publish.difficulty = parsed;
            }
        }
        if let Ok(value) = std::env::var("EPHEMERA_PUBLISH_DELAY_MS") {
            if let Ok(parsed) = value.parse() {
                config.policy.publish.delay_ms = parsed;
            }
        }
        if let Ok(value) = std::env::var("EPHEMERA_SUBSCRIBE_DIFFICULTY") {
            if let Ok(parsed) = value.parse() {
                config.policy.subscribe.difficulty = parsed;
            }
        }
        if let Ok(value) = std::env::var("EPHEMERA_SUBSCRIBE_DELAY_MS") {
            if let Ok(parsed) = value.parse() {
                config.policy.subscribe.delay_ms = parsed;
            }
        }

        config
    }
}
