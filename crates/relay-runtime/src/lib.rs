//! # Relay Runtime
//!
//! Composition root for an Ephemera relay: configuration, logging
//! bootstrap, and in-process wiring of the authority, the broker, and the
//! client transport seam.
//!
//! ## Wiring
//!
//! ```text
//! ClientProtocolEngine ──RelayConnector──→ LocalConnector
//!                                               │
//!                    ┌──────────────────────────┴───────┐
//!                    ↓                                   ↓
//!         MessageAuthority (issue/redeem)     subscriber sessions (mpsc duplex)
//!                    │                                   │
//!                    └───────── BrokerFanout ──→ SubscriptionBroker
//! ```

pub mod config;
pub mod local;

use tracing_subscriber::EnvFilter;

// Re-export public API
pub use config::RelayConfig;
pub use local::{LocalConnector, LocalRelay};

/// Initialize logging for a relay process.
///
/// Honors `RUST_LOG`, defaulting to `info`. Safe to call more than once;
/// later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
