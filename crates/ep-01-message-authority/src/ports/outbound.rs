//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies the message authority needs. There is exactly one: a way
//! to hand an accepted message to whoever fans it out.

use shared_types::RelayMessage;

/// Gateway to the subscription fanout.
///
/// Fanout is at-most-once and cannot fail as a whole: slow or closed
/// subscribers are skipped individually, so the gateway reports how many
/// subscribers the message was handed to rather than an error.
#[async_trait::async_trait]
pub trait FanoutGateway: Send + Sync {
    /// Broadcast an accepted message to a channel's subscribers.
    ///
    /// # Returns
    ///
    /// The number of subscriber queues the message was delivered into.
    /// Zero subscribers is not an error; the message simply evaporates.
    async fn broadcast(&self, channel: &str, message: RelayMessage) -> usize;
}
