//! # Subscription Broker - Channel Registry and Fanout
//!
//! Holds the relay's only shared mutable state: the mapping from channel
//! names to live subscriber connections. Everything else in the relay is
//! a stateless request/response call.
//!
//! ## Delivery contract
//!
//! ```text
//! ┌───────────┐  publish(channel, msg)   ┌──────────────────┐
//! │ Authority │ ───────────────────────► │ Broker           │
//! └───────────┘                          │  snapshot subs   │
//!                                        │  try_send each   │──► sub A
//!                                        │  (drop on full)  │──► sub B
//!                                        └──────────────────┘
//! ```
//!
//! - **At-most-once:** a full or closed subscriber queue drops that
//!   subscriber's frame; nobody else is affected
//! - **Snapshot at dispatch:** registration changes never tear an
//!   in-flight broadcast
//! - **Proactive teardown:** the session deregisters the moment the
//!   client side closes

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod broker;
pub mod session;

pub use broker::{BrokerFanout, BrokerStats, ConnectionId, SubscriptionBroker};
pub use session::run_subscriber_session;
