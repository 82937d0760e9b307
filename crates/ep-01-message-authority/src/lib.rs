//! # Message Authority Subsystem (EP-01)
//!
//! The relay-side gatekeeper: issues permission tokens, authenticates
//! them statelessly on redemption, enforces temporal and proof-of-work
//! policy, and countersigns accepted messages before fanout.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Token construction, authentication,
//!   and input validation; pure logic, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound
//!   interfaces
//! - **Service Layer** (`service.rs`): Runs the redemption check chains
//!   and drives the fanout gateway
//!
//! ## Trust model
//!
//! The relay stores nothing between issuance and redemption. A token is
//! trusted only because re-signing its exact bytes with the relay key
//! reproduces the presented signature; everything else is re-checked on
//! every call.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::tokens::TokenService;
pub use domain::validation::{check_channel, check_channels, check_message_size};
pub use ports::inbound::MessageAuthorityApi;
pub use ports::outbound::FanoutGateway;
pub use service::MessageAuthority;
