//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that transports and sessions call
//! - **Outbound (Driven)**: The fanout dependency this subsystem needs

pub mod inbound;
pub mod outbound;
