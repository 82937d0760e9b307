//! Cross-crate integration flows.
//!
//! Everything here drives the relay through its public seams: the
//! in-process `LocalRelay` wiring, the client engine, or the authority's
//! clock-parameterized entry points.

pub mod gating;
pub mod publish_flow;
pub mod subscribe_flow;
