//! # Shared Types Crate
//!
//! This crate contains the domain entities, wire payloads, policy block,
//! and error taxonomy shared by the relay-side and client-side crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate protocol types are
//!   defined here.
//! - **Stable Byte Layout**: Tokens and stamps are signed over their
//!   serialized form; field declaration order fixes the key order and a
//!   presented token is never re-serialized.
//! - **Nothing Durable**: No entity here survives the operation that
//!   carries it; the relay stores no message and no token.

pub mod entities;
pub mod errors;
pub mod policy;
pub mod transport;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use policy::*;
pub use transport::*;
pub use wire::*;
