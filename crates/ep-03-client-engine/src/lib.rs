//! # Client Protocol Engine (EP-03)
//!
//! The client side of the relay protocol: signs payloads, requests and
//! redeems permission tokens, solves proof-of-work challenges, and
//! re-verifies every delivered message before surfacing it.
//!
//! ## Components
//!
//! - **Engine** (`engine`): the session state machine driving publish and
//!   subscribe flows over a [`ports::RelayConnector`]
//! - **Solver** (`solver`): cooperative hashcash search with a bounded
//!   budget
//! - **Verification** (`verify`): the full delivery trust chain, fatal on
//!   first failure
//! - **Key helpers** (`keys`): short display identifiers and keypair
//!   self-checks
//!
//! ## Trust model
//!
//! The engine trusts nothing it cannot re-verify: a delivery counts only
//! if the sender's signature covers the payload, the relay's signature
//! covers the stamp, and every stamped field matches the message. One bad
//! frame closes the whole subscription.

pub mod engine;
pub mod errors;
pub mod keys;
pub mod ports;
pub mod solver;
pub mod verify;

// Re-export public API
pub use engine::{
    ClientProtocolEngine, EngineConfig, MessageStream, SessionState, Subscription,
};
pub use errors::{ClientError, DeliveryError};
pub use keys::{is_valid_keypair, short_id};
pub use ports::{ConnectorError, RelayConnector};
pub use verify::verify_delivery;
