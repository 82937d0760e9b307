//! # Domain Layer
//!
//! Token construction, stateless authentication, and input validation.
//! Pure logic with no I/O dependencies; the only state is the relay key.

pub mod tokens;
pub mod validation;
