//! Helpers for putting cached tokens to work on outbound requests and reading them back on
//! inbound ones.

pub mod bearer;
pub mod request_signer;

pub use bearer::*;
pub use request_signer::*;
