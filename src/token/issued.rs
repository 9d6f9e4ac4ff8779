//! Raw result of a successful credential exchange, before it is stamped with an expiry instant.

// self
use crate::{_prelude::*, token::TokenSecret};

/// Token value and provider-declared lifetime returned by a credential exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
	/// Access token secret.
	pub access_token: TokenSecret,
	/// Provider-declared lifetime (`expires_in`), never negative.
	pub expires_in: Duration,
}
impl IssuedToken {
	/// Creates a new issued token.
	pub fn new(access_token: impl Into<String>, expires_in: Duration) -> Self {
		Self { access_token: TokenSecret::new(access_token), expires_in }
	}
}
