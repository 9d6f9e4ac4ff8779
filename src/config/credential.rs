//! Client credential encoding for HTTP Basic client authentication.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, error::ConfigError};

/// Base64-encoded `client_id:client_secret` pair sent as `Authorization: Basic`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredential(String);
impl ClientCredential {
	/// Encodes a client identifier and secret.
	pub fn new(client_id: &str, client_secret: &str) -> Result<Self, ConfigError> {
		if client_id.is_empty() {
			return Err(ConfigError::InvalidCredential { reason: "client id is empty" });
		}
		if client_id.contains(':') {
			return Err(ConfigError::InvalidCredential { reason: "client id contains ':'" });
		}

		Ok(Self(STANDARD.encode(format!("{client_id}:{client_secret}"))))
	}

	/// Parses and encodes a raw `client_id:client_secret` pair.
	pub fn from_pair(pair: &str) -> Result<Self, ConfigError> {
		let (client_id, client_secret) = pair.split_once(':').ok_or(
			ConfigError::InvalidCredential { reason: "expected `client_id:client_secret`" },
		)?;

		Self::new(client_id, client_secret)
	}

	/// Wraps a value that is already Base64-encoded.
	pub fn pre_encoded(encoded: impl Into<String>) -> Result<Self, ConfigError> {
		let encoded = encoded.into();

		if encoded.trim().is_empty() {
			return Err(ConfigError::InvalidCredential { reason: "encoded credential is empty" });
		}

		Ok(Self(encoded))
	}

	/// Value for the `Authorization` header. Callers must avoid logging it.
	pub fn authorization_value(&self) -> String {
		format!("Basic {}", self.0)
	}
}
impl Debug for ClientCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ClientCredential").field(&"<redacted>").finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn encodes_basic_credentials() {
		let credential = ClientCredential::new("client", "secret")
			.expect("Client credential fixture should be valid.");

		assert_eq!(credential.authorization_value(), "Basic Y2xpZW50OnNlY3JldA==");
		assert_eq!(
			ClientCredential::from_pair("client:secret")
				.expect("Credential pair fixture should be valid."),
			credential
		);
		assert_eq!(format!("{credential:?}"), "ClientCredential(\"<redacted>\")");
	}

	#[test]
	fn secret_may_contain_colons() {
		let credential = ClientCredential::from_pair("client:se:cret")
			.expect("Only the first colon should split the pair.");

		assert_eq!(
			credential.authorization_value(),
			format!("Basic {}", STANDARD.encode("client:se:cret"))
		);
	}

	#[test]
	fn rejects_malformed_credentials() {
		assert!(matches!(
			ClientCredential::from_pair("no-separator"),
			Err(ConfigError::InvalidCredential { .. })
		));
		assert!(matches!(
			ClientCredential::new("", "secret"),
			Err(ConfigError::InvalidCredential { .. })
		));
		assert!(matches!(
			ClientCredential::pre_encoded("  "),
			Err(ConfigError::InvalidCredential { .. })
		));
	}
}
