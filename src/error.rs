//! Error types shared by the cache, the credential exchange, and configuration loading.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Type-erased error source that can be cloned into every waiter of a shared exchange.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential exchange failed and no valid cached token was available.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
}

/// Configuration and validation failures raised while assembling a cache.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Token endpoint was not configured.
	#[error("Missing token endpoint.")]
	MissingEndpoint,
	/// Client credential was not configured.
	#[error("Missing client credential.")]
	MissingCredential,
	/// Token endpoint cannot be parsed.
	#[error("Token endpoint is not a valid URL: {value}.")]
	InvalidEndpoint {
		/// Raw endpoint value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token endpoint must use HTTPS outside of loopback hosts.
	#[error("The token endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Client credential is empty or not in `client_id:client_secret` form.
	#[error("Client credential is invalid: {reason}.")]
	InvalidCredential {
		/// Reason the credential was rejected.
		reason: &'static str,
	},
	/// Safety margin cannot be negative.
	#[error("The safety margin must not be negative.")]
	NegativeSafetyMargin,
	/// Request timeout must be a positive duration.
	#[error("The request timeout must be positive.")]
	NonPositiveTimeout,
	/// A required environment variable is not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds a value that cannot be interpreted.
	#[error("Environment variable `{name}` has an invalid value: {value}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Offending value.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failure of a single credential exchange, tagged with the endpoint it targeted.
///
/// The error is `Clone` so that one failed exchange can be reported to every caller that was
/// waiting on it.
#[derive(Clone, Debug, ThisError)]
#[error("Credential exchange with {endpoint} failed.")]
pub struct ExchangeError {
	/// Token endpoint the exchange was sent to.
	pub endpoint: String,
	/// What went wrong.
	#[source]
	pub failure: ExchangeFailure,
}
impl ExchangeError {
	/// Creates an error for `endpoint`.
	pub fn new(endpoint: impl Display, failure: impl Into<ExchangeFailure>) -> Self {
		Self { endpoint: endpoint.to_string(), failure: failure.into() }
	}

	/// Returns the transport failure, if this is one.
	pub fn as_transport(&self) -> Option<&TransportError> {
		match &self.failure {
			ExchangeFailure::Transport(e) => Some(e),
			_ => None,
		}
	}

	/// Returns the upstream status failure, if this is one.
	pub fn as_upstream_status(&self) -> Option<&UpstreamStatusError> {
		match &self.failure {
			ExchangeFailure::UpstreamStatus(e) => Some(e),
			_ => None,
		}
	}

	/// Returns the malformed-response failure, if this is one.
	pub fn as_malformed_response(&self) -> Option<&MalformedResponseError> {
		match &self.failure {
			ExchangeFailure::MalformedResponse(e) => Some(e),
			_ => None,
		}
	}
}

/// Classified cause of an [`ExchangeError`].
#[derive(Clone, Debug, ThisError)]
pub enum ExchangeFailure {
	/// Identity endpoint could not be reached.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Identity endpoint answered with a non-success status.
	#[error(transparent)]
	UpstreamStatus(#[from] UpstreamStatusError),
	/// Identity endpoint answered successfully but the payload is unusable.
	#[error(transparent)]
	MalformedResponse(#[from] MalformedResponseError),
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// The exchange did not complete within the configured timeout.
	#[error("Token endpoint did not respond within {timeout}.")]
	Timeout {
		/// Configured request timeout.
		timeout: Duration,
	},
	/// The outbound request could not be assembled.
	#[error("Token request could not be constructed.")]
	Request {
		/// Underlying construction failure.
		#[source]
		source: SharedError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Arc::new(src) }
	}

	/// Wraps a request construction error.
	pub fn request(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Request { source: Arc::new(src) }
	}
}
impl From<std::io::Error> for TransportError {
	fn from(e: std::io::Error) -> Self {
		Self::network(e)
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Non-success HTTP status returned by the token endpoint.
#[derive(Clone, Debug, ThisError)]
#[error(
	"Token endpoint responded with HTTP {status}{}.",
	describe_oauth_error(.oauth_error, .error_description)
)]
pub struct UpstreamStatusError {
	/// HTTP status code.
	pub status: u16,
	/// OAuth `error` field, when the body carried one.
	pub oauth_error: Option<String>,
	/// OAuth `error_description` field, when the body carried one.
	pub error_description: Option<String>,
	/// Leading portion of the response body for diagnostics.
	pub body_preview: Option<String>,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
}
impl UpstreamStatusError {
	/// Creates an error for `status` with no further detail.
	pub fn new(status: u16) -> Self {
		Self {
			status,
			oauth_error: None,
			error_description: None,
			body_preview: None,
			retry_after: None,
		}
	}
}

fn describe_oauth_error(error: &Option<String>, description: &Option<String>) -> String {
	match (error, description) {
		(Some(error), Some(description)) => format!(" ({error}: {description})"),
		(Some(error), None) => format!(" ({error})"),
		(None, Some(description)) => format!(" ({description})"),
		(None, None) => String::new(),
	}
}

/// Success response whose payload lacks a usable token or lifetime.
#[derive(Clone, Debug, ThisError)]
pub enum MalformedResponseError {
	/// Body is not a JSON object of the expected shape.
	#[error("Token endpoint returned malformed JSON.")]
	Json {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
	},
	/// `access_token` is absent or empty.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// `expires_in` is absent.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// `expires_in` is not an integer.
	#[error("The expires_in value is not an integer: {value}.")]
	InvalidExpiresIn {
		/// Raw value as received.
		value: String,
	},
	/// `expires_in` is negative.
	#[error("The expires_in value must not be negative: {value}.")]
	NegativeExpiresIn {
		/// Parsed value.
		value: i64,
	},
	/// `expires_in` cannot be represented as an expiry instant.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn upstream_status_message_includes_oauth_fields() {
		let mut err = UpstreamStatusError::new(401);

		assert_eq!(err.to_string(), "Token endpoint responded with HTTP 401.");

		err.oauth_error = Some("invalid_client".into());

		assert_eq!(err.to_string(), "Token endpoint responded with HTTP 401 (invalid_client).");

		err.error_description = Some("unknown client".into());

		assert_eq!(
			err.to_string(),
			"Token endpoint responded with HTTP 401 (invalid_client: unknown client)."
		);
	}

	#[test]
	fn exchange_error_accessors_match_failure() {
		let err = ExchangeError::new(
			"https://idp.example.com/token",
			MalformedResponseError::MissingAccessToken,
		);

		assert_eq!(
			err.to_string(),
			"Credential exchange with https://idp.example.com/token failed."
		);
		assert!(err.as_malformed_response().is_some());
		assert!(err.as_transport().is_none());
		assert!(err.as_upstream_status().is_none());
		assert_eq!(
			err.source().map(ToString::to_string),
			Some("Token endpoint response is missing access_token.".into())
		);
	}
}
