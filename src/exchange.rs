//! Credential exchange: the single network call that trades a client credential for a token.
//!
//! [`CredentialExchanger`] is the seam the cache depends on. [`HttpCredentialExchanger`] is the
//! stock implementation: it posts a `grant_type=client_credentials` form with HTTP Basic client
//! authentication through any [`TokenHttpClient`], then classifies the outcome into the
//! [`ExchangeFailure`] taxonomy.

mod response;

pub use response::parse_token_response;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
use url::form_urlencoded;
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	config::{ClientCredential, ExchangeConfig},
	error::{ExchangeError, ExchangeFailure, TransportError},
	http::TokenHttpClient,
	token::IssuedToken,
};

/// Boxed future returned by [`CredentialExchanger::exchange`].
pub type ExchangeFuture<'a> =
	Pin<Box<dyn Future<Output = Result<IssuedToken, ExchangeError>> + 'a + Send>>;

/// Performs one credential exchange against an identity endpoint.
///
/// Implementations perform exactly one outbound call per invocation and never retry; retry policy
/// belongs to whoever calls the cache.
pub trait CredentialExchanger
where
	Self: Send + Sync,
{
	/// Endpoint the exchange targets, used for error context and logging.
	fn endpoint(&self) -> &Url;

	/// Exchanges the configured credential for a token and its declared lifetime.
	fn exchange(&self) -> ExchangeFuture<'_>;
}

/// Maps HTTP transport failures into [`TransportError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport.
	fn map_transport_error(&self, error: HttpClientError<E>) -> TransportError;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, err: HttpClientError<ReqwestError>) -> TransportError {
		match err {
			HttpClientError::Reqwest(inner) =>
				if inner.is_builder() {
					TransportError::request(*inner)
				} else {
					TransportError::from(*inner)
				},
			HttpClientError::Http(inner) => TransportError::request(inner),
			HttpClientError::Io(inner) => TransportError::from(inner),
			HttpClientError::Other(message) =>
				TransportError::from(std::io::Error::other(message)),
			_ => TransportError::from(std::io::Error::other("unknown HTTP client failure")),
		}
	}
}

/// [`CredentialExchanger`] that talks to a token endpoint over HTTP.
pub struct HttpCredentialExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	endpoint: Url,
	credential: ClientCredential,
	form: String,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> HttpCredentialExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an exchanger that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: &ExchangeConfig,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Self {
		Self {
			endpoint: config.endpoint.clone(),
			credential: config.credential.clone(),
			form: encode_form(config),
			http_client,
			error_mapper,
		}
	}

	fn build_request(&self) -> Result<HttpRequest, TransportError> {
		Request::builder()
			.method(Method::POST)
			.uri(self.endpoint.as_str())
			.header(AUTHORIZATION, self.credential.authorization_value())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(self.form.clone().into_bytes())
			.map_err(TransportError::request)
	}

	fn fail(&self, failure: impl Into<ExchangeFailure>) -> ExchangeError {
		ExchangeError::new(&self.endpoint, failure)
	}
}
#[cfg(feature = "reqwest")]
impl HttpCredentialExchanger<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an exchanger backed by a fresh reqwest client.
	pub fn new(config: &ExchangeConfig) -> Result<Self, crate::error::ConfigError> {
		Ok(Self::with_http_client(
			config,
			Arc::new(ReqwestHttpClient::new()?),
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> CredentialExchanger for HttpCredentialExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	fn exchange(&self) -> ExchangeFuture<'_> {
		Box::pin(async move {
			let request = self.build_request().map_err(|e| self.fail(e))?;
			let handle = self.http_client.handle();
			let response = handle
				.call(request)
				.await
				.map_err(|e| self.fail(self.error_mapper.map_transport_error(e)))?;

			parse_token_response(&response).map_err(|e| self.fail(e))
		})
	}
}
impl<C, M> Debug for HttpCredentialExchanger<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpCredentialExchanger")
			.field("endpoint", &self.endpoint.as_str())
			.field("credential", &self.credential)
			.field("form", &self.form)
			.finish()
	}
}

fn encode_form(config: &ExchangeConfig) -> String {
	let mut form = form_urlencoded::Serializer::new(String::new());

	form.append_pair("grant_type", "client_credentials");

	if let Some(scope) = config.scope.as_deref() {
		form.append_pair("scope", scope);
	}

	for (key, value) in &config.extra_params {
		if key != "grant_type" && key != "scope" {
			form.append_pair(key, value);
		}
	}

	form.finish()
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	fn config() -> ExchangeConfig {
		ExchangeConfig::builder()
			.endpoint(
				Url::parse("https://idp.example.com/as/token.oauth2")
					.expect("Failed to parse endpoint."),
			)
			.credential(
				ClientCredential::new("client", "secret").expect("Failed to build credential."),
			)
			.scope("pricing.read pricing.write")
			.extra_param("audience", "rate-service")
			.extra_param("grant_type", "password")
			.build()
			.expect("Failed to build exchange config.")
	}

	#[test]
	fn request_carries_basic_auth_and_form() {
		let exchanger =
			HttpCredentialExchanger::new(&config()).expect("Failed to build exchanger.");
		let request = exchanger.build_request().expect("Request should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri(), "https://idp.example.com/as/token.oauth2");
		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
			Some("Basic Y2xpZW50OnNlY3JldA==")
		);
		assert_eq!(
			request.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
			Some("application/x-www-form-urlencoded")
		);
		assert_eq!(
			String::from_utf8_lossy(request.body()),
			"grant_type=client_credentials&scope=pricing.read+pricing.write&audience=rate-service"
		);
	}

	#[test]
	fn debug_redacts_credential() {
		let exchanger =
			HttpCredentialExchanger::new(&config()).expect("Failed to build exchanger.");
		let rendered = format!("{exchanger:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("Y2xpZW50OnNlY3JldA=="));
	}

	#[test]
	fn mapper_classifies_other_failures_as_network() {
		let err = ReqwestTransportErrorMapper
			.map_transport_error(HttpClientError::Other("connection reset".into()));

		assert!(matches!(err, TransportError::Network { .. }));
	}
}
