//! Exchange configuration: endpoint, credential, safety margin, and timeout.
//!
//! Values are assembled through [`ExchangeConfigBuilder`] or loaded from the environment with
//! [`ExchangeConfig::from_env`]. Both paths run the same validation.

pub mod credential;

pub use credential::*;

// std
use std::net::IpAddr;
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable holding the token endpoint URL.
pub const ENV_ENDPOINT: &str = "OATH_SERVICE_END_POINT_URL";
/// Environment variable holding the raw `client_id:client_secret` pair.
pub const ENV_AUTHORIZATION: &str = "OATH_AUTHORIZATION";
/// Optional environment variable overriding the safety margin in seconds.
pub const ENV_SAFETY_MARGIN_SECS: &str = "OATH_SAFETY_MARGIN_SECS";
/// Optional environment variable overriding the request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "OATH_REQUEST_TIMEOUT_SECS";
/// Optional environment variable holding the requested scope.
pub const ENV_SCOPE: &str = "OATH_SCOPE";

/// Validated settings for one credential identity and its token endpoint.
#[derive(Clone, Debug)]
pub struct ExchangeConfig {
	/// Token endpoint receiving the client-credentials exchange.
	pub endpoint: Url,
	/// Client credential sent with every exchange.
	pub credential: ClientCredential,
	/// Time subtracted from the declared lifetime before a token counts as stale.
	pub safety_margin: Duration,
	/// Upper bound for a single exchange.
	pub request_timeout: Duration,
	/// Optional `scope` form parameter.
	pub scope: Option<String>,
	/// Additional form parameters (audience, resource, etc.).
	pub extra_params: BTreeMap<String, String>,
}
impl ExchangeConfig {
	/// Default safety margin (60 seconds).
	pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::seconds(60);
	/// Default exchange timeout (30 seconds).
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);

	/// Creates a new builder.
	pub fn builder() -> ExchangeConfigBuilder {
		ExchangeConfigBuilder::default()
	}

	/// Loads the configuration from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_env_with(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through `lookup`, which maps a variable name to its value.
	pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&'static str) -> Option<String>,
	{
		let endpoint = lookup(ENV_ENDPOINT).ok_or(ConfigError::MissingEnv { name: ENV_ENDPOINT })?;
		let endpoint = Url::parse(endpoint.trim())
			.map_err(|source| ConfigError::InvalidEndpoint { value: endpoint.clone(), source })?;
		let pair =
			lookup(ENV_AUTHORIZATION).ok_or(ConfigError::MissingEnv { name: ENV_AUTHORIZATION })?;
		let mut builder =
			Self::builder().endpoint(endpoint).credential(ClientCredential::from_pair(&pair)?);

		if let Some(secs) = parse_secs_env(&lookup, ENV_SAFETY_MARGIN_SECS)? {
			builder = builder.safety_margin(secs);
		}
		if let Some(secs) = parse_secs_env(&lookup, ENV_REQUEST_TIMEOUT_SECS)? {
			builder = builder.request_timeout(secs);
		}
		if let Some(scope) = lookup(ENV_SCOPE).filter(|value| !value.trim().is_empty()) {
			builder = builder.scope(scope.trim());
		}

		builder.build()
	}
}

/// Builder for [`ExchangeConfig`] values.
#[derive(Debug, Default)]
pub struct ExchangeConfigBuilder {
	/// Token endpoint.
	pub endpoint: Option<Url>,
	/// Client credential.
	pub credential: Option<ClientCredential>,
	/// Safety margin override.
	pub safety_margin: Option<Duration>,
	/// Request timeout override.
	pub request_timeout: Option<Duration>,
	/// Requested scope.
	pub scope: Option<String>,
	/// Additional form parameters.
	pub extra_params: BTreeMap<String, String>,
}
impl ExchangeConfigBuilder {
	/// Sets the token endpoint.
	pub fn endpoint(mut self, url: Url) -> Self {
		self.endpoint = Some(url);

		self
	}

	/// Sets the client credential.
	pub fn credential(mut self, credential: ClientCredential) -> Self {
		self.credential = Some(credential);

		self
	}

	/// Overrides the safety margin (defaults to 60 seconds).
	pub fn safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = Some(margin);

		self
	}

	/// Overrides the exchange timeout (defaults to 30 seconds).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Sets the `scope` form parameter.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Adds an extra form parameter to every exchange.
	pub fn extra_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.insert(key.into(), value.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ExchangeConfig, ConfigError> {
		let endpoint = self.endpoint.ok_or(ConfigError::MissingEndpoint)?;
		let credential = self.credential.ok_or(ConfigError::MissingCredential)?;
		let safety_margin = self.safety_margin.unwrap_or(ExchangeConfig::DEFAULT_SAFETY_MARGIN);
		let request_timeout =
			self.request_timeout.unwrap_or(ExchangeConfig::DEFAULT_REQUEST_TIMEOUT);

		validate_endpoint(&endpoint)?;

		if safety_margin.is_negative() {
			return Err(ConfigError::NegativeSafetyMargin);
		}
		if !request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		Ok(ExchangeConfig {
			endpoint,
			credential,
			safety_margin,
			request_timeout,
			scope: self.scope,
			extra_params: self.extra_params,
		})
	}
}

fn validate_endpoint(url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ConfigError::InsecureEndpoint { url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(url::Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}

fn parse_secs_env<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
	F: Fn(&'static str) -> Option<String>,
{
	let Some(raw) = lookup(name) else {
		return Ok(None);
	};
	let secs = raw
		.trim()
		.parse::<i64>()
		.map_err(|_| ConfigError::InvalidEnv { name, value: raw.clone() })?;

	Ok(Some(Duration::seconds(secs)))
}
