//! Helpers shared by the HTTP-backed integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
use time::{Duration, macros};
// self
use oauth2_token_cache::{
	cache::{ReqwestTokenCache, TokenCache},
	clock::ManualClock,
	config::{ClientCredential, ExchangeConfig},
	exchange::HttpCredentialExchanger,
	url::Url,
};

pub const CLIENT_ID: &str = "pricing-client";
pub const CLIENT_SECRET: &str = "pricing-secret";
// base64("pricing-client:pricing-secret")
pub const BASIC_AUTHORIZATION: &str = "Basic cHJpY2luZy1jbGllbnQ6cHJpY2luZy1zZWNyZXQ=";

pub fn config(server: &MockServer) -> ExchangeConfig {
	config_for(&server.url("/token"))
}

pub fn config_for(endpoint: &str) -> ExchangeConfig {
	ExchangeConfig::builder()
		.endpoint(Url::parse(endpoint).expect("Mock token endpoint should parse successfully."))
		.credential(
			ClientCredential::new(CLIENT_ID, CLIENT_SECRET)
				.expect("Client credential fixture should be valid."),
		)
		.build()
		.expect("Exchange config should build for a loopback endpoint.")
}

pub fn build_cache(config: &ExchangeConfig) -> (Arc<ReqwestTokenCache>, ManualClock) {
	build_cache_with_timeout(config, ExchangeConfig::DEFAULT_REQUEST_TIMEOUT)
}

pub fn build_cache_with_timeout(
	config: &ExchangeConfig,
	timeout: Duration,
) -> (Arc<ReqwestTokenCache>, ManualClock) {
	let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
	let exchanger =
		HttpCredentialExchanger::new(config).expect("Reqwest exchanger should build successfully.");
	let cache = TokenCache::builder(Arc::new(exchanger))
		.safety_margin(config.safety_margin)
		.request_timeout(timeout)
		.clock(clock.clone())
		.build();

	(Arc::new(cache), clock)
}

pub fn token_body(access_token: &str, expires_in: i64) -> String {
	format!(
		"{{\"access_token\":\"{access_token}\",\"token_type\":\"bearer\",\"expires_in\":{expires_in}}}"
	)
}
