mod common;

// crates.io
use httpmock::prelude::*;
// self
use common::*;
use oauth2_token_cache::{
	cache::TokenCache,
	config::{ENV_AUTHORIZATION, ENV_ENDPOINT, ENV_SCOPE, ExchangeConfig},
	ext::{BearerSigner, RequestSignerExt, parse_bearer},
	reqwest::Client,
};

#[tokio::test]
async fn env_configured_cache_signs_resource_requests() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("authorization", BASIC_AUTHORIZATION)
				.body("grant_type=client_credentials&scope=pricing.read");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("resource-token", 3600));
		})
		.await;
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/rates").header("authorization", "Bearer resource-token");
			then.status(200).body("[]");
		})
		.await;
	let endpoint = server.url("/token");
	let config = ExchangeConfig::from_env_with(|name| match name {
		ENV_ENDPOINT => Some(endpoint.clone()),
		ENV_AUTHORIZATION => Some(format!("{CLIENT_ID}:{CLIENT_SECRET}")),
		ENV_SCOPE => Some("pricing.read".into()),
		_ => None,
	})
	.expect("Environment-backed config should load.");
	let cache = TokenCache::from_config(&config).expect("Reqwest-backed cache should build.");
	let token = cache.acquire_token().await.expect("Token exchange should succeed.");
	let client = Client::new();
	let Ok(request) = BearerSigner.attach_token(client.get(server.url("/rates")), &token);
	let response = request.send().await.expect("Resource request should be delivered.");

	assert!(response.status().is_success());

	token_mock.assert_async().await;
	resource_mock.assert_async().await;
}

#[tokio::test]
async fn bearer_header_round_trips_through_parser() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("round-trip", 600));
		})
		.await;
	let (cache, _clock) = build_cache(&config(&server));
	let header = cache.bearer_header().await.expect("Bearer header should be produced.");

	assert_eq!(parse_bearer(&header), Some("round-trip"));
}
