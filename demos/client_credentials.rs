//! Demonstrates sharing one reqwest-backed token cache across concurrent tasks: the identity
//! endpoint sees a single exchange and every task receives the same bearer token.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use tokio::task::JoinSet;
use url::Url;
// self
use oauth2_token_cache::{
	cache::TokenCache,
	config::{ClientCredential, ExchangeConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body("grant_type=client_credentials");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let config = ExchangeConfig::builder()
		.endpoint(Url::parse(&server.url("/token"))?)
		.credential(ClientCredential::new("demo-client", "super-secret")?)
		.build()?;
	let cache = Arc::new(TokenCache::from_config(&config)?);
	let mut tasks = JoinSet::new();

	for worker in 0..4 {
		let cache = cache.clone();

		tasks.spawn(async move { cache.bearer_header().await.map(|header| (worker, header)) });
	}

	while let Some(joined) = tasks.join_next().await {
		let (worker, header) = joined??;

		println!("Worker {worker} signs requests with `{header}`.");
	}

	println!("Exchanges performed: {}.", cache.metrics().exchanges());

	token_mock.assert_async().await;

	Ok(())
}
