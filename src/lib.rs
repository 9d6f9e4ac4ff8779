//! Single-flight OAuth 2.0 client-credentials token cache: one credential exchange in flight at a
//! time, safety-margin expiry, and stale-but-valid fallback when a refresh fails.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod exchange;
pub mod ext;
pub mod http;
pub mod obs;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		cache::{ReqwestTokenCache, TokenCache},
		clock::ManualClock,
		config::{ClientCredential, ExchangeConfig},
		exchange::{HttpCredentialExchanger, ReqwestTransportErrorMapper},
		http::ReqwestHttpClient,
	};

	/// Fixed start instant used by [`ManualClock`]-driven tests.
	pub const TEST_EPOCH: OffsetDateTime = time::macros::datetime!(2025-01-01 00:00 UTC);

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds an [`ExchangeConfig`] pointing at `endpoint` with fixed test credentials.
	pub fn test_config(endpoint: &str) -> ExchangeConfig {
		ExchangeConfig::builder()
			.endpoint(Url::parse(endpoint).expect("Failed to parse test token endpoint."))
			.credential(
				ClientCredential::new("test-client", "test-secret")
					.expect("Failed to build test credential."),
			)
			.build()
			.expect("Failed to build test exchange config.")
	}

	/// Constructs a reqwest-backed [`TokenCache`] driven by a [`ManualClock`] seeded at
	/// [`TEST_EPOCH`].
	pub fn build_reqwest_test_cache(config: &ExchangeConfig) -> (ReqwestTokenCache, ManualClock) {
		let clock = ManualClock::new(TEST_EPOCH);
		let exchanger = HttpCredentialExchanger::with_http_client(
			config,
			Arc::new(test_reqwest_http_client()),
			Arc::new(ReqwestTransportErrorMapper),
		);
		let cache = TokenCache::builder(Arc::new(exchanger))
			.safety_margin(config.safety_margin)
			.request_timeout(config.request_timeout)
			.clock(clock.clone())
			.build();

		(cache, clock)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
