//! Single-flight token cache for one credential identity.
//!
//! [`TokenCache::acquire`] answers from the cached token while the clock sits before
//! `expires_at - safety_margin`. Once that deadline passes, the first caller runs one credential
//! exchange under an async lock and every caller queued behind it receives that exchange's
//! outcome, success or error, instead of starting another one.
//!
//! A failed refresh never discards a token that is still valid: the previous token keeps being
//! served, with a warning, until its hard expiry. Failures are never cached past the flight that
//! produced them, so the next call after a failure starts a new exchange.

mod metrics;

pub use metrics::CacheMetrics;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
#[cfg(feature = "reqwest")]
use crate::{
	error::ConfigError,
	exchange::{HttpCredentialExchanger, ReqwestTransportErrorMapper},
	http::ReqwestHttpClient,
};
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	config::ExchangeConfig,
	error::{ExchangeError, TransportError},
	exchange::CredentialExchanger,
	obs::{self, CacheEvent, ExchangeSpan},
	token::{CachedToken, IssuedToken, TokenSecret},
};

/// Cache wired to the stock reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestTokenCache =
	TokenCache<HttpCredentialExchanger<ReqwestHttpClient, ReqwestTransportErrorMapper>>;

type Outcome = Result<Arc<CachedToken>, ExchangeError>;

/// Result of the most recent completed exchange, kept for callers that queued behind it.
#[derive(Default)]
struct Flight {
	generation: u64,
	outcome: Option<Outcome>,
}

/// Thread-safe cache that keeps at most one credential exchange in flight.
///
/// Share it behind an [`Arc`]; every method takes `&self`.
pub struct TokenCache<X>
where
	X: ?Sized + CredentialExchanger,
{
	exchanger: Arc<X>,
	clock: Arc<dyn Clock>,
	safety_margin: Duration,
	request_timeout: Duration,
	current: RwLock<Option<Arc<CachedToken>>>,
	flight: AsyncMutex<Flight>,
	completed: AtomicU64,
	metrics: CacheMetrics,
}
impl<X> TokenCache<X>
where
	X: ?Sized + CredentialExchanger,
{
	/// Starts building a cache around `exchanger`.
	pub fn builder(exchanger: Arc<X>) -> TokenCacheBuilder<X> {
		TokenCacheBuilder::new(exchanger)
	}

	/// Returns a token that is valid for at least the safety margin, exchanging credentials when
	/// the cached one is missing or too close to expiry.
	///
	/// When the refresh fails but the previous token has not expired yet, that token is returned
	/// and the failure is only logged.
	pub async fn acquire(&self) -> Result<TokenSecret, ExchangeError> {
		self.acquire_token().await.map(|token| token.value.clone())
	}

	/// Same as [`acquire`](Self::acquire) but returns the whole snapshot, including its expiry.
	pub async fn acquire_token(&self) -> Result<Arc<CachedToken>, ExchangeError> {
		if let Some(token) = self.fresh_token() {
			self.record_hit();

			return Ok(token);
		}

		let observed = self.completed.load(Ordering::Acquire);
		let mut flight = self.flight.lock().await;

		// An exchange finished while this caller was queued; share its outcome.
		let joined = if flight.generation != observed { flight.outcome.clone() } else { None };

		if let Some(outcome) = joined {
			self.metrics.record_joined();
			obs::record_cache_event(CacheEvent::Joined);
			tracing::debug!(
				endpoint = %self.exchanger.endpoint(),
				ok = outcome.is_ok(),
				"Joined a completed credential exchange."
			);

			return outcome;
		}
		if let Some(token) = self.fresh_token() {
			self.record_hit();

			return Ok(token);
		}

		let outcome = self.refresh().await;

		flight.generation = flight.generation.wrapping_add(1);
		flight.outcome = Some(outcome.clone());
		self.completed.store(flight.generation, Ordering::Release);

		outcome
	}

	/// Returns an `Authorization` header value (`Bearer <token>`) for the current token.
	pub async fn bearer_header(&self) -> Result<String, ExchangeError> {
		Ok(self.acquire().await?.bearer())
	}

	/// Returns the cached snapshot without checking freshness or contacting the endpoint.
	pub fn peek(&self) -> Option<Arc<CachedToken>> {
		self.current.read().clone()
	}

	/// Drops the cached token so the next [`acquire`](Self::acquire) performs an exchange.
	///
	/// Use this after a resource server rejects the token. With nothing cached, a failure of that
	/// next exchange propagates to the caller.
	pub fn invalidate(&self) {
		if self.current.write().take().is_some() {
			tracing::debug!(endpoint = %self.exchanger.endpoint(), "Invalidated the cached token.");
		}
	}

	/// Counters describing how callers were served.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}

	/// Exchanger backing this cache.
	pub fn exchanger(&self) -> &Arc<X> {
		&self.exchanger
	}

	/// Margin before expiry at which the cached token stops being served.
	pub fn safety_margin(&self) -> Duration {
		self.safety_margin
	}

	/// Upper bound on a single exchange.
	pub fn request_timeout(&self) -> Duration {
		self.request_timeout
	}

	fn fresh_token(&self) -> Option<Arc<CachedToken>> {
		let now = self.clock.now();

		self.current
			.read()
			.as_ref()
			.filter(|token| token.is_fresh_at(now, self.safety_margin))
			.cloned()
	}

	fn record_hit(&self) {
		self.metrics.record_hit();
		obs::record_cache_event(CacheEvent::Hit);
		tracing::debug!(endpoint = %self.exchanger.endpoint(), "Served the cached token.");
	}

	// Callers must hold the flight lock.
	async fn refresh(&self) -> Outcome {
		let endpoint = self.exchanger.endpoint();
		let span = ExchangeSpan::new(endpoint);

		span.instrument(async move {
			self.metrics.record_exchange();
			obs::record_cache_event(CacheEvent::Exchange);

			let timeout = self.request_timeout.unsigned_abs();
			let result = match tokio::time::timeout(timeout, self.exchanger.exchange()).await {
				Ok(result) => result,
				Err(_) => Err(ExchangeError::new(
					endpoint,
					TransportError::Timeout { timeout: self.request_timeout },
				)),
			};
			let now = self.clock.now();

			match result.and_then(|issued| self.store(issued, now)) {
				Ok(token) => Ok(token),
				Err(e) => self.fall_back(e, now),
			}
		})
		.await
	}

	fn store(&self, issued: IssuedToken, now: OffsetDateTime) -> Outcome {
		let endpoint = self.exchanger.endpoint();
		let expires_in = issued.expires_in;
		let token = CachedToken::from_issued(issued, now)
			.map(Arc::new)
			.map_err(|e| ExchangeError::new(endpoint, e))?;

		if expires_in <= self.safety_margin {
			tracing::warn!(
				%endpoint,
				expires_in = expires_in.whole_seconds(),
				safety_margin = self.safety_margin.whole_seconds(),
				"Issued token lifetime does not exceed the safety margin."
			);
		} else {
			tracing::info!(
				%endpoint,
				expires_in = expires_in.whole_seconds(),
				"Cached a freshly issued token."
			);
		}

		*self.current.write() = Some(token.clone());

		Ok(token)
	}

	fn fall_back(&self, error: ExchangeError, now: OffsetDateTime) -> Outcome {
		self.metrics.record_failure();
		obs::record_cache_event(CacheEvent::Failure);

		let previous = self.current.read().clone().filter(|token| !token.is_expired_at(now));

		match previous {
			Some(token) => {
				self.metrics.record_stale_fallback();
				obs::record_cache_event(CacheEvent::StaleFallback);
				tracing::warn!(
					endpoint = %error.endpoint,
					cause = %error.failure,
					remaining_secs = token.remaining_at(now).whole_seconds(),
					"Credential exchange failed; serving the previous token until it expires."
				);

				Ok(token)
			},
			None => {
				tracing::error!(
					endpoint = %error.endpoint,
					cause = %error.failure,
					"Credential exchange failed and no valid token is cached."
				);

				Err(error)
			},
		}
	}
}
#[cfg(feature = "reqwest")]
impl TokenCache<HttpCredentialExchanger<ReqwestHttpClient, ReqwestTransportErrorMapper>> {
	/// Builds a reqwest-backed cache using the margin and timeout from `config`.
	pub fn from_config(config: &ExchangeConfig) -> Result<Self, ConfigError> {
		let exchanger = HttpCredentialExchanger::new(config)?;

		Ok(Self::builder(Arc::new(exchanger))
			.safety_margin(config.safety_margin)
			.request_timeout(config.request_timeout)
			.build())
	}
}
impl<X> Debug for TokenCache<X>
where
	X: ?Sized + CredentialExchanger,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("endpoint", &self.exchanger.endpoint().as_str())
			.field("safety_margin", &self.safety_margin)
			.field("request_timeout", &self.request_timeout)
			.field("cached", &self.peek())
			.finish()
	}
}

/// Builder for [`TokenCache`].
pub struct TokenCacheBuilder<X>
where
	X: ?Sized + CredentialExchanger,
{
	exchanger: Arc<X>,
	clock: Arc<dyn Clock>,
	safety_margin: Duration,
	request_timeout: Duration,
}
impl<X> TokenCacheBuilder<X>
where
	X: ?Sized + CredentialExchanger,
{
	fn new(exchanger: Arc<X>) -> Self {
		Self {
			exchanger,
			clock: Arc::new(SystemClock),
			safety_margin: ExchangeConfig::DEFAULT_SAFETY_MARGIN,
			request_timeout: ExchangeConfig::DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Overrides the safety margin (defaults to 60 seconds, negative values clamp to zero).
	pub fn safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Overrides the exchange timeout (defaults to 30 seconds, non-positive values are ignored).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		if timeout.is_positive() {
			self.request_timeout = timeout;
		}

		self
	}

	/// Replaces the wall clock, typically with a [`ManualClock`](crate::clock::ManualClock).
	pub fn clock(mut self, clock: impl 'static + Clock) -> Self {
		self.clock = Arc::new(clock);

		self
	}

	/// Finalizes the cache with nothing cached.
	pub fn build(self) -> TokenCache<X> {
		TokenCache {
			exchanger: self.exchanger,
			clock: self.clock,
			safety_margin: self.safety_margin,
			request_timeout: self.request_timeout,
			current: RwLock::new(None),
			flight: AsyncMutex::new(Flight::default()),
			completed: AtomicU64::new(0),
			metrics: CacheMetrics::default(),
		}
	}
}
