//! Observability helpers for cache activity.
//!
//! # Feature Flags
//!
//! - Every exchange runs inside an `oauth2_token_cache.exchange` span carrying the endpoint.
//! - Enable `metrics` to increment the `oauth2_token_cache_events_total` counter for every cache
//!   event, labeled by `event`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Cache events observed while serving callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheEvent {
	/// A fresh cached token was returned without an exchange.
	Hit,
	/// A waiter was served by an exchange another caller performed.
	Joined,
	/// A credential exchange was started.
	Exchange,
	/// A credential exchange failed.
	Failure,
	/// A failed refresh fell back to the previous, still valid token.
	StaleFallback,
}
impl CacheEvent {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheEvent::Hit => "hit",
			CacheEvent::Joined => "joined",
			CacheEvent::Exchange => "exchange",
			CacheEvent::Failure => "failure",
			CacheEvent::StaleFallback => "stale_fallback",
		}
	}
}
impl Display for CacheEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
