// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing how callers were served.
#[derive(Debug, Default)]
pub struct CacheMetrics {
	hits: AtomicU64,
	joined: AtomicU64,
	exchanges: AtomicU64,
	failures: AtomicU64,
	stale_fallbacks: AtomicU64,
}
impl CacheMetrics {
	/// Returns the number of calls answered from a fresh cached token.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Returns the number of calls answered by an exchange another caller performed.
	pub fn joined(&self) -> u64 {
		self.joined.load(Ordering::Relaxed)
	}

	/// Returns the number of credential exchanges started.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Returns the number of failed credential exchanges (including those masked by a fallback).
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refreshes answered with the previous token.
	pub fn stale_fallbacks(&self) -> u64 {
		self.stale_fallbacks.load(Ordering::Relaxed)
	}

	pub(crate) fn record_hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_joined(&self) {
		self.joined.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_stale_fallback(&self) {
		self.stale_fallbacks.fetch_add(1, Ordering::Relaxed);
	}
}
