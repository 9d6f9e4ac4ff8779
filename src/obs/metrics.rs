// self
use crate::obs::CacheEvent;

/// Records a cache event via the global metrics recorder (when enabled).
pub fn record_cache_event(event: CacheEvent) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_token_cache_events_total", "event" => event.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = event;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_cache_event_noop_without_recorder() {
		record_cache_event(CacheEvent::StaleFallback);
	}
}
