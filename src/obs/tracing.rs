// crates.io
use tracing::{Instrument, Span, instrument::Instrumented};
// self
use crate::_prelude::*;

/// Span wrapping a single credential exchange.
#[derive(Clone, Debug)]
pub struct ExchangeSpan {
	span: Span,
}
impl ExchangeSpan {
	/// Creates a span tagged with the exchange endpoint.
	pub fn new(endpoint: &Url) -> Self {
		let span = tracing::info_span!("oauth2_token_cache.exchange", endpoint = %endpoint);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
