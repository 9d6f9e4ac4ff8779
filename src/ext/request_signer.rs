//! Request signing contracts that attach cached tokens to arbitrary HTTP clients.

// std
#[cfg(feature = "reqwest")] use std::convert::Infallible;
// crates.io
use oauth2::{
	HttpRequest,
	http::header::{AUTHORIZATION, HeaderValue, InvalidHeaderValue},
};
// self
use crate::token::CachedToken;

/// Describes how to attach a [`CachedToken`] to an outbound request without constraining the
/// HTTP client type.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects an `Authorization: Bearer` header derived from
	/// the [`CachedToken`].
	fn attach_token(&self, request: Request, token: &CachedToken) -> Result<Request, Error>;
}

/// Signs requests with `Authorization: Bearer <token>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerSigner;
#[cfg(feature = "reqwest")]
impl RequestSignerExt<reqwest::RequestBuilder, Infallible> for BearerSigner {
	fn attach_token(
		&self,
		request: reqwest::RequestBuilder,
		token: &CachedToken,
	) -> Result<reqwest::RequestBuilder, Infallible> {
		Ok(request.bearer_auth(token.value.expose()))
	}
}
impl RequestSignerExt<HttpRequest, InvalidHeaderValue> for BearerSigner {
	fn attach_token(
		&self,
		mut request: HttpRequest,
		token: &CachedToken,
	) -> Result<HttpRequest, InvalidHeaderValue> {
		let mut value = HeaderValue::from_str(&token.value.bearer())?;

		value.set_sensitive(true);
		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(request)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::{Method, Request};
	use time::macros;
	// self
	use super::*;
	use crate::{_prelude::*, token::IssuedToken};

	fn token(value: &str) -> CachedToken {
		CachedToken::from_issued(
			IssuedToken::new(value, Duration::hours(1)),
			macros::datetime!(2025-01-01 00:00 UTC),
		)
		.expect("Token fixture should fit in the supported range.")
	}

	fn request() -> HttpRequest {
		Request::builder()
			.method(Method::GET)
			.uri("https://pricing.example.com/rates")
			.body(Vec::new())
			.expect("Request fixture should build.")
	}

	#[test]
	fn http_request_receives_sensitive_bearer_header() {
		let signed = BearerSigner
			.attach_token(request(), &token("abc"))
			.expect("Signing should succeed for a header-safe token.");
		let header =
			signed.headers().get(AUTHORIZATION).expect("Authorization header should be present.");

		assert_eq!(header, "Bearer abc");
		assert!(header.is_sensitive());
	}

	#[test]
	fn http_request_rejects_header_unsafe_token() {
		let result = BearerSigner.attach_token(request(), &token("line\nbreak"));

		assert!(result.is_err());
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn reqwest_builder_receives_bearer_header() {
		let builder = ReqwestClient::new().get("https://pricing.example.com/rates");
		let Ok(signed) = BearerSigner.attach_token(builder, &token("abc"));
		let request = signed.build().expect("Signed request should build.");

		assert_eq!(
			request.headers().get(AUTHORIZATION).expect("Authorization header should be present."),
			"Bearer abc"
		);
	}
}
