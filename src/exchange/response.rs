//! Token endpoint response classification.

// crates.io
use oauth2::{
	HttpResponse,
	http::{HeaderMap, header::RETRY_AFTER},
};
use serde_json::Value;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ExchangeFailure, MalformedResponseError, UpstreamStatusError},
	token::IssuedToken,
};

const BODY_PREVIEW_LIMIT: usize = 256;

#[derive(Deserialize)]
struct RawTokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<Value>,
}

#[derive(Default, Deserialize)]
struct RawErrorResponse {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

/// Classifies a token endpoint response into an [`IssuedToken`] or an [`ExchangeFailure`].
///
/// `expires_in` is accepted either as a JSON integer or as a string holding one, since some
/// identity providers serialize every field as a string.
pub fn parse_token_response(response: &HttpResponse) -> Result<IssuedToken, ExchangeFailure> {
	if !response.status().is_success() {
		return Err(upstream_status_error(response).into());
	}

	let mut deserializer = serde_json::Deserializer::from_slice(response.body());
	let raw: RawTokenResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| MalformedResponseError::Json { source: Arc::new(source) })?;
	let access_token = raw
		.access_token
		.filter(|token| !token.trim().is_empty())
		.ok_or(MalformedResponseError::MissingAccessToken)?;
	let expires_in = parse_expires_in(raw.expires_in)?;

	Ok(IssuedToken::new(access_token, expires_in))
}

fn parse_expires_in(value: Option<Value>) -> Result<Duration, MalformedResponseError> {
	let secs = match value.ok_or(MalformedResponseError::MissingExpiresIn)? {
		Value::Number(number) => match number.as_i64() {
			Some(secs) => secs,
			None if number.as_u64().is_some() =>
				return Err(MalformedResponseError::ExpiresInOutOfRange),
			None =>
				return Err(MalformedResponseError::InvalidExpiresIn { value: number.to_string() }),
		},
		Value::String(raw) => raw
			.trim()
			.parse::<i64>()
			.map_err(|_| MalformedResponseError::InvalidExpiresIn { value: raw.clone() })?,
		other => return Err(MalformedResponseError::InvalidExpiresIn { value: other.to_string() }),
	};

	if secs < 0 {
		return Err(MalformedResponseError::NegativeExpiresIn { value: secs });
	}

	Ok(Duration::seconds(secs))
}

fn upstream_status_error(response: &HttpResponse) -> UpstreamStatusError {
	let body = response.body();
	let parsed = serde_json::from_slice::<RawErrorResponse>(body).unwrap_or_default();

	UpstreamStatusError {
		status: response.status().as_u16(),
		oauth_error: parsed.error,
		error_description: parsed.error_description,
		body_preview: body_preview(body),
		retry_after: parse_retry_after(response.headers()),
	}
}

fn body_preview(body: &[u8]) -> Option<String> {
	if body.is_empty() {
		return None;
	}

	Some(String::from_utf8_lossy(body).chars().take(BODY_PREVIEW_LIMIT).collect())
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
