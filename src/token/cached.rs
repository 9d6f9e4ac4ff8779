//! Immutable cached token snapshots and their freshness rules.

// self
use crate::{
	_prelude::*,
	error::MalformedResponseError,
	token::{IssuedToken, TokenSecret},
};

/// Token value paired with the absolute instant after which it must not be used.
///
/// Snapshots are never mutated once built; the cache swaps whole `Arc<CachedToken>` values so a
/// reader can never pair one exchange's value with another exchange's expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
	/// Access token secret; callers must avoid logging it.
	pub value: TokenSecret,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Instant derived from `issued_at` plus the provider-declared lifetime.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Stamps an exchange result with `issued_at` and the resulting expiry.
	pub fn from_issued(
		issued: IssuedToken,
		issued_at: OffsetDateTime,
	) -> Result<Self, MalformedResponseError> {
		let expires_at = issued_at
			.checked_add(issued.expires_in)
			.ok_or(MalformedResponseError::ExpiresInOutOfRange)?;

		Ok(Self { value: issued.access_token, issued_at, expires_at })
	}

	/// Returns `true` while `instant` lies before `expires_at - safety_margin`.
	pub fn is_fresh_at(&self, instant: OffsetDateTime, safety_margin: Duration) -> bool {
		match self.expires_at.checked_sub(safety_margin) {
			Some(deadline) => instant < deadline,
			None => false,
		}
	}

	/// Returns `true` once `instant` reaches `expires_at`, ignoring any safety margin.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Lifetime left at `instant`, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn token(expires_in: i64) -> CachedToken {
		CachedToken::from_issued(
			IssuedToken::new("abc", Duration::seconds(expires_in)),
			macros::datetime!(2025-01-01 00:00 UTC),
		)
		.expect("Token fixture should fit in the supported range.")
	}

	#[test]
	fn freshness_honors_safety_margin() {
		let token = token(3600);
		let margin = Duration::seconds(60);
		let issued = token.issued_at;

		assert!(token.is_fresh_at(issued, margin));
		assert!(token.is_fresh_at(issued + Duration::seconds(3539), margin));
		assert!(!token.is_fresh_at(issued + Duration::seconds(3540), margin));
		assert!(!token.is_fresh_at(issued + Duration::seconds(3541), margin));
		assert!(!token.is_expired_at(issued + Duration::seconds(3541)));
		assert!(token.is_expired_at(issued + Duration::seconds(3600)));
	}

	#[test]
	fn lifetime_within_margin_is_never_fresh() {
		let token = token(45);

		assert!(!token.is_fresh_at(token.issued_at, Duration::seconds(60)));
		assert!(!token.is_expired_at(token.issued_at));
		assert_eq!(token.remaining_at(token.issued_at), Duration::seconds(45));
		assert_eq!(token.remaining_at(token.issued_at + Duration::hours(1)), Duration::ZERO);
	}

	#[test]
	fn oversized_lifetime_is_rejected() {
		let err = CachedToken::from_issued(
			IssuedToken::new("abc", Duration::MAX),
			macros::datetime!(2025-01-01 00:00 UTC),
		)
		.expect_err("Durations past the representable range should be rejected.");

		assert!(matches!(err, MalformedResponseError::ExpiresInOutOfRange));
	}

	#[test]
	fn debug_redacts_value() {
		let rendered = format!("{:?}", token(60));

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("abc"));
	}
}
