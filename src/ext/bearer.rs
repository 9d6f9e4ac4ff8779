//! Parsing of inbound `Authorization: Bearer` header values.

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is ignored. Returns
/// `None` for other schemes or an empty token.
pub fn parse_bearer(header: &str) -> Option<&str> {
	let (scheme, token) = header.trim().split_once(char::is_whitespace)?;

	if !scheme.eq_ignore_ascii_case("bearer") {
		return None;
	}

	let token = token.trim();

	if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_bearer_accepts_any_scheme_case() {
		assert_eq!(parse_bearer("Bearer abc"), Some("abc"));
		assert_eq!(parse_bearer("  bearer   abc.def  "), Some("abc.def"));
		assert_eq!(parse_bearer("BEARER\tabc"), Some("abc"));
	}

	#[test]
	fn parse_bearer_rejects_other_schemes_and_empty_tokens() {
		assert_eq!(parse_bearer("Basic Y2xpZW50OnNlY3JldA=="), None);
		assert_eq!(parse_bearer("Bearer"), None);
		assert_eq!(parse_bearer("Bearer    "), None);
		assert_eq!(parse_bearer(""), None);
	}
}
