//! Unverified JWT claim decoding for access tokens.
//!
//! The client never validates signatures; upstream does. Claims are only read to learn who the
//! session belongs to and when the access token stops being useful.

// crates.io
use base64::{
	Engine,
	engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use serde::Deserializer;
use serde_json::Value;
// self
use crate::{_prelude::*, auth::TokenSecret, error::SessionError};

const USER_ID_CLAIMS: [&str; 3] = ["userId", "id", "sub"];

/// Claims carried in an access token's payload segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Expiry as seconds since the Unix epoch; fractional values are truncated.
	#[serde(
		default,
		deserialize_with = "lenient_epoch_seconds",
		skip_serializing_if = "Option::is_none"
	)]
	pub exp: Option<i64>,
	/// Every other claim, preserved verbatim.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl TokenClaims {
	/// Decodes the payload segment of a compact JWT.
	pub fn decode(token: &TokenSecret) -> Result<Self, SessionError> {
		let mut segments = token.expose().split('.');
		let payload = match (segments.next(), segments.next()) {
			(Some(_header), Some(payload)) if !payload.is_empty() => payload,
			_ => return Err(malformed("token is not a compact JWT")),
		};
		let bytes = URL_SAFE_NO_PAD
			.decode(payload)
			.or_else(|_| URL_SAFE.decode(payload))
			.map_err(|e| malformed(format!("payload is not base64url: {e}")))?;

		serde_json::from_slice(&bytes)
			.map_err(|e| malformed(format!("payload is not a JSON object: {e}")))
	}

	/// Returns the expiry instant, if the token carries one.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.exp.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
	}

	/// Returns `true` when the token carries an expiry at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expiry| expiry <= instant)
	}

	/// Returns `true` when the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Resolves the user identifier from `userId`, `id`, or `sub`, in that order.
	///
	/// String and numeric claims are both accepted; blank strings are skipped.
	pub fn user_id(&self) -> Option<String> {
		self.user_id_claim().map(|claim| match claim {
			Value::String(value) => value.clone(),
			other => other.to_string(),
		})
	}

	/// Returns the raw claim [`TokenClaims::user_id`] is resolved from.
	///
	/// The value is always a non-blank string or a number.
	pub fn user_id_claim(&self) -> Option<&Value> {
		USER_ID_CLAIMS.iter().filter_map(|claim| self.extra.get(*claim)).find(|value| match value {
			Value::String(value) => !value.trim().is_empty(),
			Value::Number(_) => true,
			_ => false,
		})
	}

	/// Returns a raw claim by name.
	pub fn get(&self, claim: &str) -> Option<&Value> {
		self.extra.get(claim)
	}
}

fn malformed(reason: impl Into<String>) -> SessionError {
	SessionError::MalformedCredential { reason: reason.into() }
}

fn lenient_epoch_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	let seconds = match Value::deserialize(deserializer)? {
		Value::Number(number) => number.as_i64().or_else(|| number.as_f64().map(truncate)),
		Value::String(text) => text.trim().parse::<f64>().ok().map(truncate),
		_ => None,
	};

	Ok(seconds)
}

fn truncate(seconds: f64) -> i64 {
	seconds.trunc() as i64
}

#[cfg(test)]
pub(crate) mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	pub(crate) fn jwt(payload: &str) -> TokenSecret {
		let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
		let body = URL_SAFE_NO_PAD.encode(payload);

		TokenSecret::new(format!("{header}.{body}.signature"))
	}

	#[test]
	fn decodes_expiry_and_user_id() {
		let claims = TokenClaims::decode(&jwt(r#"{"exp":1735693200,"userId":42,"name":"Ada"}"#))
			.expect("Claims fixture should decode.");

		assert_eq!(claims.expires_at(), Some(macros::datetime!(2025-01-01 01:00 UTC)));
		assert_eq!(claims.user_id().as_deref(), Some("42"));
		assert_eq!(claims.get("name"), Some(&Value::String("Ada".into())));
		assert!(claims.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
		assert!(!claims.is_expired_at(macros::datetime!(2025-01-01 00:59 UTC)));
	}

	#[test]
	fn fractional_or_textual_expiry_still_decodes() {
		let claims = TokenClaims::decode(&jwt(r#"{"exp":1735693200.75,"userId":1}"#))
			.expect("Fractional expiry should decode.");

		assert_eq!(claims.exp, Some(1735693200));
		assert!(claims.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));

		let claims = TokenClaims::decode(&jwt(r#"{"exp":"1735693200"}"#))
			.expect("Textual expiry should decode.");

		assert_eq!(claims.expires_at(), Some(macros::datetime!(2025-01-01 01:00 UTC)));

		let claims = TokenClaims::decode(&jwt(r#"{"exp":null}"#))
			.expect("Null expiry should decode.");

		assert_eq!(claims.exp, None);
	}

	#[test]
	fn user_id_falls_back_through_claims() {
		let claims = TokenClaims::decode(&jwt(r#"{"userId":"","id":"u-7","sub":"subject"}"#))
			.expect("Claims fixture should decode.");

		assert_eq!(claims.user_id().as_deref(), Some("u-7"));

		let claims = TokenClaims::decode(&jwt(r#"{"sub":"subject"}"#))
			.expect("Claims fixture should decode.");

		assert_eq!(claims.user_id().as_deref(), Some("subject"));
		assert!(!claims.is_expired());
	}

	#[test]
	fn rejects_tokens_that_are_not_jwts() {
		for raw in ["opaque-token", "a.!!!.c", "a..c"] {
			let err = TokenClaims::decode(&TokenSecret::new(raw))
				.expect_err("Non-JWT input should be rejected.");

			assert!(matches!(err, SessionError::MalformedCredential { .. }), "{raw}: {err:?}");
		}

		let not_object = TokenSecret::new(format!("h.{}.s", URL_SAFE_NO_PAD.encode("[1,2]")));

		assert!(TokenClaims::decode(&not_object).is_err());
	}
}
