//! Typed operations against the grading API.
//!
//! Every call goes through [`ApiClient::send`], so each one gets bearer authorization and the
//! single refresh-and-retry on 401 for free. Request and response payloads are kept loose where
//! upstream shapes vary (question search parameters, result rows) and typed where callers branch
//! on them (execution status, grading verdicts).

pub mod executor;
pub mod question;

pub use executor::*;
pub use question::*;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::TokenClaims,
	error::SessionError,
	flows::ApiClient,
	transport::ApiHttpClient,
};

/// Identifier accepted by the API, which mixes numeric and string ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
	/// Numeric id.
	Number(i64),
	/// String id.
	Text(String),
}
impl Identifier {
	/// Converts a JSON claim value, keeping integers numeric.
	pub fn from_claim(value: &Value) -> Option<Self> {
		match value {
			Value::Number(number) => Some(
				number.as_i64().map(Self::Number).unwrap_or_else(|| Self::Text(number.to_string())),
			),
			Value::String(text) if !text.trim().is_empty() => Some(Self::Text(text.clone())),
			_ => None,
		}
	}
}
impl From<i64> for Identifier {
	fn from(value: i64) -> Self {
		Self::Number(value)
	}
}
impl From<i32> for Identifier {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}
impl From<u32> for Identifier {
	fn from(value: u32) -> Self {
		Self::Number(value.into())
	}
}
impl From<&str> for Identifier {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}
impl From<String> for Identifier {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl Display for Identifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Number(number) => Display::fmt(number, f),
			Self::Text(text) => f.write_str(text),
		}
	}
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Resolves the signed-in user's id from the stored access token.
	///
	/// The token is decoded locally without a network call.
	pub async fn current_user_id(&self) -> Result<Identifier> {
		let access_token = self.tokens.access_token().await?.ok_or(SessionError::NotLoggedIn)?;
		let claims = TokenClaims::decode(&access_token)?;
		let user_id = claims.user_id_claim().and_then(Identifier::from_claim).ok_or_else(|| {
			SessionError::MalformedCredential { reason: "access token carries no user id".into() }
		})?;

		Ok(user_id)
	}

	/// Question catalog operations.
	///
	/// The handle borrows the client. Bind it before driving several calls at once:
	///
	/// ```ignore
	/// let questions = client.questions();
	/// let (a, b) = futures::join!(questions.detail(1), questions.detail(2));
	/// ```
	pub fn questions(&self) -> QuestionApi<'_, C> {
		QuestionApi { client: self }
	}

	/// Query execution and grading operations.
	///
	/// Like [`Self::questions`], bind the handle to a local when joining several of its calls.
	pub fn executor(&self) -> ExecutorApi<'_, C> {
		ExecutorApi { client: self }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_keep_their_wire_shape() {
		assert_eq!(serde_json::to_string(&Identifier::from(7)).expect("Id should encode."), "7");
		assert_eq!(
			serde_json::to_string(&Identifier::from("q-7")).expect("Id should encode."),
			r#""q-7""#
		);
		assert_eq!(
			serde_json::from_str::<Identifier>("12").expect("Id should decode."),
			Identifier::Number(12)
		);
		assert_eq!(Identifier::from("abc").to_string(), "abc");
	}

	#[test]
	fn claim_conversion_rejects_blank_and_structured_values() {
		assert_eq!(Identifier::from_claim(&Value::from(42)), Some(Identifier::Number(42)));
		assert_eq!(Identifier::from_claim(&Value::from("u-1")), Some(Identifier::from("u-1")));
		assert_eq!(Identifier::from_claim(&Value::from(" ")), None);
		assert_eq!(Identifier::from_claim(&Value::Bool(true)), None);
	}
}
