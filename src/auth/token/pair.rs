//! The persisted access/refresh token pair.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access token plus the optional refresh token issued alongside it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
	/// Short-lived bearer credential.
	pub access_token: TokenSecret,
	/// Longer-lived credential exchanged for new access tokens.
	pub refresh_token: Option<TokenSecret>,
}
impl SessionTokens {
	/// Creates a pair without a refresh token.
	pub fn new(access: impl Into<String>) -> Self {
		Self { access_token: TokenSecret::new(access), refresh_token: None }
	}

	/// Attaches a refresh token.
	pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh));

		self
	}
}
impl Debug for SessionTokens {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTokens")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}
