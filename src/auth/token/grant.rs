//! Token payloads returned by the refresh and login endpoints.
//!
//! Upstream has been observed spelling the token fields three different ways, so each field
//! accepts every known alias. Blank values are treated as absent.

// self
use crate::{
	_prelude::*,
	auth::{SessionTokens, TokenSecret},
};

/// Body sent to the refresh-token exchange endpoint.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
	pub(crate) refresh_token: &'a str,
}

/// Token grant decoded from a refresh or login response.
#[derive(Clone, Default, Deserialize)]
pub struct TokenGrant {
	/// Newly issued access token.
	#[serde(default, rename = "accessToken", alias = "access_token", alias = "access")]
	pub access_token: Option<TokenSecret>,
	/// Rotated refresh token, when upstream issued one.
	#[serde(default, rename = "refreshToken", alias = "refresh_token", alias = "refresh")]
	pub refresh_token: Option<TokenSecret>,
}
impl TokenGrant {
	/// Converts the grant into a token pair, discarding blank secrets.
	///
	/// Returns `None` when no usable access token was issued.
	pub fn into_tokens(self) -> Option<SessionTokens> {
		let access_token = self.access_token.filter(|secret| !secret.is_blank())?;
		let refresh_token = self.refresh_token.filter(|secret| !secret.is_blank());

		Some(SessionTokens { access_token, refresh_token })
	}
}
impl Debug for TokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGrant")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}
