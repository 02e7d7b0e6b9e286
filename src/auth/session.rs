//! In-memory session holder kept in sync with the persisted token pair.
//!
//! [`SessionState`] answers "who is logged in" without touching the network. It owns the
//! decision of whether a stored access token is still usable (decodable, not past `exp`) and
//! follows refresh notifications as a [`SessionObserver`], so a token rotated by the refresh
//! coordinator is picked up without rereading storage.

// self
use crate::{
	_prelude::*,
	auth::{SessionTokens, TokenClaims, TokenSecret},
	error::SessionError,
	ext::SessionObserver,
	store::SessionStore,
};

/// Access token plus the claims decoded from it.
#[derive(Clone, Debug)]
pub struct ActiveSession {
	/// Current access token.
	pub access_token: TokenSecret,
	/// Claims decoded from the access token.
	pub claims: TokenClaims,
}
impl ActiveSession {
	/// Decodes `access_token` and rejects it when expired at `now`.
	pub fn from_token(access_token: TokenSecret, now: OffsetDateTime) -> Result<Self, SessionError> {
		let claims = TokenClaims::decode(&access_token)?;

		if claims.is_expired_at(now) {
			return Err(SessionError::Expired);
		}

		Ok(Self { access_token, claims })
	}

	/// User identifier resolved from the claims.
	pub fn user_id(&self) -> Option<String> {
		self.claims.user_id()
	}
}

/// Current session for one client, shared by whoever needs to know the signed-in user.
#[derive(Clone, Debug)]
pub struct SessionState {
	tokens: SessionStore,
	current: Arc<RwLock<Option<ActiveSession>>>,
}
impl SessionState {
	/// Creates an empty holder over the provided token store.
	pub fn new(tokens: SessionStore) -> Self {
		Self { tokens, current: Default::default() }
	}

	/// Returns the active session, if any.
	pub fn current(&self) -> Option<ActiveSession> {
		self.current.read().clone()
	}

	/// Returns the claims of the active session, if any.
	pub fn claims(&self) -> Option<TokenClaims> {
		self.current.read().as_ref().map(|session| session.claims.clone())
	}

	/// Returns `true` while a session is active.
	pub fn is_authenticated(&self) -> bool {
		self.current.read().is_some()
	}

	/// Adopts a user-supplied access token.
	///
	/// Malformed or expired tokens are rejected without touching storage.
	pub async fn login(&self, access_token: impl Into<String>) -> Result<TokenClaims> {
		let session =
			ActiveSession::from_token(TokenSecret::new(access_token), OffsetDateTime::now_utc())?;

		self.tokens.save(&SessionTokens {
			access_token: session.access_token.clone(),
			refresh_token: None,
		})
		.await?;

		let claims = session.claims.clone();

		*self.current.write() = Some(session);

		Ok(claims)
	}

	/// Adopts a token pair issued by a login exchange.
	pub async fn adopt(&self, tokens: &SessionTokens) -> Result<TokenClaims> {
		let session =
			ActiveSession::from_token(tokens.access_token.clone(), OffsetDateTime::now_utc())?;

		self.tokens.save(tokens).await?;

		let claims = session.claims.clone();

		*self.current.write() = Some(session);

		Ok(claims)
	}

	/// Rebuilds the session from storage.
	///
	/// A stored token that cannot be decoded or has expired is treated exactly like a missing
	/// one: storage is cleared and `None` is returned.
	pub async fn restore(&self) -> Result<Option<TokenClaims>> {
		let Some(access_token) = self.tokens.access_token().await? else {
			*self.current.write() = None;

			return Ok(None);
		};

		match ActiveSession::from_token(access_token, OffsetDateTime::now_utc()) {
			Ok(session) => {
				let claims = session.claims.clone();

				*self.current.write() = Some(session);

				Ok(Some(claims))
			},
			Err(_) => {
				self.logout().await?;

				Ok(None)
			},
		}
	}

	/// Clears the stored token pair and the in-memory session.
	pub async fn logout(&self) -> Result<()> {
		*self.current.write() = None;

		self.tokens.clear().await?;

		Ok(())
	}
}
impl SessionObserver for SessionState {
	fn token_refreshed(&self, access_token: &TokenSecret) {
		let refreshed = ActiveSession::from_token(access_token.clone(), OffsetDateTime::now_utc());

		*self.current.write() = refreshed.ok();
	}

	fn session_ended(&self, _login_path: &str) {
		*self.current.write() = None;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::claims::tests::jwt, config::StorageKeys, store::{KeyValueStore, MemoryStore}};

	fn state() -> (SessionState, MemoryStore) {
		let backend = MemoryStore::default();
		let tokens = SessionStore::new(Arc::new(backend.clone()), StorageKeys::default());

		(SessionState::new(tokens), backend)
	}

	fn future_exp() -> i64 {
		(OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp()
	}

	#[tokio::test]
	async fn login_persists_valid_tokens() {
		let (state, backend) = state();
		let token = jwt(&format!(r#"{{"exp":{},"userId":7}}"#, future_exp()));
		let claims = state.login(token.expose()).await.expect("Valid token should log in.");

		assert_eq!(claims.user_id().as_deref(), Some("7"));
		assert!(state.is_authenticated());
		assert_eq!(backend.snapshot("db_ptit_token").as_deref(), Some(token.expose()));
	}

	#[tokio::test]
	async fn login_rejects_malformed_and_expired_tokens() {
		let (state, backend) = state();
		let err = state.login("not-a-jwt").await.expect_err("Malformed tokens should be rejected.");

		assert!(matches!(err, Error::Session(SessionError::MalformedCredential { .. })));

		let expired = jwt(r#"{"exp":1000,"sub":"u"}"#);
		let err =
			state.login(expired.expose()).await.expect_err("Expired tokens should be rejected.");

		assert!(matches!(err, Error::Session(SessionError::Expired)));
		assert!(!state.is_authenticated());
		assert!(backend.is_empty());
	}

	#[tokio::test]
	async fn restore_clears_malformed_stored_credentials() {
		let (state, backend) = state();

		backend.set("db_ptit_token", "garbage".into()).await.expect("Seed should succeed.");
		backend.set("db_ptit_refresh", "R1".into()).await.expect("Seed should succeed.");

		let restored = state.restore().await.expect("Restore should not fail on bad tokens.");

		assert!(restored.is_none());
		assert!(backend.is_empty());
	}

	#[tokio::test]
	async fn restore_adopts_stored_token() {
		let (state, backend) = state();
		let token = jwt(&format!(r#"{{"exp":{},"id":"u-1"}}"#, future_exp()));

		backend.set("db_ptit_token", token.expose().into()).await.expect("Seed should succeed.");

		let claims = state
			.restore()
			.await
			.expect("Restore should succeed.")
			.expect("Stored token should be adopted.");

		assert_eq!(claims.user_id().as_deref(), Some("u-1"));
	}

	#[tokio::test]
	async fn follows_observer_notifications_without_storage() {
		let (state, backend) = state();
		let token = jwt(&format!(r#"{{"exp":{},"sub":"after-refresh"}}"#, future_exp()));

		state.token_refreshed(&token);

		assert_eq!(
			state.claims().and_then(|claims| claims.user_id()).as_deref(),
			Some("after-refresh")
		);
		assert!(backend.is_empty());

		state.session_ended("/login");

		assert!(!state.is_authenticated());
	}
}
