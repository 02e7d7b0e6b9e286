//! Typed view of the token pair over a [`KeyValueStore`].

// self
use crate::{
	_prelude::*,
	auth::{SessionTokens, TokenSecret},
	config::StorageKeys,
	store::{KeyValueStore, StoreError},
};

/// Reads and writes the session token pair under the configured keys.
///
/// Blank stored values read back as absent, matching how a missing key is handled.
#[derive(Clone)]
pub struct SessionStore {
	backend: Arc<dyn KeyValueStore>,
	keys: StorageKeys,
}
impl SessionStore {
	/// Wraps a backend with the provided key layout.
	pub fn new(backend: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
		Self { backend, keys }
	}

	/// Key layout used by this view.
	pub fn keys(&self) -> &StorageKeys {
		&self.keys
	}

	/// Reads the stored access token.
	pub async fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		self.read(&self.keys.access_token).await
	}

	/// Reads the stored refresh token.
	pub async fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		self.read(&self.keys.refresh_token).await
	}

	/// Reads both tokens; `None` when no access token is stored.
	pub async fn load(&self) -> Result<Option<SessionTokens>, StoreError> {
		let Some(access_token) = self.access_token().await? else {
			return Ok(None);
		};
		let refresh_token = self.refresh_token().await?;

		Ok(Some(SessionTokens { access_token, refresh_token }))
	}

	/// Persists a token pair.
	///
	/// A pair without a refresh token leaves any stored refresh token in place, so a refresh
	/// response that does not rotate the refresh token keeps the existing one usable.
	pub async fn save(&self, tokens: &SessionTokens) -> Result<(), StoreError> {
		self.backend
			.set(&self.keys.access_token, tokens.access_token.expose().to_owned())
			.await?;

		if let Some(refresh) = &tokens.refresh_token {
			self.backend.set(&self.keys.refresh_token, refresh.expose().to_owned()).await?;
		}

		Ok(())
	}

	/// Removes both tokens.
	pub async fn clear(&self) -> Result<(), StoreError> {
		self.backend.remove(&self.keys.access_token).await?;
		self.backend.remove(&self.keys.refresh_token).await
	}

	async fn read(&self, key: &str) -> Result<Option<TokenSecret>, StoreError> {
		let value = self.backend.get(key).await?;

		Ok(value.map(TokenSecret::new).filter(|secret| !secret.is_blank()))
	}
}
impl Debug for SessionStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionStore").field("keys", &self.keys).finish()
	}
}
