//! Validated client configuration shared by every flow.
//!
//! [`ClientConfig`] pins the API base URL, the auth endpoints used for refresh and credential
//! login, the login surface callers are redirected to when a session ends, and the storage keys
//! holding the token pair. Values are assembled through [`ClientConfigBuilder`], which rejects
//! shapes the request pipeline cannot use.

/// Builder API for assembling client configuration.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://dbapi.ptit.edu.vn/api";
/// Default login surface.
pub const DEFAULT_LOGIN_REDIRECT: &str = "/login";
/// Default credential login endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/auth/ptit-login";
/// Default refresh-token exchange endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/auth/refresh-token";

/// Storage keys for the persisted token pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
	/// Key holding the access token.
	pub access_token: String,
	/// Key holding the refresh token.
	pub refresh_token: String,
}
impl Default for StorageKeys {
	fn default() -> Self {
		Self { access_token: "db_ptit_token".into(), refresh_token: "db_ptit_refresh".into() }
	}
}

/// Immutable client configuration consumed by flows and stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// API root every relative path is appended to.
	pub base_url: Url,
	/// Path of the refresh-token exchange endpoint.
	pub refresh_path: String,
	/// Path of the username/password login endpoint.
	pub login_path: String,
	/// Login surface reported to observers when a session ends.
	pub login_redirect: String,
	/// Storage keys for the token pair.
	pub storage_keys: StorageKeys,
}
impl ClientConfig {
	/// Creates a new builder rooted at the provided API base.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Returns the configuration for the production API with default paths and keys.
	pub fn production() -> Result<Self, ClientConfigError> {
		let base_url = Url::parse(DEFAULT_BASE_URL)
			.map_err(|e| ClientConfigError::InvalidBaseUrl { reason: e.to_string() })?;

		Self::builder(base_url).build()
	}

	/// Joins `path` onto the API base.
	///
	/// The base path is kept, so a base of `https://host/api` and a path of `/app/x` yield
	/// `https://host/api/app/x`.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let joined = format!(
			"{}/{}",
			self.base_url.as_str().trim_end_matches('/'),
			path.trim_start_matches('/')
		);

		Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}

	/// Absolute URL of the refresh-token exchange endpoint.
	pub fn refresh_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.refresh_path)
	}

	/// Absolute URL of the credential login endpoint.
	pub fn login_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.login_path)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config(base: &str) -> ClientConfig {
		ClientConfig::builder(Url::parse(base).expect("Base URL fixture should parse."))
			.build()
			.expect("Config fixture should build.")
	}

	#[test]
	fn endpoint_keeps_base_path() {
		let config = config("https://example.com/api");

		assert_eq!(
			config.endpoint("/app/question/search").expect("Endpoint should join.").as_str(),
			"https://example.com/api/app/question/search",
		);
		assert_eq!(
			config.refresh_endpoint().expect("Refresh endpoint should join.").as_str(),
			"https://example.com/api/auth/auth/refresh-token",
		);
	}

	#[test]
	fn endpoint_tolerates_trailing_slash_on_base() {
		let config = config("http://127.0.0.1:8080/api/");

		assert_eq!(
			config.endpoint("app/executor/user").expect("Endpoint should join.").as_str(),
			"http://127.0.0.1:8080/api/app/executor/user",
		);
	}

	#[test]
	fn production_config_uses_defaults() {
		let config = ClientConfig::production().expect("Production config should build.");

		assert_eq!(config.base_url.as_str(), "https://dbapi.ptit.edu.vn/api");
		assert_eq!(config.login_redirect, "/login");
		assert_eq!(config.storage_keys, StorageKeys::default());
	}

	#[test]
	fn config_deserializes_from_json() {
		let config: ClientConfig = serde_json::from_str(
			r#"{
				"base_url": "https://example.com/api",
				"refresh_path": "/auth/refresh",
				"login_path": "/auth/login",
				"login_redirect": "/signin",
				"storage_keys": { "access_token": "a", "refresh_token": "r" }
			}"#,
		)
		.expect("Config should deserialize from JSON.");

		assert_eq!(config.refresh_path, "/auth/refresh");
		assert_eq!(config.storage_keys.refresh_token, "r");
	}
}
