// self
use crate::{
	_prelude::*,
	config::{self, ClientConfig, StorageKeys},
};

/// Errors raised while constructing or validating client configuration.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// Base URL could not be parsed or cannot carry paths.
	#[error("Base URL is invalid: {reason}.")]
	InvalidBaseUrl {
		/// Parser- or validator-supplied reason.
		reason: String,
	},
	/// Base URL must use HTTP or HTTPS.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Paths must be absolute.
	#[error("The {field} path must start with `/`: {path}.")]
	RelativePath {
		/// Which path failed validation.
		field: &'static str,
		/// Offending value.
		path: String,
	},
	/// Storage keys must be non-empty.
	#[error("The {field} storage key must not be empty.")]
	EmptyStorageKey {
		/// Which key failed validation.
		field: &'static str,
	},
	/// Access and refresh tokens must live under different keys.
	#[error("Access and refresh tokens must use distinct storage keys.")]
	DuplicateStorageKeys,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// API root every relative path is appended to.
	pub base_url: Url,
	/// Path of the refresh-token exchange endpoint.
	pub refresh_path: String,
	/// Path of the credential login endpoint.
	pub login_path: String,
	/// Login surface reported to observers when a session ends.
	pub login_redirect: String,
	/// Storage keys for the token pair.
	pub storage_keys: StorageKeys,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided base URL and default paths.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: config::DEFAULT_REFRESH_PATH.into(),
			login_path: config::DEFAULT_LOGIN_PATH.into(),
			login_redirect: config::DEFAULT_LOGIN_REDIRECT.into(),
			storage_keys: StorageKeys::default(),
		}
	}

	/// Overrides the refresh-token exchange path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the credential login path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the login surface reported when a session ends.
	pub fn login_redirect(mut self, path: impl Into<String>) -> Self {
		self.login_redirect = path.into();

		self
	}

	/// Overrides the storage keys for the token pair.
	pub fn storage_keys(mut self, access: impl Into<String>, refresh: impl Into<String>) -> Self {
		self.storage_keys = StorageKeys { access_token: access.into(), refresh_token: refresh.into() };

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			refresh_path: self.refresh_path,
			login_path: self.login_path,
			login_redirect: self.login_redirect,
			storage_keys: self.storage_keys,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ClientConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ClientConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.base_url.cannot_be_a_base() {
			return Err(ClientConfigError::InvalidBaseUrl {
				reason: format!("{} cannot carry paths", self.base_url),
			});
		}

		validate_path("refresh", &self.refresh_path)?;
		validate_path("login", &self.login_path)?;
		validate_path("login redirect", &self.login_redirect)?;
		validate_keys(&self.storage_keys)?;

		Ok(())
	}
}

fn validate_path(field: &'static str, path: &str) -> Result<(), ClientConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ClientConfigError::RelativePath { field, path: path.to_owned() })
	}
}

fn validate_keys(keys: &StorageKeys) -> Result<(), ClientConfigError> {
	if keys.access_token.trim().is_empty() {
		return Err(ClientConfigError::EmptyStorageKey { field: "access token" });
	}
	if keys.refresh_token.trim().is_empty() {
		return Err(ClientConfigError::EmptyStorageKey { field: "refresh token" });
	}
	if keys.access_token == keys.refresh_token {
		return Err(ClientConfigError::DuplicateStorageKeys);
	}

	Ok(())
}
