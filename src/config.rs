//! Client configuration: API base URL, refresh endpoint path, and refresh call bounds.
//!
//! [`ClientConfig`] values are immutable once built. Use [`ClientConfig::builder`] to assemble
//! one; the builder validates the base URL scheme and the refresh path before handing out a
//! config, so every [`crate::client::ApiClient`] starts from a usable endpoint set.

pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Default path of the credential refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh";

/// Immutable client configuration consumed by [`crate::client::ApiClient`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Base URL every request path is joined onto.
	pub base_url: Url,
	/// Path of the refresh endpoint, joined onto [`ClientConfig::base_url`].
	#[serde(default = "default_refresh_path")]
	pub refresh_path: String,
	/// Upper bound on the refresh call; `None` waits indefinitely.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_timeout: Option<Duration>,
}
impl ClientConfig {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves a request path against the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}

	/// Resolves the refresh endpoint URL.
	pub fn refresh_url(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.refresh_path)
	}

	/// Returns the refresh timeout as a standard-library duration for transports.
	pub fn refresh_timeout_std(&self) -> Option<std::time::Duration> {
		self.refresh_timeout.and_then(|timeout| std::time::Duration::try_from(timeout).ok())
	}
}

fn default_refresh_path() -> String {
	DEFAULT_REFRESH_PATH.into()
}
