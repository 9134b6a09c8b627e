//! Builder and validation rules for [`ClientConfig`].

// self
use crate::{
	_prelude::*,
	config::{ClientConfig, DEFAULT_REFRESH_PATH},
};

/// Errors raised while constructing or validating a [`ClientConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ClientConfigError {
	/// Base URL must use HTTP or HTTPS.
	#[error("The base URL must use HTTP or HTTPS: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Refresh path must be absolute.
	#[error("The refresh path must start with `/`: {path}.")]
	RelativeRefreshPath {
		/// Path that failed validation.
		path: String,
	},
	/// Refresh timeout must be a positive duration.
	#[error("The refresh timeout must be positive.")]
	NonPositiveRefreshTimeout,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL every request path is joined onto.
	pub base_url: Url,
	/// Refresh endpoint path.
	pub refresh_path: String,
	/// Optional bound on the refresh call.
	pub refresh_timeout: Option<Duration>,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided base URL.
	pub fn new(base_url: Url) -> Self {
		Self { base_url, refresh_path: DEFAULT_REFRESH_PATH.into(), refresh_timeout: None }
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Bounds the refresh call. Without a bound the refresh waits as long as the server does.
	pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
		self.refresh_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			refresh_path: self.refresh_path,
			refresh_timeout: self.refresh_timeout,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the config.
	fn validate(&self) -> Result<(), ClientConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ClientConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if !self.refresh_path.starts_with('/') {
			return Err(ClientConfigError::RelativeRefreshPath { path: self.refresh_path.clone() });
		}
		if self.refresh_timeout.is_some_and(|timeout| !timeout.is_positive()) {
			return Err(ClientConfigError::NonPositiveRefreshTimeout);
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse fixture URL.")
	}

	#[test]
	fn rejects_non_http_schemes() {
		let err = ClientConfig::builder(url("ftp://kpi.example.com"))
			.build()
			.expect_err("FTP base URLs should be rejected.");

		assert!(matches!(err, ClientConfigError::UnsupportedScheme { .. }));
	}

	#[test]
	fn rejects_relative_refresh_paths() {
		let err = ClientConfig::builder(url("https://kpi.example.com"))
			.refresh_path("auth/refresh")
			.build()
			.expect_err("Relative refresh paths should be rejected.");

		assert_eq!(err, ClientConfigError::RelativeRefreshPath { path: "auth/refresh".into() });
	}

	#[test]
	fn rejects_non_positive_timeouts() {
		let err = ClientConfig::builder(url("http://localhost:8000"))
			.refresh_timeout(Duration::ZERO)
			.build()
			.expect_err("Zero refresh timeouts should be rejected.");

		assert_eq!(err, ClientConfigError::NonPositiveRefreshTimeout);
	}

	#[test]
	fn accepts_plain_http_for_local_development() {
		let config = ClientConfig::builder(url("http://localhost:8000"))
			.refresh_path("/auth/refresh")
			.refresh_timeout(Duration::seconds(10))
			.build()
			.expect("Local HTTP base URLs should be accepted.");

		assert_eq!(config.refresh_path, "/auth/refresh");
		assert_eq!(config.refresh_timeout_std(), Some(std::time::Duration::from_secs(10)));
	}
}
