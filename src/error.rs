//! Client-level error types shared across the dispatcher, refresh coordinator, and stores.

// crates.io
use http::StatusCode;
// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;
type JsonPathError = serde_path_to_error::Error<serde_json::Error>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Upstream answered with a body the client could not decode.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream answered with a non-success HTTP status.
	#[error(transparent)]
	Status(#[from] StatusError),

	/// The shared credential refresh failed; every caller waiting on it observes the same cause.
	#[error("Credential refresh failed: {0}")]
	RefreshFailed(#[source] Arc<Error>),
	/// The request that owned the in-flight refresh was dropped before the refresh settled.
	#[error("Credential refresh was abandoned before it settled.")]
	RefreshAbandoned,
}
impl Error {
	/// Returns the HTTP status carried by a [`Error::Status`] failure.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Status(err) => Some(err.status),
			_ => None,
		}
	}

	/// Returns `true` when upstream rejected the request's credentials (`401 Unauthorized`).
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(StatusCode::UNAUTHORIZED)
	}

	/// Returns the shared cause when the error came from a failed credential refresh.
	pub fn refresh_cause(&self) -> Option<&Arc<Error>> {
		match self {
			Self::RefreshFailed(cause) => Some(cause),
			_ => None,
		}
	}
}

/// Non-success HTTP response surfaced as an error.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Server responded with HTTP {status}.")]
pub struct StatusError {
	/// HTTP status code returned by the server.
	pub status: StatusCode,
	/// Response body, lossily decoded as UTF-8.
	pub body: String,
}
impl StatusError {
	/// Builds a status error from a raw response body.
	pub fn new(status: StatusCode, body: &[u8]) -> Self {
		Self { status, body: String::from_utf8_lossy(body).into_owned() }
	}
}

/// Configuration and request construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A header value contains characters that cannot be sent.
	#[error("Header value is invalid.")]
	InvalidHeader(#[from] http::header::InvalidHeaderValue),
	/// Request path cannot be joined onto the base URL.
	#[error("Request path `{path}` cannot be joined onto the base URL.")]
	InvalidPath {
		/// Path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized as JSON.
	#[error("Request body could not be serialized as JSON.")]
	RequestBody(#[source] serde_json::Error),
	/// Refresh was requested but the store holds no refresh token.
	#[error("Credential store is missing a refresh token.")]
	MissingRefreshToken,
	/// Client configuration failed validation.
	#[error(transparent)]
	Client(#[from] crate::config::ClientConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures decoding upstream payloads.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Refresh endpoint responded with JSON that does not carry a credential pair.
	#[error("Refresh endpoint returned malformed JSON.")]
	RefreshResponseParse {
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
		/// HTTP status code of the refresh response.
		status: u16,
	},
	/// Application endpoint responded with JSON that does not match the expected type.
	#[error("Response body could not be decoded.")]
	ResponseDecode {
		/// Structured parsing failure.
		#[source]
		source: JsonPathError,
		/// HTTP status code of the response.
		status: u16,
	},
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
