//! Owned response returned by transports.

// crates.io
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{StatusError, TransientError},
};

/// Fully buffered API response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with no headers.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Returns `true` for `2xx` responses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Converts non-`2xx` responses into a [`StatusError`].
	pub fn error_for_status(self) -> Result<Self, StatusError> {
		if self.is_success() { Ok(self) } else { Err(StatusError::new(self.status, &self.body)) }
	}

	/// Decodes the body as JSON, reporting the failing field path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			TransientError::ResponseDecode { source, status: self.status.as_u16() }.into()
		})
	}

	/// Returns the body lossily decoded as UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}
