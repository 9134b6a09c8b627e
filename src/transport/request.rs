//! Owned request description shared by the dispatcher, the interceptor, and transports.

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Outgoing API request.
///
/// Besides the HTTP parts, a request carries interceptor bookkeeping: whether it has already been
/// replayed after a `401`, which access token the dispatcher attached, and how many refresh
/// cycles had settled when that token was read.
#[derive(Clone)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Request headers, including `Authorization` once the dispatcher attached a token.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Optional per-request timeout honored by transports that support one.
	pub timeout: Option<std::time::Duration>,
	retried: bool,
	sent_with: Option<TokenSecret>,
	refresh_cycle: u64,
}
impl ApiRequest {
	/// Creates a bodiless request.
	pub fn new(method: Method, url: Url) -> Self {
		Self {
			method,
			url,
			headers: HeaderMap::new(),
			body: None,
			timeout: None,
			retried: false,
			sent_with: None,
			refresh_cycle: 0,
		}
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `body` as JSON and sets the matching content type.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		let bytes = serde_json::to_vec(body).map_err(ConfigError::RequestBody)?;

		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		self.body = Some(bytes);

		Ok(self)
	}

	/// Sets or clears the per-request timeout.
	pub fn with_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
		self.timeout = timeout;

		self
	}

	/// Returns `true` once the request has been replayed after an authorization failure.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	/// Returns the access token the dispatcher attached, if any.
	pub fn sent_with(&self) -> Option<&TokenSecret> {
		self.sent_with.as_ref()
	}

	/// Returns the refresh cycle observed when the credentials were attached.
	pub fn refresh_cycle(&self) -> u64 {
		self.refresh_cycle
	}

	/// Returns the `Authorization` header value, if present.
	pub fn authorization(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
	}

	/// Attaches `Authorization: Bearer <token>` when a token is provided; otherwise leaves the
	/// headers untouched.
	pub(crate) fn attach_bearer(&mut self, token: Option<&TokenSecret>) -> Result<(), ConfigError> {
		let Some(token) = token else {
			self.sent_with = None;

			return Ok(());
		};
		let mut value = HeaderValue::from_str(&token.bearer())?;

		value.set_sensitive(true);
		self.headers.insert(AUTHORIZATION, value);
		self.sent_with = Some(token.clone());

		Ok(())
	}

	pub(crate) fn observe_cycle(&mut self, cycle: u64) {
		self.refresh_cycle = cycle;
	}

	pub(crate) fn mark_retried(&mut self) {
		self.retried = true;
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("headers", &self.headers.keys().collect::<Vec<_>>())
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.field("retried", &self.retried)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request() -> ApiRequest {
		ApiRequest::new(
			Method::GET,
			Url::parse("https://kpi.example.com/api/kpis").expect("Fixture URL should parse."),
		)
	}

	#[test]
	fn attach_bearer_sets_header_and_remembers_token() {
		let mut request = request();
		let token = TokenSecret::new("T1");

		request.attach_bearer(Some(&token)).expect("Bearer header should be valid.");

		assert_eq!(request.authorization(), Some("Bearer T1"));
		assert_eq!(request.sent_with(), Some(&token));
		assert!(
			request.headers.get(AUTHORIZATION).is_some_and(HeaderValue::is_sensitive),
			"Authorization header should be marked sensitive."
		);
	}

	#[test]
	fn missing_token_leaves_headers_unmodified() {
		let mut request = request().with_header(
			HeaderName::from_static("x-request-id"),
			HeaderValue::from_static("abc"),
		);

		request.attach_bearer(None).expect("Absent tokens should be accepted.");

		assert_eq!(request.authorization(), None);
		assert_eq!(request.headers.len(), 1);
		assert_eq!(request.sent_with(), None);
	}

	#[test]
	fn debug_output_omits_credentials() {
		let mut request = request();

		request.attach_bearer(Some(&TokenSecret::new("secret-value"))).expect("Valid header.");

		let rendered = format!("{request:?}");

		assert!(rendered.contains("authorization"));
		assert!(!rendered.contains("secret-value"));
	}

	#[test]
	fn json_body_sets_content_type() {
		let request = request()
			.with_json(&serde_json::json!({ "name": "Revenue" }))
			.expect("JSON body should serialize.");

		assert_eq!(
			request.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some("application/json")
		);
		assert_eq!(request.body.as_deref(), Some(&b"{\"name\":\"Revenue\"}"[..]));
	}

	#[test]
	fn control_characters_in_tokens_are_rejected() {
		let mut request = request();
		let err = request
			.attach_bearer(Some(&TokenSecret::new("bad\ntoken")))
			.expect_err("Tokens with control characters should be rejected.");

		assert!(matches!(err, ConfigError::InvalidHeader(_)));
		assert!(!request.is_retried());
	}
}
