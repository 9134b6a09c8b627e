//! Transport primitives for API calls.
//!
//! The module exposes [`ApiTransport`] alongside the owned [`ApiRequest`] and [`ApiResponse`]
//! values so callers can swap in a custom HTTP stack without touching the refresh machinery.
//! Transports report every HTTP response as `Ok`, whatever its status; only failures to obtain
//! a response (DNS, TCP, TLS, timeouts) are errors. Status classification happens in
//! [`ApiResponse::error_for_status`] so the dispatcher sees one consistent view of 401s.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`ApiTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing API requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// clone of a client, and the futures they return must be `Send` so requests can hop executor
/// threads while they wait on the network.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the response, whatever its status code.
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// API calls should not follow redirects: a redirect to a login page would otherwise surface as
/// a `200` and hide the `401` the refresh machinery relies on. [`ReqwestTransport::new`] builds
/// a client with redirects disabled; configure any custom [`ReqwestClient`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with redirect following disabled.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut builder = self
				.0
				.request(request.method.clone(), request.url.clone())
				.headers(request.headers.clone());

			if let Some(body) = request.body.as_ref() {
				builder = builder.body(body.clone());
			}
			if let Some(timeout) = request.timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
