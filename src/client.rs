//! Authenticated API client: bearer dispatch, 401 interception, and coalesced refresh.
//!
//! [`ApiClient`] owns the transport, the credential store, and the [`AuthSession`] shared by
//! every request of one login. Callers hand it [`ApiRequest`] values (or use the verb helpers)
//! and get back the final [`ApiResponse`]: a request that fails with `401 Unauthorized` is
//! replayed once with a refreshed access token, and concurrent failures share a single refresh
//! call. See [`ApiClient::dispatch`] and [`ApiClient::refresh`].

mod dispatch;
mod metrics;
mod refresh;

pub use metrics::RefreshMetrics;

// crates.io
use http::Method;
// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	config::ClientConfig,
	session::AuthSession,
	store::CredentialStore,
	transport::{ApiRequest, ApiResponse, ApiTransport},
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Authenticated API client bound to one credential store and one refresh session.
///
/// Cloning is cheap: clones share the transport, store, session, and metrics, so requests
/// issued through any clone coalesce onto the same refresh.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound request, including the refresh call.
	pub transport: Arc<T>,
	/// Store holding the `token` and `refreshToken` slots.
	pub store: Arc<dyn CredentialStore>,
	/// Refresh coordination state shared by all in-flight requests.
	pub session: Arc<AuthSession>,
	/// Endpoint configuration.
	pub config: ClientConfig,
	/// Shared counters for refresh coordination outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport and session.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn CredentialStore>,
		session: Arc<AuthSession>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			session,
			config,
			refresh_metrics: Default::default(),
		}
	}

	/// Persists a credential pair obtained from the login endpoint.
	pub fn sign_in(&self, pair: CredentialPair) -> Result<()> {
		self.store.save(pair)?;

		Ok(())
	}

	/// Clears both credential slots.
	pub fn sign_out(&self) -> Result<()> {
		self.store.clear()?;

		Ok(())
	}

	/// Builds a request for `path` relative to the configured base URL.
	pub fn request(&self, method: Method, path: &str) -> Result<ApiRequest> {
		Ok(ApiRequest::new(method, self.config.endpoint(path)?))
	}

	/// Issues an authenticated `GET`.
	pub async fn get(&self, path: &str) -> Result<ApiResponse> {
		self.dispatch(self.request(Method::GET, path)?).await
	}

	/// Issues an authenticated `DELETE`.
	pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
		self.dispatch(self.request(Method::DELETE, path)?).await
	}

	/// Issues an authenticated `POST` with a JSON body.
	pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
	where
		B: ?Sized + Serialize,
	{
		self.dispatch(self.request(Method::POST, path)?.with_json(body)?).await
	}

	/// Issues an authenticated `PUT` with a JSON body.
	pub async fn put_json<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
	where
		B: ?Sized + Serialize,
	{
		self.dispatch(self.request(Method::PUT, path)?.with_json(body)?).await
	}

	/// Issues an authenticated `PATCH` with a JSON body.
	pub async fn patch_json<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
	where
		B: ?Sized + Serialize,
	{
		self.dispatch(self.request(Method::PATCH, path)?.with_json(body)?).await
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client with its own reqwest transport and a fresh [`AuthSession`].
	pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
		let transport = ReqwestTransport::new()?;

		Ok(Self::with_transport(config, store, Arc::new(AuthSession::default()), transport))
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			session: self.session.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("session", &self.session)
			.finish()
	}
}
