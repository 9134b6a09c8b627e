//! Refresh coordination: one refresh call per cycle, shared by every waiting request.
//!
//! The request that moves the session from idle to refreshing becomes the cycle's leader. It
//! reads the stored refresh token, calls the refresh endpoint without credentials, persists the
//! rotated pair, and settles its [`RefreshLease`] so queued requests resume with the same
//! access token. When the refresh fails the stored credentials are cleared before the lease
//! settles, and every waiter observes the same shared error.

// crates.io
use http::Method;
// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, RefreshGrant, TokenSecret},
	client::ApiClient,
	error::{ConfigError, TransientError},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::{RefreshLease, RefreshOutcome, RefreshRole},
	transport::{ApiRequest, ApiTransport},
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Refreshes the credential pair, joining the in-flight refresh when one is running.
	///
	/// Returns the new access token. Failures are reported as [`Error::RefreshFailed`] carrying
	/// the cause shared with every other caller of the same cycle.
	pub async fn refresh(&self) -> Result<TokenSecret> {
		let outcome = match self.session.begin_refresh() {
			RefreshRole::Leader(lease) => self.lead_refresh(lease).await,
			RefreshRole::Follower(waiter) => {
				self.refresh_metrics.record_coalesced();

				waiter.wait().await
			},
		};

		outcome.map_err(Error::RefreshFailed)
	}

	/// Runs the cycle owned by `lease` and settles it with the outcome.
	pub(crate) async fn lead_refresh(&self, lease: RefreshLease<'_>) -> RefreshOutcome {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "lead_refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let outcome = span
			.instrument(async {
				match self.rotate_credentials().await {
					Ok(pair) => {
						self.refresh_metrics.record_success();

						Ok(pair.access_token)
					},
					Err(err) => {
						if !matches!(err, Error::Config(ConfigError::MissingRefreshToken)) {
							self.refresh_metrics.record_failure();

							if self.store.clear().is_err() {
								obs::trace_event(KIND, "failed to clear credentials");
							}
						}

						Err(Arc::new(err))
					},
				}
			})
			.await;

		obs::record_result(KIND, &outcome);
		lease.settle(outcome.clone());

		outcome
	}

	async fn rotate_credentials(&self) -> Result<CredentialPair> {
		let refresh_token =
			self.store.refresh_token()?.ok_or(ConfigError::MissingRefreshToken)?;

		self.refresh_metrics.record_attempt();

		let pair = self.request_new_credentials(&refresh_token).await?;

		self.store.save(pair.clone())?;

		Ok(pair)
	}

	/// Calls the refresh endpoint once, without an `Authorization` header.
	async fn request_new_credentials(&self, refresh_token: &TokenSecret) -> Result<CredentialPair> {
		let request = ApiRequest::new(Method::POST, self.config.refresh_url()?)
			.with_json(&RefreshGrant { refresh_token: refresh_token.expose() })?
			.with_timeout(self.config.refresh_timeout_std());
		let response = self.send_checked(&request).await?;
		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			TransientError::RefreshResponseParse { source, status: response.status.as_u16() }
				.into()
		})
	}
}
