//! Request dispatch and the unauthorized-response interceptor.
//!
//! Every request goes out with the stored access token attached. A `401` on a request that
//! has not been replayed yet routes through [`ApiClient::recover`]:
//!
//! - no refresh token in storage: the `401` is returned as-is and the session is untouched;
//! - a newer access token is already stored and no refresh is running: the request is replayed
//!   with it directly;
//! - a refresh cycle settled since the request was sent and rotated the token: the request is
//!   replayed with the stored token, even if that cycle finished after the checks above;
//! - otherwise the request leads or joins the session's refresh and is replayed with the
//!   resulting token.
//!
//! Replays are sent without interception, so a second `401` reaches the caller unchanged.

// crates.io
use http::StatusCode;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::ApiClient,
	error::{ConfigError, StatusError},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::RefreshRole,
	transport::{ApiRequest, ApiResponse, ApiTransport},
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Attaches `Authorization: Bearer <token>` when the store holds an access token.
	pub fn authorize(&self, request: &mut ApiRequest) -> Result<()> {
		// Cycle first: a token read afterwards is never older than the cycle recorded with it.
		request.observe_cycle(self.session.cycles_completed());

		let token = self.store.access_token()?;

		request.attach_bearer(token.as_ref())?;

		Ok(())
	}

	/// Sends `request` with the stored credentials, recovering once from `401 Unauthorized`.
	pub async fn dispatch(&self, mut request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Dispatch;

		let span = FlowSpan::new(KIND, "dispatch");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.authorize(&mut request)?;

				let sent = self.send_checked(&request).await;

				match sent {
					Err(Error::Status(err))
						if err.status == StatusCode::UNAUTHORIZED && !request.is_retried() =>
						self.recover(request, err).await,
					other => other,
				}
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Sends without interception, turning non-`2xx` responses into [`Error::Status`].
	pub(crate) async fn send_checked(&self, request: &ApiRequest) -> Result<ApiResponse> {
		let response = self.transport.send(request).await?;

		Ok(response.error_for_status()?)
	}

	async fn recover(
		&self,
		mut request: ApiRequest,
		unauthorized: StatusError,
	) -> Result<ApiResponse> {
		request.mark_retried();

		let stored = self.store.load()?;

		if stored.refresh_token.is_none() {
			obs::trace_event(FlowKind::Dispatch, "no refresh token stored; propagating 401");

			return Err(unauthorized.into());
		}
		if let Some(current) = stored.access_token
			&& request.sent_with() != Some(&current)
			&& !self.session.is_refreshing()
		{
			obs::trace_event(FlowKind::Dispatch, "credentials rotated while in flight; replaying");

			return self.replay(request, current).await;
		}

		let role = match self.session.begin_refresh_after(request.refresh_cycle()) {
			Some(role) => role,
			None => match self.store.access_token()? {
				Some(current) if request.sent_with() != Some(&current) => {
					obs::trace_event(FlowKind::Dispatch, "refresh settled after send; replaying");

					return self.replay(request, current).await;
				},
				_ => self.session.begin_refresh(),
			},
		};
		let outcome = match role {
			RefreshRole::Leader(lease) => self.lead_refresh(lease).await,
			RefreshRole::Follower(waiter) => {
				self.refresh_metrics.record_coalesced();

				waiter.wait().await
			},
		};

		match outcome {
			Ok(token) => self.replay(request, token).await,
			Err(cause) if matches!(*cause, Error::Config(ConfigError::MissingRefreshToken)) =>
				Err(unauthorized.into()),
			Err(cause) => Err(Error::RefreshFailed(cause)),
		}
	}

	async fn replay(&self, mut request: ApiRequest, token: TokenSecret) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Replay;

		let span = FlowSpan::new(KIND, "replay");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				request.attach_bearer(Some(&token))?;
				self.refresh_metrics.record_replay();

				self.send_checked(&request).await
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
