//! Shared fixtures for integration tests: a scripted in-memory transport and client builders.

#![allow(dead_code)]

// std
use std::{collections::HashMap, sync::Arc};
// crates.io
use futures::channel::oneshot;
use parking_lot::Mutex;
// self
#[cfg(feature = "reqwest")]
use kpi_auth_client::{reqwest, transport::ReqwestTransport};
use kpi_auth_client::{
	auth::{CredentialPair, StoredCredentials},
	client::ApiClient,
	config::ClientConfig,
	http::StatusCode,
	session::AuthSession,
	store::{CredentialStore, MemoryStore},
	transport::{ApiRequest, ApiResponse, ApiTransport, TransportFuture},
	url::Url,
};

pub const BASE_URL: &str = "https://kpi.example.com";
pub const REFRESH_PATH: &str = "/api/auth/refresh";

pub type ScriptedClient = ApiClient<ScriptedTransport>;

/// Request observed by [`ScriptedTransport`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub method: String,
	pub path: String,
	pub authorization: Option<String>,
	pub body: Option<serde_json::Value>,
}

/// How the scripted refresh endpoint answers.
#[derive(Clone, Debug)]
pub enum RefreshReply {
	/// Issue `pair` and start accepting its access token.
	Rotate(CredentialPair),
	/// Issue `pair` but keep rejecting every token.
	RotateUnaccepted(CredentialPair),
	/// Answer with the given status.
	Reject(StatusCode),
	/// Answer `200` with a body that lacks the credential fields.
	Malformed,
}

type RequestHook = Box<dyn Fn(&str) + Send + Sync>;

struct Script {
	accepted: Option<String>,
	reply: RefreshReply,
	failures: HashMap<String, StatusCode>,
	gate: Option<oneshot::Receiver<()>>,
	hook: Option<RequestHook>,
	requests: Vec<RecordedRequest>,
	refresh_calls: usize,
}

/// In-memory API that accepts exactly one access token and answers everything else with `401`.
pub struct ScriptedTransport(Mutex<Script>);
impl ScriptedTransport {
	pub fn new(accepted: &str, reply: RefreshReply) -> Self {
		Self(Mutex::new(Script {
			accepted: Some(accepted.to_owned()),
			reply,
			failures: HashMap::new(),
			gate: None,
			hook: None,
			requests: Vec::new(),
			refresh_calls: 0,
		}))
	}

	/// Answers every request to `path` with `status`, regardless of credentials.
	pub fn fail_path(self, path: &str, status: StatusCode) -> Self {
		self.0.lock().failures.insert(path.to_owned(), status);

		self
	}

	/// Runs `hook` with the request path before each non-refresh response is produced.
	pub fn on_request(self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
		self.0.lock().hook = Some(Box::new(hook));

		self
	}

	/// Holds the next refresh call open until the returned sender fires.
	pub fn gate_refresh(&self) -> oneshot::Sender<()> {
		let (sender, receiver) = oneshot::channel();

		self.0.lock().gate = Some(receiver);

		sender
	}

	pub fn refresh_calls(&self) -> usize {
		self.0.lock().refresh_calls
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.0.lock().requests.clone()
	}

	pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
		self.requests().into_iter().filter(|request| request.path == path).collect()
	}

	fn record(request: &ApiRequest) -> RecordedRequest {
		RecordedRequest {
			method: request.method.to_string(),
			path: request.url.path().to_owned(),
			authorization: request.authorization().map(str::to_owned),
			body: request.body.as_ref().and_then(|body| serde_json::from_slice(body).ok()),
		}
	}

	fn answer_refresh(&self) -> ApiResponse {
		let mut script = self.0.lock();

		match script.reply.clone() {
			RefreshReply::Rotate(pair) => {
				script.accepted = Some(pair.access_token.expose().to_owned());

				json_response(&pair)
			},
			RefreshReply::RotateUnaccepted(pair) => {
				script.accepted = None;

				json_response(&pair)
			},
			RefreshReply::Reject(status) => ApiResponse::new(status, "{\"error\":\"invalid_grant\"}"),
			RefreshReply::Malformed => ApiResponse::new(StatusCode::OK, "{\"token\":\"T2\"}"),
		}
	}

	fn answer_api(&self, request: &ApiRequest, path: &str) -> ApiResponse {
		if let Some(hook) = self.0.lock().hook.as_ref() {
			hook(path);
		}

		let script = self.0.lock();

		if let Some(status) = script.failures.get(path) {
			return ApiResponse::new(*status, "scripted failure");
		}

		let expected = script.accepted.as_ref().map(|token| format!("Bearer {token}"));

		if expected.is_some() && request.authorization() == expected.as_deref() {
			ApiResponse::new(StatusCode::OK, format!("{{\"path\":\"{path}\"}}"))
		} else {
			ApiResponse::new(StatusCode::UNAUTHORIZED, "token expired")
		}
	}
}
impl ApiTransport for ScriptedTransport {
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let recorded = Self::record(request);
			let path = recorded.path.clone();

			if path == REFRESH_PATH {
				let gate = {
					let mut script = self.0.lock();

					script.requests.push(recorded);
					script.refresh_calls += 1;

					script.gate.take()
				};

				if let Some(gate) = gate {
					let _ = gate.await;
				}

				return Ok(self.answer_refresh());
			}

			self.0.lock().requests.push(recorded);

			Ok(self.answer_api(request, &path))
		})
	}
}

fn json_response(pair: &CredentialPair) -> ApiResponse {
	let body = serde_json::to_vec(pair).expect("Credential pair should serialize to JSON.");

	ApiResponse::new(StatusCode::OK, body)
}

/// Builds a reqwest transport that accepts the self-signed certificates `httpmock` serves and,
/// like [`ReqwestTransport::new`], never follows redirects.
#[cfg(feature = "reqwest")]
pub fn test_reqwest_transport() -> ReqwestTransport {
	let client = reqwest::Client::builder()
		.redirect(reqwest::redirect::Policy::none())
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure reqwest client for tests.");

	ReqwestTransport::with_client(client)
}

pub fn config() -> ClientConfig {
	ClientConfig::builder(Url::parse(BASE_URL).expect("Fixture base URL should parse."))
		.build()
		.expect("Fixture config should build.")
}

/// Builds a client over `transport` whose store starts with `slots`.
pub fn build_client(
	transport: ScriptedTransport,
	slots: StoredCredentials,
) -> (ScriptedClient, Arc<ScriptedTransport>, Arc<MemoryStore>) {
	let transport = Arc::new(transport);
	let store_backend = Arc::new(MemoryStore::with_slots(slots));
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let client = ApiClient::with_transport(
		config(),
		store,
		Arc::new(AuthSession::default()),
		transport.clone(),
	);

	(client, transport, store_backend)
}

/// Builds a client whose store starts with the `T1`/`R1` pair.
pub fn signed_in_client(
	transport: ScriptedTransport,
) -> (ScriptedClient, Arc<ScriptedTransport>, Arc<MemoryStore>) {
	build_client(transport, CredentialPair::new("T1", "R1").into())
}

pub fn stored_tokens(store: &MemoryStore) -> (Option<String>, Option<String>) {
	let stored = store.load().expect("Memory store should load.");

	(
		stored.access_token.map(|token| token.expose().to_owned()),
		stored.refresh_token.map(|token| token.expose().to_owned()),
	)
}
