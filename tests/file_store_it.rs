mod common;

// std
use std::{env, fs, process, sync::Arc};
// crates.io
use time::OffsetDateTime;
// self
use common::*;
use kpi_auth_client::{
	auth::CredentialPair,
	client::ApiClient,
	session::AuthSession,
	store::{CredentialStore, FileStore},
};

#[tokio::test]
async fn rotated_credentials_survive_a_reopen() {
	let path = env::temp_dir().join(format!(
		"kpi_auth_client_it_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	));
	let store = Arc::new(FileStore::open(&path).expect("File store should open."));

	store.save(CredentialPair::new("T1", "R1")).expect("Seeding the file store should work.");

	let transport = Arc::new(ScriptedTransport::new(
		"T2",
		RefreshReply::Rotate(CredentialPair::new("T2", "R2")),
	));
	let client: ScriptedClient = ApiClient::with_transport(
		config(),
		store,
		Arc::new(AuthSession::default()),
		transport.clone(),
	);

	client.get("/api/kpis").await.expect("Request should succeed after refresh.");

	assert_eq!(transport.refresh_calls(), 1);

	let raw = fs::read_to_string(&path).expect("Snapshot should be readable.");
	let snapshot: serde_json::Value = serde_json::from_str(&raw).expect("Snapshot should be JSON.");

	assert_eq!(snapshot["token"], "T2");
	assert_eq!(snapshot["refreshToken"], "R2");

	let reopened = FileStore::open(&path).expect("File store should reopen.");
	let slots = reopened.load().expect("Reopened store should load.");

	assert_eq!(slots.access_token.map(|token| token.expose().to_owned()), Some("T2".into()));

	let _ = fs::remove_file(&path);
}
