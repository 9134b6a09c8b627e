//! Credential pairs persisted between requests and the refresh endpoint's wire bodies.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Access + refresh token pair issued at login and rotated by every successful refresh.
///
/// The same shape doubles as the refresh endpoint's response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived credential attached to every request.
	pub access_token: TokenSecret,
	/// Longer-lived credential used solely to obtain a new access token.
	pub refresh_token: TokenSecret,
}
impl CredentialPair {
	/// Creates a pair from raw token strings.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
		}
	}
}

/// Snapshot of the two storage slots.
///
/// The slots are read independently: a store may hold an access token without a refresh token
/// (for example after a partial write by another process), and flows must handle either being
/// absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
	/// Value of the `token` slot.
	#[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<TokenSecret>,
	/// Value of the `refreshToken` slot.
	#[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
}
impl StoredCredentials {
	/// Returns `true` when neither slot is populated.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none()
	}
}
impl From<CredentialPair> for StoredCredentials {
	fn from(pair: CredentialPair) -> Self {
		Self { access_token: Some(pair.access_token), refresh_token: Some(pair.refresh_token) }
	}
}

/// Request body sent to the refresh endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct RefreshGrant<'a> {
	/// Refresh token read from storage.
	pub refresh_token: &'a str,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn stored_credentials_use_storage_slot_names() {
		let stored = StoredCredentials::from(CredentialPair::new("T1", "R1"));
		let payload =
			serde_json::to_value(&stored).expect("Stored credentials should serialize to JSON.");

		assert_eq!(payload, serde_json::json!({ "token": "T1", "refreshToken": "R1" }));
	}

	#[test]
	fn empty_slots_are_omitted_and_default_on_read() {
		let stored: StoredCredentials =
			serde_json::from_str("{}").expect("Empty storage snapshot should deserialize.");

		assert!(stored.is_empty());
		assert_eq!(
			serde_json::to_string(&stored).expect("Empty snapshot should serialize."),
			"{}"
		);
	}

	#[test]
	fn refresh_grant_matches_endpoint_body() {
		let body = serde_json::to_value(RefreshGrant { refresh_token: "R1" })
			.expect("Refresh grant should serialize to JSON.");

		assert_eq!(body, serde_json::json!({ "refresh_token": "R1" }));
	}
}
