//! Storage contracts and built-in credential stores.
//!
//! Stores expose the two persisted slots (`token` and `refreshToken`) synchronously so the
//! dispatcher can read them without suspending. Writes replace both slots in one step.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, StoredCredentials, TokenSecret},
};

/// Persistence contract for the session's credential pair.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Reads both slots.
	fn load(&self) -> Result<StoredCredentials, StoreError>;

	/// Replaces both slots with the provided pair.
	fn save(&self, pair: CredentialPair) -> Result<(), StoreError>;

	/// Removes both slots.
	fn clear(&self) -> Result<(), StoreError>;
}
impl dyn CredentialStore {
	/// Reads the `token` slot.
	pub fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.load()?.access_token)
	}

	/// Reads the `refreshToken` slot.
	pub fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.load()?.refresh_token)
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
