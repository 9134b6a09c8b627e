//! Thread-safe in-memory [`CredentialStore`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, StoredCredentials},
	store::{CredentialStore, StoreError},
};

/// Storage backend that keeps the credential slots in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<StoredCredentials>>);
impl MemoryStore {
	/// Creates a store seeded with an existing pair.
	pub fn with_pair(pair: CredentialPair) -> Self {
		Self(Arc::new(RwLock::new(pair.into())))
	}

	/// Creates a store seeded with arbitrary slot contents, including half-populated ones.
	pub fn with_slots(slots: StoredCredentials) -> Self {
		Self(Arc::new(RwLock::new(slots)))
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> Result<StoredCredentials, StoreError> {
		Ok(self.0.read().clone())
	}

	fn save(&self, pair: CredentialPair) -> Result<(), StoreError> {
		*self.0.write() = pair.into();

		Ok(())
	}

	fn clear(&self) -> Result<(), StoreError> {
		*self.0.write() = StoredCredentials::default();

		Ok(())
	}
}
