// crates.io
use futures::channel::oneshot;
// self
use crate::{_prelude::*, session::RefreshOutcome};

/// Deferred handle for a caller queued behind the in-flight refresh.
#[derive(Debug)]
#[must_use = "a waiter does nothing unless awaited"]
pub struct RefreshWaiter(oneshot::Receiver<RefreshOutcome>);
impl RefreshWaiter {
	pub(crate) fn new(receiver: oneshot::Receiver<RefreshOutcome>) -> Self {
		Self(receiver)
	}

	/// Suspends until the refresh settles and yields its outcome.
	///
	/// A cycle torn down without an outcome resolves as [`Error::RefreshAbandoned`].
	pub async fn wait(self) -> RefreshOutcome {
		self.0.await.unwrap_or_else(|_| Err(Arc::new(Error::RefreshAbandoned)))
	}
}
