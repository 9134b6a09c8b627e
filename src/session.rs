//! Refresh coordination state shared by every request of one authenticated session.
//!
//! [`AuthSession`] owns the refreshing flag and the queue of callers waiting on the in-flight
//! refresh. A session moves `Idle -> Refreshing` when the first caller claims a
//! [`RefreshLease`] and back to `Idle` when that lease settles. Callers arriving while a refresh
//! is outstanding receive a [`RefreshWaiter`] instead of starting a second refresh.
//!
//! The state lives behind a synchronous mutex that is never held across an `.await`: the phase
//! flips before the refresh request is issued and flips back inside the settle step. Settling
//! swaps the queue for an empty one before notifying anyone, so callers that arrive during
//! notification start the next cycle instead of joining a drained one.

mod waiter;

pub use waiter::*;

// std
use std::mem;
// crates.io
use futures::channel::oneshot;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Result delivered to every caller of one refresh cycle.
pub type RefreshOutcome = Result<TokenSecret, Arc<Error>>;

/// Phase of the refresh state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RefreshPhase {
	/// No refresh call is outstanding.
	#[default]
	Idle,
	/// Exactly one refresh call is outstanding.
	Refreshing,
}

/// Role assigned to a caller by [`AuthSession::begin_refresh`].
#[derive(Debug)]
pub enum RefreshRole<'a> {
	/// The caller owns the refresh call and must settle the lease.
	Leader(RefreshLease<'a>),
	/// A refresh is already outstanding; the caller waits for its outcome.
	Follower(RefreshWaiter),
}

/// Owned refresh coordination state for one authenticated session.
#[derive(Default)]
pub struct AuthSession {
	state: Mutex<SessionState>,
}
impl AuthSession {
	/// Claims the refresh or joins the one already in flight.
	///
	/// The phase check and the enqueue happen under one lock acquisition, so a caller can never
	/// observe `Refreshing` and then miss the settle that drains the queue.
	pub fn begin_refresh(&self) -> RefreshRole<'_> {
		let mut state = self.state.lock();

		self.claim(&mut state)
	}

	/// Like [`AuthSession::begin_refresh`], but only for a caller whose request went out during
	/// cycle `observed`.
	///
	/// Returns `None` once a later cycle has settled: the credentials the caller was rejected
	/// with have already been rotated, so it must not spend the current refresh token again.
	pub fn begin_refresh_after(&self, observed: u64) -> Option<RefreshRole<'_>> {
		let mut state = self.state.lock();

		if state.cycle != observed {
			return None;
		}

		Some(self.claim(&mut state))
	}

	/// Queues a waiter on the in-flight refresh; returns `None` when the session is idle.
	pub fn enqueue_waiter(&self) -> Option<RefreshWaiter> {
		let mut state = self.state.lock();

		match state.phase {
			RefreshPhase::Idle => None,
			RefreshPhase::Refreshing => Some(state.enqueue()),
		}
	}

	/// Ends the current refresh cycle and notifies every queued waiter, oldest first.
	///
	/// Returns the number of waiters drained. Settling an idle session is a no-op.
	pub fn settle_refresh(&self, outcome: RefreshOutcome) -> usize {
		let waiters = {
			let mut state = self.state.lock();

			if state.phase == RefreshPhase::Idle {
				return 0;
			}

			state.finish_cycle()
		};

		notify(waiters, outcome)
	}

	/// Returns the current phase.
	pub fn phase(&self) -> RefreshPhase {
		self.state.lock().phase
	}

	/// Returns `true` while a refresh call is outstanding.
	pub fn is_refreshing(&self) -> bool {
		self.phase() == RefreshPhase::Refreshing
	}

	/// Returns the number of callers waiting on the in-flight refresh.
	pub fn pending_waiters(&self) -> usize {
		self.state.lock().waiters.len()
	}

	/// Returns how many refresh cycles have settled since the session was created.
	pub fn cycles_completed(&self) -> u64 {
		self.state.lock().cycle
	}

	fn claim(&self, state: &mut SessionState) -> RefreshRole<'_> {
		match state.phase {
			RefreshPhase::Idle => {
				state.phase = RefreshPhase::Refreshing;

				RefreshRole::Leader(RefreshLease { session: self, cycle: state.cycle, settled: false })
			},
			RefreshPhase::Refreshing => RefreshRole::Follower(state.enqueue()),
		}
	}

	fn settle_cycle(&self, cycle: u64, outcome: RefreshOutcome) -> usize {
		let waiters = {
			let mut state = self.state.lock();

			if state.phase == RefreshPhase::Idle || state.cycle != cycle {
				return 0;
			}

			state.finish_cycle()
		};

		notify(waiters, outcome)
	}
}
impl Debug for AuthSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("AuthSession")
			.field("phase", &state.phase)
			.field("pending_waiters", &state.waiters.len())
			.field("cycles_completed", &state.cycle)
			.finish()
	}
}

/// Exclusive right to perform the in-flight refresh.
///
/// Dropping a lease without calling [`RefreshLease::settle`] (for example because the leading
/// request's future was cancelled) settles the cycle with [`Error::RefreshAbandoned`], so
/// waiters are never stranded and the session returns to idle.
#[must_use = "a lease that is dropped unsettled abandons the refresh"]
pub struct RefreshLease<'a> {
	session: &'a AuthSession,
	cycle: u64,
	settled: bool,
}
impl RefreshLease<'_> {
	/// Ends the cycle with `outcome`; returns the number of waiters notified.
	pub fn settle(mut self, outcome: RefreshOutcome) -> usize {
		self.settled = true;

		self.session.settle_cycle(self.cycle, outcome)
	}
}
impl Debug for RefreshLease<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshLease").field("cycle", &self.cycle).finish()
	}
}
impl Drop for RefreshLease<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.session.settle_cycle(self.cycle, Err(Arc::new(Error::RefreshAbandoned)));
		}
	}
}

#[derive(Default)]
struct SessionState {
	phase: RefreshPhase,
	waiters: Vec<oneshot::Sender<RefreshOutcome>>,
	cycle: u64,
}
impl SessionState {
	fn enqueue(&mut self) -> RefreshWaiter {
		let (sender, receiver) = oneshot::channel();

		self.waiters.push(sender);

		RefreshWaiter::new(receiver)
	}

	fn finish_cycle(&mut self) -> Vec<oneshot::Sender<RefreshOutcome>> {
		self.phase = RefreshPhase::Idle;
		self.cycle += 1;

		mem::take(&mut self.waiters)
	}
}

fn notify(waiters: Vec<oneshot::Sender<RefreshOutcome>>, outcome: RefreshOutcome) -> usize {
	let drained = waiters.len();

	for waiter in waiters {
		// Receivers dropped by cancelled callers are skipped.
		let _ = waiter.send(outcome.clone());
	}

	drained
}
