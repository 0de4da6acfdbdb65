use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

struct PauseInner {
	holders: AtomicUsize,
	paused: watch::Sender<bool>,
}

impl PauseInner {
	/// Re-derives the paused signal from the holder count.
	///
	/// Runs under the channel's write lock so racing pause/release calls
	/// always settle on the state of the last counter update.
	fn sync(&self) {
		self.paused.send_if_modified(|paused| {
			let now = self.holders.load(Ordering::Acquire) > 0;
			let changed = *paused != now;
			*paused = now;
			changed
		});
	}
}

/// Reference-counted suspension of displayed time.
///
/// While any [`PauseGuard`] is alive, duration monitors push their deadlines
/// out instead of completing.
#[derive(Clone)]
pub struct PauseGate {
	inner: Arc<PauseInner>,
}

impl Default for PauseGate {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for PauseGate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PauseGate")
			.field("holders", &self.holders())
			.field("paused", &self.is_paused())
			.finish()
	}
}

impl PauseGate {
	pub fn new() -> Self {
		let (paused, _) = watch::channel(false);
		Self {
			inner: Arc::new(PauseInner {
				holders: AtomicUsize::new(0),
				paused,
			}),
		}
	}

	/// Takes one pause hold. The gate stays paused until every hold is released.
	pub fn pause(&self) -> PauseGuard {
		let previous = self.inner.holders.fetch_add(1, Ordering::AcqRel);
		self.inner.sync();
		tracing::trace!(holders = previous.wrapping_add(1), "herald.pause.acquire");
		PauseGuard {
			gate: Some(Arc::clone(&self.inner)),
		}
	}

	pub fn is_paused(&self) -> bool {
		*self.inner.paused.borrow()
	}

	/// Number of outstanding holds.
	pub fn holders(&self) -> usize {
		self.inner.holders.load(Ordering::Acquire)
	}

	/// Watches the aggregate paused signal.
	pub fn subscribe(&self) -> watch::Receiver<bool> {
		self.inner.paused.subscribe()
	}
}

/// One outstanding pause hold, released on drop or [`PauseGuard::release`].
#[must_use = "dropping the guard releases the pause immediately"]
pub struct PauseGuard {
	gate: Option<Arc<PauseInner>>,
}

impl PauseGuard {
	/// Releases this hold.
	pub fn release(mut self) {
		self.release_inner();
	}

	fn release_inner(&mut self) {
		let Some(inner) = self.gate.take() else {
			return;
		};
		let previous = inner.holders.fetch_sub(1, Ordering::AcqRel);
		inner.sync();
		tracing::trace!(holders = previous.wrapping_sub(1), "herald.pause.release");
	}
}

impl Drop for PauseGuard {
	fn drop(&mut self) {
		self.release_inner();
	}
}

impl std::fmt::Debug for PauseGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PauseGuard").field("held", &self.gate.is_some()).finish()
	}
}
