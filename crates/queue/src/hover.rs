use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::spawn::{TaskClass, spawn};

struct HoverState {
	/// Bumped on every enter/leave so a stale grace timer can tell it was superseded.
	generation: u64,
	hovering: bool,
}

/// Debounced "pointer is not over this surface" signal.
///
/// Entering clears the signal immediately. Leaving raises it only after the
/// grace window passes with no re-entry. The signal starts raised.
pub(crate) struct HoverGuard {
	state: Mutex<HoverState>,
	not_hovering: watch::Sender<bool>,
	grace: Duration,
	cancel: CancellationToken,
}

impl HoverGuard {
	pub(crate) fn new(grace: Duration, cancel: CancellationToken) -> Self {
		let (not_hovering, _) = watch::channel(true);
		Self {
			state: Mutex::new(HoverState {
				generation: 0,
				hovering: false,
			}),
			not_hovering,
			grace,
			cancel,
		}
	}

	pub(crate) fn pointer_entered(&self) {
		let mut state = self.state.lock();
		state.generation = state.generation.wrapping_add(1);
		state.hovering = true;
		self.not_hovering.send_replace(false);
	}

	pub(crate) fn pointer_left(self: &Arc<Self>) {
		let generation = {
			let mut state = self.state.lock();
			if !state.hovering {
				return;
			}
			state.generation = state.generation.wrapping_add(1);
			state.hovering = false;
			state.generation
		};

		let guard = Arc::clone(self);
		spawn(TaskClass::Interactive, async move {
			tokio::select! {
				biased;
				_ = guard.cancel.cancelled() => {}
				_ = tokio::time::sleep(guard.grace) => guard.grace_elapsed(generation),
			}
		});
	}

	fn grace_elapsed(&self, generation: u64) {
		let state = self.state.lock();
		if state.generation != generation || state.hovering {
			tracing::trace!(generation, current = state.generation, "herald.hover.grace_superseded");
			return;
		}
		self.not_hovering.send_replace(true);
	}

	pub(crate) fn is_hovering(&self) -> bool {
		self.state.lock().hovering
	}

	pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
		self.not_hovering.subscribe()
	}
}

/// Resolves once the guard reports the pointer gone (or the guard is dropped).
pub(crate) async fn wait_not_hovering(rx: &mut watch::Receiver<bool>) {
	let _ = rx.wait_for(|not_hovering| *not_hovering).await;
}

#[cfg(test)]
mod tests {
	use super::*;

	const GRACE: Duration = Duration::from_secs(2);

	fn guard() -> Arc<HoverGuard> {
		Arc::new(HoverGuard::new(GRACE, CancellationToken::new()))
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn starts_not_hovering() {
		let guard = guard();
		let mut rx = guard.subscribe();
		tokio::time::timeout(Duration::from_millis(1), wait_not_hovering(&mut rx))
			.await
			.expect("never hovered");
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn leave_raises_after_grace() {
		let guard = guard();
		let mut rx = guard.subscribe();
		guard.pointer_entered();
		assert!(!*rx.borrow());

		let start = tokio::time::Instant::now();
		guard.pointer_left();
		wait_not_hovering(&mut rx).await;
		assert!(start.elapsed() >= GRACE);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn reentry_during_grace_supersedes_the_timer() {
		let guard = guard();
		let mut rx = guard.subscribe();
		guard.pointer_entered();
		guard.pointer_left();
		tokio::time::sleep(Duration::from_secs(1)).await;
		guard.pointer_entered();

		// Well past the first leave's grace window.
		tokio::time::sleep(Duration::from_secs(5)).await;
		assert!(!*rx.borrow_and_update());
		assert!(guard.is_hovering());

		guard.pointer_left();
		wait_not_hovering(&mut rx).await;
		assert!(!guard.is_hovering());
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn flicker_only_honours_the_last_leave() {
		let guard = guard();
		let mut rx = guard.subscribe();
		guard.pointer_entered();
		guard.pointer_left();
		tokio::time::sleep(Duration::from_millis(500)).await;
		guard.pointer_entered();
		guard.pointer_left();

		let start = tokio::time::Instant::now();
		wait_not_hovering(&mut rx).await;
		assert!(start.elapsed() >= GRACE, "first leave's timer must not fire early");
	}

	#[test]
	fn leave_from_a_thread_without_runtime_still_raises() {
		let guard = Arc::new(HoverGuard::new(Duration::from_millis(10), CancellationToken::new()));
		let rx = guard.subscribe();
		guard.pointer_entered();
		guard.pointer_left();

		let deadline = std::time::Instant::now() + Duration::from_secs(5);
		while !*rx.borrow() {
			assert!(std::time::Instant::now() < deadline, "grace timer never fired");
			std::thread::sleep(Duration::from_millis(5));
		}
		assert!(!guard.is_hovering());
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn cancelled_guard_never_raises() {
		let cancel = CancellationToken::new();
		let guard = Arc::new(HoverGuard::new(GRACE, cancel.clone()));
		let rx = guard.subscribe();
		guard.pointer_entered();
		guard.pointer_left();
		cancel.cancel();
		tokio::time::sleep(GRACE * 2).await;
		assert!(!*rx.borrow());
	}
}
