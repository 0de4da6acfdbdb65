use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::QueueConfig;
use crate::event::{CloseReason, QueueEvent};
use crate::hover::wait_not_hovering;
use crate::message::{Content, QueueItem};
use crate::monitor::{DurationMonitor, MonitorOutcome, log_millis};
use crate::pause::PauseGate;
use crate::registry::{SurfaceEntry, SurfaceRegistry};
use crate::spawn::{TaskClass, describe_join_error, spawn};
use crate::store::MessageStore;
use crate::surface::on_ui;

/// Failed surface lookups between two `debug`-level reports.
const AWAIT_SURFACE_LOG_EVERY: u32 = 10;

/// The display loop: one message at a time, one live surface at a time.
pub(crate) struct Coordinator<C> {
	pub(crate) store: Arc<MessageStore<C>>,
	pub(crate) registry: SurfaceRegistry<C>,
	pub(crate) gate: PauseGate,
	pub(crate) config: QueueConfig,
	pub(crate) events: broadcast::Sender<QueueEvent>,
	pub(crate) disposed: CancellationToken,
	pub(crate) displaying: Arc<AtomicBool>,
}

impl<C> Clone for Coordinator<C> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
			registry: self.registry.clone(),
			gate: self.gate.clone(),
			config: self.config.clone(),
			events: self.events.clone(),
			disposed: self.disposed.clone(),
			displaying: Arc::clone(&self.displaying),
		}
	}
}

impl<C: Content> Coordinator<C> {
	pub(crate) async fn run(self) {
		tracing::debug!("herald.coordinator.start");
		loop {
			// Idle: wait for work.
			tokio::select! {
				biased;
				_ = self.disposed.cancelled() => break,
				_ = self.store.wait_available() => {}
			}

			// Selecting: the head message stays queued until a surface is found.
			let Some(entry) = self.await_live_surface().await else {
				break;
			};
			if self.disposed.is_cancelled() {
				break;
			}
			let Some(item) = self.store.dequeue_head() else {
				continue;
			};

			// Showing and closing run in their own task so a panicking
			// surface or handler only costs this one message.
			self.displaying.store(true, Ordering::Release);
			let cycle = spawn(TaskClass::Background, self.clone().display(Arc::clone(&entry), item));
			let reason = match cycle.await {
				Ok(reason) => reason,
				Err(err) => {
					tracing::error!(surface = %entry.id(), panic = %describe_join_error(err), "herald.display.panicked");
					entry.actions.disarm();
					self.teardown_faulted(&entry).await;
					CloseReason::Faulted
				}
			};
			self.displaying.store(false, Ordering::Release);

			tracing::debug!(surface = %entry.id(), reason = reason.as_str(), pending = self.store.len(), "herald.display.closed");
			let _ = self.events.send(QueueEvent::Closed {
				surface: entry.id(),
				reason,
			});
		}

		tracing::debug!(pending = self.store.len(), "herald.coordinator.stop");
		let _ = self.events.send(QueueEvent::Stopped);
	}

	/// Retries until some attached surface is live. `None` only on disposal.
	async fn await_live_surface(&self) -> Option<Arc<SurfaceEntry<C>>> {
		let mut attempts = 0u32;
		loop {
			if self.disposed.is_cancelled() {
				return None;
			}
			if let Some(entry) = self.registry.pick_live().await {
				return Some(entry);
			}

			attempts = attempts.saturating_add(1);
			if attempts % AWAIT_SURFACE_LOG_EVERY == 0 {
				tracing::debug!(attempts, attached = self.registry.len(), pending = self.store.len(), "herald.surface.unavailable");
			} else {
				tracing::trace!(attempts, "herald.surface.wait");
			}
			let _ = self.events.send(QueueEvent::AwaitingSurface { attempts });

			tokio::select! {
				biased;
				_ = self.disposed.cancelled() => return None,
				_ = tokio::time::sleep(self.config.surface_backoff) => {}
			}
		}
	}

	/// Shows one message on `entry` and tears it down again.
	async fn display(self, entry: Arc<SurfaceEntry<C>>, item: QueueItem<C>) -> CloseReason {
		let parts = item.into_parts();
		let invoked = entry.actions.arm(parts.primary, parts.secondary);

		let Some(surface) = entry.surface() else {
			entry.actions.disarm();
			return CloseReason::Detached;
		};
		let message = parts.message;
		let Some(activation) = on_ui(surface, move |s| {
			s.show(&message);
			s.activation_duration()
		})
		.await
		else {
			entry.actions.disarm();
			return CloseReason::Detached;
		};

		tracing::debug!(
			surface = %entry.id(),
			duration_ms = log_millis(parts.duration),
			activation_ms = log_millis(activation),
			"herald.display.shown"
		);
		let _ = self.events.send(QueueEvent::Shown { surface: entry.id() });

		let cease = self.disposed.child_token();
		let monitor = DurationMonitor::new(parts.duration.saturating_add(activation), self.config.tick, self.gate.clone());
		let mut not_hovering = entry.hover.subscribe();
		let timed_out = async {
			match monitor.run(cease.clone()).await {
				MonitorOutcome::Completed => {
					wait_not_hovering(&mut not_hovering).await;
					CloseReason::Elapsed
				}
				MonitorOutcome::Ceased => CloseReason::Disposed,
			}
		};

		let reason = tokio::select! {
			biased;
			_ = self.disposed.cancelled() => CloseReason::Disposed,
			_ = entry.detached() => CloseReason::Detached,
			_ = invoked.cancelled() => CloseReason::ActionInvoked,
			reason = timed_out => reason,
		};
		cease.cancel();
		entry.actions.disarm();

		self.close(&entry, reason).await;
		reason
	}

	/// Clears whatever a panicked cycle left on the surface. Runs in its own
	/// task as well, so a surface that panics again only loses the teardown.
	async fn teardown_faulted(&self, entry: &Arc<SurfaceEntry<C>>) {
		let this = self.clone();
		let target = Arc::clone(entry);
		let teardown = spawn(TaskClass::Background, async move {
			this.close(&target, CloseReason::Faulted).await;
		});
		if let Err(err) = teardown.await {
			tracing::error!(surface = %entry.id(), panic = %describe_join_error(err), "herald.display.teardown_panicked");
		}
	}

	/// Deactivates and clears the surface, unless it is gone.
	async fn close(&self, entry: &SurfaceEntry<C>, reason: CloseReason) {
		if reason == CloseReason::Detached {
			return;
		}
		let Some(surface) = entry.surface() else {
			return;
		};
		let deactivation = on_ui(surface, |s| {
			s.deactivate();
			s.deactivation_duration()
		})
		.await
		.unwrap_or_default();

		if reason != CloseReason::Disposed {
			let wait = deactivation.min(self.config.max_deactivation_wait);
			tokio::select! {
				biased;
				_ = entry.detached() => return,
				_ = self.disposed.cancelled() => {}
				_ = tokio::time::sleep(wait) => {}
			}
		}

		// Re-resolve: the surface may have been detached during the animation.
		if let Some(surface) = entry.surface() {
			on_ui(surface, |s| s.clear()).await;
		}
	}
}
