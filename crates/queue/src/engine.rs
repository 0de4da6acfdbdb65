use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::QueueConfig;
use crate::coordinator::Coordinator;
use crate::error::{ConfigError, EnqueueError};
use crate::event::QueueEvent;
use crate::message::{Content, MessageSpec};
use crate::pause::{PauseGate, PauseGuard};
use crate::registry::{SurfaceAttachment, SurfaceRegistry};
use crate::spawn::{TaskClass, spawn};
use crate::store::{EnqueueOutcome, MessageStore};
use crate::surface::Surface;

/// Queue of timed notifications shown one at a time on attached surfaces.
///
/// Creating a queue starts its coordinator task on the ambient tokio runtime,
/// or on a shared fallback runtime when there is none. Dropping the queue
/// disposes it.
pub struct NotificationQueue<C: Content> {
	store: Arc<MessageStore<C>>,
	registry: SurfaceRegistry<C>,
	gate: PauseGate,
	config: QueueConfig,
	events: broadcast::Sender<QueueEvent>,
	disposed: CancellationToken,
	displaying: Arc<AtomicBool>,
	coordinator: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Content> NotificationQueue<C> {
	/// Creates a queue with its own pause gate.
	pub fn new(config: QueueConfig) -> Result<Self, ConfigError> {
		Self::with_pause_gate(config, PauseGate::new())
	}

	/// Creates a queue whose countdowns honor an existing, possibly shared, pause gate.
	pub fn with_pause_gate(config: QueueConfig, gate: PauseGate) -> Result<Self, ConfigError> {
		config.validate()?;

		let disposed = CancellationToken::new();
		let (events, _) = broadcast::channel(config.event_buffer);
		let store = Arc::new(MessageStore::new(config.discard_duplicates));
		let registry = SurfaceRegistry::new(config.hover_grace, disposed.clone());
		let displaying = Arc::new(AtomicBool::new(false));

		let coordinator = Coordinator {
			store: Arc::clone(&store),
			registry: registry.clone(),
			gate: gate.clone(),
			config: config.clone(),
			events: events.clone(),
			disposed: disposed.clone(),
			displaying: Arc::clone(&displaying),
		};
		let handle = spawn(TaskClass::Background, coordinator.run());

		Ok(Self {
			store,
			registry,
			gate,
			config,
			events,
			disposed,
			displaying,
			coordinator: Mutex::new(Some(handle)),
		})
	}

	/// Validates and queues one message. Never waits on the display loop.
	///
	/// After [`dispose`](Self::dispose) messages are still accepted but never shown.
	pub fn enqueue(&self, spec: MessageSpec<C>) -> Result<EnqueueOutcome, EnqueueError> {
		let item = spec.into_item(self.config.default_duration)?;
		let outcome = self.store.enqueue(item);
		tracing::trace!(outcome = ?outcome, pending = self.store.len(), "herald.enqueue");
		Ok(outcome)
	}

	/// Attaches a display target. Keep the returned attachment alive for as
	/// long as the surface should receive messages.
	pub fn attach<S>(&self, surface: Arc<S>) -> SurfaceAttachment<C>
	where
		S: Surface<C>,
	{
		self.registry.attach(surface)
	}

	/// Suspends every message countdown until the guard is released.
	pub fn pause(&self) -> PauseGuard {
		self.gate.pause()
	}

	pub fn is_paused(&self) -> bool {
		self.gate.is_paused()
	}

	pub fn pause_gate(&self) -> &PauseGate {
		&self.gate
	}

	/// Messages waiting to be shown, excluding the one on display.
	pub fn pending(&self) -> usize {
		self.store.len()
	}

	/// Drops every waiting message. The message on display is unaffected.
	pub fn clear(&self) -> usize {
		let removed = self.store.clear();
		tracing::debug!(removed, "herald.clear");
		removed
	}

	/// Whether a message is currently on a surface.
	pub fn is_displaying(&self) -> bool {
		self.displaying.load(Ordering::Acquire)
	}

	/// Number of attached surfaces, live or not.
	pub fn surfaces(&self) -> usize {
		self.registry.len()
	}

	pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
		self.events.subscribe()
	}

	pub fn config(&self) -> &QueueConfig {
		&self.config
	}

	/// Stops the display loop for good. Idempotent.
	///
	/// A message on display is abandoned: its surface is deactivated and
	/// cleared without waiting for animations.
	pub fn dispose(&self) {
		if !self.disposed.is_cancelled() {
			tracing::debug!(pending = self.store.len(), "herald.dispose");
		}
		self.disposed.cancel();
	}

	pub fn is_disposed(&self) -> bool {
		self.disposed.is_cancelled()
	}

	/// Disposes and waits for the coordinator task to finish.
	pub async fn shutdown(&self) {
		self.dispose();
		let handle = self.coordinator.lock().take();
		if let Some(handle) = handle {
			let _ = handle.await;
		}
	}
}

impl<C: Content> Drop for NotificationQueue<C> {
	fn drop(&mut self) {
		self.disposed.cancel();
	}
}

impl<C: Content> std::fmt::Debug for NotificationQueue<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NotificationQueue")
			.field("pending", &self.pending())
			.field("surfaces", &self.surfaces())
			.field("displaying", &self.is_displaying())
			.field("paused", &self.is_paused())
			.field("disposed", &self.is_disposed())
			.finish()
	}
}
