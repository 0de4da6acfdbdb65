//! Shared fixtures for queue integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use herald_queue::{CloseReason, QueueConfig, QueueEvent, Surface, SurfaceId, SurfaceMessage};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// One call the engine made on a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	Show(String),
	Deactivate,
	Clear,
}

/// Surface that records every call with the (paused) clock time it happened at.
pub struct RecordingSurface {
	live: AtomicBool,
	activation: Duration,
	deactivation: Duration,
	calls: Mutex<Vec<(Instant, Call)>>,
}

impl RecordingSurface {
	pub fn live() -> Arc<Self> {
		Self::with_animations(Duration::ZERO, Duration::ZERO)
	}

	pub fn hidden() -> Arc<Self> {
		let surface = Self::live();
		surface.set_live(false);
		surface
	}

	pub fn with_animations(activation: Duration, deactivation: Duration) -> Arc<Self> {
		Arc::new(Self {
			live: AtomicBool::new(true),
			activation,
			deactivation,
			calls: Mutex::new(Vec::new()),
		})
	}

	pub fn set_live(&self, live: bool) {
		self.live.store(live, Ordering::SeqCst);
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().iter().map(|(_, call)| call.clone()).collect()
	}

	pub fn shown(&self) -> Vec<String> {
		self.calls
			.lock()
			.iter()
			.filter_map(|(_, call)| match call {
				Call::Show(content) => Some(content.clone()),
				_ => None,
			})
			.collect()
	}

	/// Time of the first `call` equal to `wanted`.
	pub fn time_of(&self, wanted: &Call) -> Option<Instant> {
		self.calls.lock().iter().find(|(_, call)| call == wanted).map(|(at, _)| *at)
	}

	/// Elapsed time between showing `content` and the next clear.
	pub fn display_time(&self, content: &str) -> Option<Duration> {
		let calls = self.calls.lock();
		let shown_at = calls.iter().position(|(_, call)| *call == Call::Show(content.to_string()))?;
		let cleared = calls[shown_at..].iter().find(|(_, call)| *call == Call::Clear)?;
		Some(cleared.0 - calls[shown_at].0)
	}

	fn record(&self, call: Call) {
		self.calls.lock().push((Instant::now(), call));
	}
}

impl Surface<String> for RecordingSurface {
	fn is_live(&self) -> bool {
		self.live.load(Ordering::SeqCst)
	}

	fn show(&self, message: &SurfaceMessage<String>) {
		self.record(Call::Show(message.content.clone()));
	}

	fn deactivate(&self) {
		self.record(Call::Deactivate);
	}

	fn clear(&self) {
		self.record(Call::Clear);
	}

	fn activation_duration(&self) -> Duration {
		self.activation
	}

	fn deactivation_duration(&self) -> Duration {
		self.deactivation
	}
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Defaults with a 1s fallback duration.
pub fn config() -> QueueConfig {
	QueueConfig::default().default_duration(Duration::from_secs(1))
}

pub async fn next_shown(events: &mut broadcast::Receiver<QueueEvent>) -> SurfaceId {
	loop {
		match events.recv().await {
			Ok(QueueEvent::Shown { surface }) => return surface,
			Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
			Err(broadcast::error::RecvError::Closed) => panic!("event stream closed"),
		}
	}
}

pub async fn next_closed(events: &mut broadcast::Receiver<QueueEvent>) -> (SurfaceId, CloseReason) {
	loop {
		match events.recv().await {
			Ok(QueueEvent::Closed { surface, reason }) => return (surface, reason),
			Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
			Err(broadcast::error::RecvError::Closed) => panic!("event stream closed"),
		}
	}
}
