//! Error types for enqueueing, action dispatch, and configuration.

use thiserror::Error;

use crate::message::ActionKind;
use crate::surface::SurfaceId;

/// Boxed error returned by user-supplied action handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Rejection of a malformed message at enqueue time.
///
/// Nothing enters the queue when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
	/// The message has no content to show.
	#[error("message content is required")]
	MissingContent,

	/// An action label was supplied without a handler to run.
	#[error("{kind} action has a label but no handler")]
	LabelWithoutHandler {
		/// Slot the label was supplied for.
		kind: ActionKind,
	},

	/// An action handler was supplied without a label to show.
	#[error("{kind} action has a handler but no label")]
	HandlerWithoutLabel {
		/// Slot the handler was supplied for.
		kind: ActionKind,
	},
}

/// A user action handler returned an error.
///
/// Returned to whoever delivered the click, after it has been logged.
#[derive(Debug, Error)]
#[error("{kind} action handler on {surface} failed: {source}")]
pub struct ActionFault {
	surface: SurfaceId,
	kind: ActionKind,
	#[source]
	source: BoxError,
}

impl ActionFault {
	pub(crate) fn new(surface: SurfaceId, kind: ActionKind, source: BoxError) -> Self {
		Self { surface, kind, source }
	}

	/// Surface whose button was clicked.
	pub fn surface(&self) -> SurfaceId {
		self.surface
	}

	/// Which action slot faulted.
	pub fn kind(&self) -> ActionKind {
		self.kind
	}

	/// Consumes the fault and returns the handler's error.
	pub fn into_source(self) -> BoxError {
		self.source
	}
}

/// Invalid [`QueueConfig`](crate::QueueConfig) values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	/// The duration monitor cannot tick at zero granularity.
	#[error("tick granularity must be greater than zero")]
	ZeroTick,

	/// Broadcast channels need at least one slot.
	#[error("event buffer must hold at least one event")]
	ZeroEventBuffer,
}
