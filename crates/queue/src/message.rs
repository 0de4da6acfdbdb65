//! Message construction and validation.

use std::fmt;
use std::time::Duration;

use crate::error::{BoxError, EnqueueError};

/// Payload types the queue can carry, for both content and action labels.
pub trait Content: Clone + PartialEq + Send + Sync + 'static {}

impl<T> Content for T where T: Clone + PartialEq + Send + Sync + 'static {}

/// One-shot user action callback.
pub type ActionHandler = Box<dyn FnOnce() -> Result<(), BoxError> + Send + 'static>;

/// Which of a message's two action buttons is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
	Primary,
	Secondary,
}

impl ActionKind {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Primary => "primary",
			Self::Secondary => "secondary",
		}
	}
}

impl fmt::Display for ActionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A labelled button and the callback it runs.
pub struct Action<C> {
	label: C,
	handler: ActionHandler,
}

impl<C> Action<C> {
	/// Creates an action from a label and a callback.
	pub fn new(label: C, handler: impl FnOnce() -> Result<(), BoxError> + Send + 'static) -> Self {
		Self {
			label,
			handler: Box::new(handler),
		}
	}

	/// Creates an action whose callback receives `argument` when invoked.
	pub fn with_argument<A>(label: C, argument: A, handler: impl FnOnce(A) -> Result<(), BoxError> + Send + 'static) -> Self
	where
		A: Send + 'static,
	{
		Self::new(label, move || handler(argument))
	}

	/// Button label.
	pub fn label(&self) -> &C {
		&self.label
	}
}

impl<C: fmt::Debug> fmt::Debug for Action<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Action").field("label", &self.label).finish_non_exhaustive()
	}
}

/// Unvalidated description of a message to enqueue.
///
/// Labels and handlers can be supplied separately; mismatches are rejected by
/// [`NotificationQueue::enqueue`](crate::NotificationQueue::enqueue).
pub struct MessageSpec<C> {
	content: Option<C>,
	duration: Option<Duration>,
	primary_label: Option<C>,
	primary_handler: Option<ActionHandler>,
	secondary_label: Option<C>,
	secondary_handler: Option<ActionHandler>,
	promote: bool,
	suppress_dedup: bool,
}

impl<C> Default for MessageSpec<C> {
	fn default() -> Self {
		Self {
			content: None,
			duration: None,
			primary_label: None,
			primary_handler: None,
			secondary_label: None,
			secondary_handler: None,
			promote: false,
			suppress_dedup: false,
		}
	}
}

impl<C> MessageSpec<C> {
	/// Starts a message with the given content.
	pub fn new(content: C) -> Self {
		Self::default().content(content)
	}

	/// Sets the content.
	#[must_use]
	pub fn content(mut self, content: C) -> Self {
		self.content = Some(content);
		self
	}

	/// Overrides the queue's default minimum display time.
	#[must_use]
	pub fn duration(mut self, duration: Duration) -> Self {
		self.duration = Some(duration);
		self
	}

	/// Sets the primary action.
	#[must_use]
	pub fn primary(mut self, action: Action<C>) -> Self {
		self.primary_label = Some(action.label);
		self.primary_handler = Some(action.handler);
		self
	}

	/// Sets the secondary action.
	#[must_use]
	pub fn secondary(mut self, action: Action<C>) -> Self {
		self.secondary_label = Some(action.label);
		self.secondary_handler = Some(action.handler);
		self
	}

	/// Sets only the primary label.
	#[must_use]
	pub fn primary_label(mut self, label: C) -> Self {
		self.primary_label = Some(label);
		self
	}

	/// Sets only the primary handler.
	#[must_use]
	pub fn primary_handler(mut self, handler: impl FnOnce() -> Result<(), BoxError> + Send + 'static) -> Self {
		self.primary_handler = Some(Box::new(handler));
		self
	}

	/// Sets only the secondary label.
	#[must_use]
	pub fn secondary_label(mut self, label: C) -> Self {
		self.secondary_label = Some(label);
		self
	}

	/// Sets only the secondary handler.
	#[must_use]
	pub fn secondary_handler(mut self, handler: impl FnOnce() -> Result<(), BoxError> + Send + 'static) -> Self {
		self.secondary_handler = Some(Box::new(handler));
		self
	}

	/// Places the message ahead of every non-promoted queued message.
	#[must_use]
	pub fn promote(mut self) -> Self {
		self.promote = true;
		self
	}

	/// Enqueues the message even if an identical one is already waiting.
	#[must_use]
	pub fn suppress_dedup(mut self) -> Self {
		self.suppress_dedup = true;
		self
	}

	pub(crate) fn into_item(self, default_duration: Duration) -> Result<QueueItem<C>, EnqueueError> {
		let content = self.content.ok_or(EnqueueError::MissingContent)?;
		let primary = pair(ActionKind::Primary, self.primary_label, self.primary_handler)?;
		let secondary = pair(ActionKind::Secondary, self.secondary_label, self.secondary_handler)?;
		Ok(QueueItem {
			content,
			duration: self.duration.unwrap_or(default_duration),
			primary,
			secondary,
			promoted: self.promote,
			suppress_dedup: self.suppress_dedup,
		})
	}
}

fn pair<C>(kind: ActionKind, label: Option<C>, handler: Option<ActionHandler>) -> Result<Option<Action<C>>, EnqueueError> {
	match (label, handler) {
		(Some(label), Some(handler)) => Ok(Some(Action { label, handler })),
		(None, None) => Ok(None),
		(Some(_), None) => Err(EnqueueError::LabelWithoutHandler { kind }),
		(None, Some(_)) => Err(EnqueueError::HandlerWithoutLabel { kind }),
	}
}

/// What a surface is asked to render for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceMessage<C> {
	pub content: C,
	pub primary_label: Option<C>,
	pub secondary_label: Option<C>,
}

/// A validated, queued message. Shown once, then dropped.
pub(crate) struct QueueItem<C> {
	content: C,
	duration: Duration,
	primary: Option<Action<C>>,
	secondary: Option<Action<C>>,
	promoted: bool,
	suppress_dedup: bool,
}

/// A dequeued item split into what the surface renders and what the click path runs.
pub(crate) struct DisplayParts<C> {
	pub(crate) message: SurfaceMessage<C>,
	pub(crate) duration: Duration,
	pub(crate) primary: Option<ActionHandler>,
	pub(crate) secondary: Option<ActionHandler>,
}

impl<C: Content> QueueItem<C> {
	pub(crate) fn is_promoted(&self) -> bool {
		self.promoted
	}

	pub(crate) fn suppresses_dedup(&self) -> bool {
		self.suppress_dedup
	}

	/// Same content and same action labels.
	pub(crate) fn is_duplicate_of(&self, other: &Self) -> bool {
		self.content == other.content
			&& self.primary.as_ref().map(Action::label) == other.primary.as_ref().map(Action::label)
			&& self.secondary.as_ref().map(Action::label) == other.secondary.as_ref().map(Action::label)
	}

	#[cfg(test)]
	pub(crate) fn content(&self) -> &C {
		&self.content
	}

	pub(crate) fn into_parts(self) -> DisplayParts<C> {
		let (primary_label, primary) = split(self.primary);
		let (secondary_label, secondary) = split(self.secondary);
		DisplayParts {
			message: SurfaceMessage {
				content: self.content,
				primary_label,
				secondary_label,
			},
			duration: self.duration,
			primary,
			secondary,
		}
	}
}

fn split<C>(action: Option<Action<C>>) -> (Option<C>, Option<ActionHandler>) {
	match action {
		Some(Action { label, handler }) => (Some(label), Some(handler)),
		None => (None, None),
	}
}

impl<C: fmt::Debug> fmt::Debug for QueueItem<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("QueueItem")
			.field("content", &self.content)
			.field("duration", &self.duration)
			.field("primary", &self.primary)
			.field("secondary", &self.secondary)
			.field("promoted", &self.promoted)
			.finish_non_exhaustive()
	}
}
