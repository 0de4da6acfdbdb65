use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::ActionFault;
use crate::message::{ActionHandler, ActionKind};
use crate::surface::SurfaceId;

/// Result of delivering a click to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
	/// The handler ran and the message is closing.
	Invoked,
	/// Nothing to run: no message is showing, the clicked slot has no action,
	/// or an action already fired for this message.
	Ignored,
}

struct Armed {
	primary: Option<ActionHandler>,
	secondary: Option<ActionHandler>,
	invoked: CancellationToken,
}

/// Per-surface click wiring for the message currently on display.
///
/// Armed once per display cycle. The first click that finds a handler
/// consumes the whole arming, so a message runs at most one handler.
#[derive(Default)]
pub(crate) struct ActionSlot {
	armed: Mutex<Option<Armed>>,
}

impl ActionSlot {
	/// Installs the handlers for a new message and returns its "action invoked" signal.
	pub(crate) fn arm(&self, primary: Option<ActionHandler>, secondary: Option<ActionHandler>) -> CancellationToken {
		let invoked = CancellationToken::new();
		*self.armed.lock() = Some(Armed {
			primary,
			secondary,
			invoked: invoked.clone(),
		});
		invoked
	}

	pub(crate) fn disarm(&self) {
		self.armed.lock().take();
	}

	/// Runs the clicked slot's handler on the calling thread.
	pub(crate) fn invoke(&self, surface: SurfaceId, kind: ActionKind) -> Result<ActionOutcome, ActionFault> {
		let (handler, invoked) = {
			let mut armed = self.armed.lock();
			let handler = armed.as_mut().and_then(|current| match kind {
				ActionKind::Primary => current.primary.take(),
				ActionKind::Secondary => current.secondary.take(),
			});
			let Some(handler) = handler else {
				tracing::trace!(surface = %surface, kind = kind.as_str(), "herald.action.ignored");
				return Ok(ActionOutcome::Ignored);
			};
			let invoked = armed.take().map(|current| current.invoked).unwrap_or_default();
			(handler, invoked)
		};

		invoked.cancel();
		tracing::debug!(surface = %surface, kind = kind.as_str(), "herald.action.invoke");
		match handler() {
			Ok(()) => Ok(ActionOutcome::Invoked),
			Err(source) => {
				tracing::error!(
					surface = %surface,
					kind = kind.as_str(),
					error = %source,
					details = ?source,
					"herald.action.fault"
				);
				Err(ActionFault::new(surface, kind, source))
			}
		}
	}
}
