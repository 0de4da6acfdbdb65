use crate::surface::SurfaceId;

/// Why a displayed message left its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
	/// Minimum duration elapsed and the pointer was not over the surface.
	Elapsed,
	/// A primary or secondary action was invoked.
	ActionInvoked,
	/// The surface was detached while showing the message.
	Detached,
	/// The queue was disposed while showing the message.
	Disposed,
	/// The display cycle panicked.
	Faulted,
}

impl CloseReason {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Elapsed => "elapsed",
			Self::ActionInvoked => "action_invoked",
			Self::Detached => "detached",
			Self::Disposed => "disposed",
			Self::Faulted => "faulted",
		}
	}
}

/// Lifecycle events broadcast by a [`NotificationQueue`](crate::NotificationQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEvent {
	/// A message was handed to a surface.
	Shown { surface: SurfaceId },
	/// The message on `surface` was torn down.
	Closed { surface: SurfaceId, reason: CloseReason },
	/// Messages are waiting but no attached surface is live.
	AwaitingSurface { attempts: u32 },
	/// The coordinator loop exited after disposal.
	Stopped,
}
