//! Serialized display of timed notifications.
//!
//! A [`NotificationQueue`] owns one background coordinator task that takes
//! messages off a promotion-aware, de-duplicating store and shows them one at a
//! time on whichever attached [`Surface`] is currently live. A message stays up
//! until its minimum duration has elapsed and the pointer is no longer over the
//! surface, or until the user invokes one of its actions.
//!
//! Surfaces are opaque display targets. Every call the engine makes on a
//! surface goes through [`Surface::dispatch`], so implementations backed by a
//! UI toolkit can marshal the work onto their own event loop.

mod action;
mod config;
mod coordinator;
mod engine;
mod error;
mod event;
mod hover;
mod message;
mod monitor;
mod pause;
mod registry;
mod spawn;
mod store;
mod surface;

pub use action::ActionOutcome;
pub use config::QueueConfig;
pub use engine::NotificationQueue;
pub use error::{ActionFault, BoxError, ConfigError, EnqueueError};
pub use event::{CloseReason, QueueEvent};
pub use message::{Action, ActionHandler, ActionKind, Content, MessageSpec, SurfaceMessage};
pub use pause::{PauseGate, PauseGuard};
pub use registry::SurfaceAttachment;
pub use store::EnqueueOutcome;
pub use surface::{Surface, SurfaceId, UiJob};
