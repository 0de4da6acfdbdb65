use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::message::SurfaceMessage;

/// Work marshaled onto a surface's owning UI context.
pub type UiJob = Box<dyn FnOnce() + Send + 'static>;

/// A display target that can show one message at a time.
///
/// The engine only calls the methods below from inside a job handed to
/// [`Surface::dispatch`]. Toolkits with thread-affine widgets override
/// `dispatch` to post the job to their event loop; the default runs it on the
/// calling thread.
///
/// Pointer and click notifications are delivered back to the engine through
/// the [`SurfaceAttachment`](crate::SurfaceAttachment) returned on attach.
pub trait Surface<C>: Send + Sync + 'static {
	/// Runs `job` on the surface's UI context. Dropping the job without
	/// running it tells the engine the surface is unreachable.
	fn dispatch(&self, job: UiJob) {
		job();
	}

	/// Loaded, visible, and not inside a minimized window.
	fn is_live(&self) -> bool;

	/// Renders `message` and starts the activation animation.
	fn show(&self, message: &SurfaceMessage<C>);

	/// Starts the deactivation animation.
	fn deactivate(&self) {}

	/// Removes the message content.
	fn clear(&self);

	fn activation_duration(&self) -> Duration {
		Duration::ZERO
	}

	fn deactivation_duration(&self) -> Duration {
		Duration::ZERO
	}
}

/// Identity of one attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub(crate) u64);

impl SurfaceId {
	pub fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SurfaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "surface#{}", self.0)
	}
}

/// Runs `f` against `surface` on its UI context and waits for the result.
///
/// Returns `None` if the surface dropped the job instead of running it.
pub(crate) async fn on_ui<C, R, F>(surface: Arc<dyn Surface<C>>, f: F) -> Option<R>
where
	C: 'static,
	R: Send + 'static,
	F: FnOnce(&dyn Surface<C>) -> R + Send + 'static,
{
	let (tx, rx) = oneshot::channel();
	let target = Arc::clone(&surface);
	surface.dispatch(Box::new(move || {
		let _ = tx.send(f(target.as_ref()));
	}));
	drop(surface);
	rx.await.ok()
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;
	use std::sync::mpsc;

	use super::*;

	struct QueuedUi {
		jobs: Mutex<mpsc::Sender<UiJob>>,
	}

	impl Surface<String> for QueuedUi {
		fn dispatch(&self, job: UiJob) {
			let _ = self.jobs.lock().unwrap().send(job);
		}

		fn is_live(&self) -> bool {
			true
		}

		fn show(&self, _message: &SurfaceMessage<String>) {}

		fn clear(&self) {}

		fn activation_duration(&self) -> Duration {
			Duration::from_millis(250)
		}
	}

	struct DeadUi;

	impl Surface<String> for DeadUi {
		fn dispatch(&self, job: UiJob) {
			drop(job);
		}

		fn is_live(&self) -> bool {
			true
		}

		fn show(&self, _message: &SurfaceMessage<String>) {}

		fn clear(&self) {}
	}

	#[tokio::test]
	async fn jobs_run_on_the_surface_thread() {
		let (tx, rx) = mpsc::channel::<UiJob>();
		let ui_thread = std::thread::spawn(move || {
			let job = rx.recv().unwrap();
			let id = std::thread::current().id();
			job();
			id
		});

		let surface: Arc<dyn Surface<String>> = Arc::new(QueuedUi { jobs: Mutex::new(tx) });
		let (ran_on, activation) = on_ui(surface, |s| (std::thread::current().id(), s.activation_duration())).await.unwrap();
		assert_eq!(ran_on, ui_thread.join().unwrap());
		assert_eq!(activation, Duration::from_millis(250));
	}

	#[tokio::test]
	async fn dropped_job_yields_none() {
		let surface: Arc<dyn Surface<String>> = Arc::new(DeadUi);
		assert_eq!(on_ui(surface, |s| s.is_live()).await, None);
	}
}
