use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::{JoinError, JoinHandle};

/// What a spawned task is for, carried into the spawn trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TaskClass {
	/// Short timers driven by pointer activity on a surface.
	Interactive,
	/// The coordinator loop and its per-message display cycles.
	Background,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}

/// Runtime for queues created, or hovered, from threads without one
/// (typically a UI toolkit's main thread). Only timers are needed.
fn fallback_runtime() -> &'static Runtime {
	static FALLBACK: OnceLock<Runtime> = OnceLock::new();
	FALLBACK.get_or_init(|| {
		Builder::new_multi_thread()
			.worker_threads(1)
			.thread_name("herald-fallback")
			.enable_time()
			.build()
			.expect("failed to build herald fallback runtime")
	})
}

/// Spawns on the ambient runtime, or on the shared fallback when there is none.
pub(crate) fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	let handle = Handle::try_current().unwrap_or_else(|_| fallback_runtime().handle().clone());
	tracing::trace!(task_class = class.as_str(), "herald.spawn");
	handle.spawn(fut)
}

/// Log text for a display task that did not finish normally.
pub(crate) fn describe_join_error(err: JoinError) -> String {
	if err.is_cancelled() {
		return "task cancelled".to_string();
	}
	match err.try_into_panic() {
		Ok(payload) => match payload.downcast::<String>() {
			Ok(message) => *message,
			Err(payload) => payload
				.downcast_ref::<&'static str>()
				.map_or_else(|| "non-string panic payload".to_string(), |message| (*message).to_string()),
		},
		Err(_) => "task failed".to_string(),
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	#[tokio::test]
	async fn join_errors_read_as_panic_text_or_cancellation() {
		let formatted = tokio::spawn(async { panic!("render {}", 7) }).await.unwrap_err();
		assert_eq!(describe_join_error(formatted), "render 7");

		let literal = tokio::spawn(async { panic!("render failed") }).await.unwrap_err();
		assert_eq!(describe_join_error(literal), "render failed");

		let stuck = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
		stuck.abort();
		assert_eq!(describe_join_error(stuck.await.unwrap_err()), "task cancelled");
	}

	#[test]
	fn spawn_without_ambient_runtime_uses_fallback() {
		let handle = spawn(TaskClass::Interactive, async {
			tokio::time::sleep(Duration::from_millis(5)).await;
			7
		});
		let (tx, rx) = std::sync::mpsc::channel();
		spawn(TaskClass::Background, async move {
			let _ = tx.send(handle.await.ok());
		});
		assert_eq!(rx.recv_timeout(Duration::from_secs(5)).ok().flatten(), Some(7));
	}
}
