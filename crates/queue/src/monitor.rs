use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::pause::PauseGate;

/// Stand-in deadline for minimums too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Whole milliseconds for log fields, saturating instead of truncating.
pub(crate) fn log_millis(duration: Duration) -> u64 {
	u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// How a duration monitor finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MonitorOutcome {
	/// The minimum display time has elapsed.
	Completed,
	/// The cease token fired first.
	Ceased,
}

/// Minimum-display-time watcher for one shown message.
///
/// Polls once per tick. A tick that observes the pause gate held pushes the
/// deadline out by exactly one tick, regardless of how long the pause actually
/// lasted within that tick.
pub(crate) struct DurationMonitor {
	minimum: Duration,
	tick: Duration,
	gate: PauseGate,
}

impl DurationMonitor {
	pub(crate) fn new(minimum: Duration, tick: Duration, gate: PauseGate) -> Self {
		Self { minimum, tick, gate }
	}

	pub(crate) async fn run(self, cease: CancellationToken) -> MonitorOutcome {
		let start = Instant::now();
		let mut deadline = start.checked_add(self.minimum).unwrap_or_else(|| start + FAR_FUTURE);
		loop {
			tokio::select! {
				biased;
				_ = cease.cancelled() => return MonitorOutcome::Ceased,
				_ = tokio::time::sleep(self.tick) => {}
			}

			if self.gate.is_paused() {
				deadline = deadline.checked_add(self.tick).unwrap_or(deadline);
				continue;
			}
			if Instant::now() >= deadline {
				tracing::trace!(minimum_ms = log_millis(self.minimum), "herald.monitor.completed");
				return MonitorOutcome::Completed;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TICK: Duration = Duration::from_millis(200);

	fn assert_elapsed(start: Instant, expected_ms: u64) {
		let elapsed = start.elapsed();
		let expected = Duration::from_millis(expected_ms);
		assert!(
			elapsed >= expected && elapsed < expected + Duration::from_millis(20),
			"expected ~{expected_ms}ms, got {elapsed:?}"
		);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn completes_on_the_first_tick_past_the_minimum() {
		let start = Instant::now();
		let outcome = DurationMonitor::new(Duration::from_millis(1000), TICK, PauseGate::new())
			.run(CancellationToken::new())
			.await;
		assert_eq!(outcome, MonitorOutcome::Completed);
		assert_elapsed(start, 1000);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn rounds_up_to_tick_granularity() {
		let start = Instant::now();
		DurationMonitor::new(Duration::from_millis(450), TICK, PauseGate::new())
			.run(CancellationToken::new())
			.await;
		assert_elapsed(start, 600);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn each_paused_tick_adds_one_tick() {
		let gate = PauseGate::new();
		let guard = gate.pause();
		let start = Instant::now();
		let monitor = tokio::spawn(DurationMonitor::new(Duration::from_millis(1000), TICK, gate.clone()).run(CancellationToken::new()));

		// Ticks at 200, 400 and 600 observe the pause.
		tokio::time::sleep(Duration::from_millis(700)).await;
		guard.release();

		assert_eq!(monitor.await.unwrap(), MonitorOutcome::Completed);
		assert_elapsed(start, 1600);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn never_completes_while_paused() {
		let gate = PauseGate::new();
		let _guard = gate.pause();
		let monitor = DurationMonitor::new(Duration::from_millis(200), TICK, gate.clone()).run(CancellationToken::new());
		assert!(tokio::time::timeout(Duration::from_secs(30), monitor).await.is_err());
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn unbounded_minimum_waits_for_cease() {
		let gate = PauseGate::new();
		let cease = CancellationToken::new();
		let monitor = tokio::spawn(DurationMonitor::new(Duration::MAX, TICK, gate.clone()).run(cease.clone()));

		let hold = gate.pause();
		tokio::time::sleep(Duration::from_secs(2)).await;
		hold.release();
		tokio::time::sleep(Duration::from_secs(60)).await;
		assert!(!monitor.is_finished());

		cease.cancel();
		assert_eq!(monitor.await.unwrap(), MonitorOutcome::Ceased);
	}

	#[test]
	fn log_millis_saturates() {
		assert_eq!(log_millis(Duration::from_millis(1500)), 1500);
		assert_eq!(log_millis(Duration::MAX), u64::MAX);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn cease_wins_over_completion() {
		let cease = CancellationToken::new();
		let monitor = tokio::spawn(DurationMonitor::new(Duration::from_secs(5), TICK, PauseGate::new()).run(cease.clone()));
		tokio::time::sleep(Duration::from_secs(1)).await;
		cease.cancel();
		assert_eq!(monitor.await.unwrap(), MonitorOutcome::Ceased);
	}
}
