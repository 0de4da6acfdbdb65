use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use herald_queue::{Surface, SurfaceMessage};

use crate::config::SurfaceSettings;

/// Prints messages to stdout, one line per state change.
pub struct TerminalSurface {
	live: AtomicBool,
	settings: SurfaceSettings,
}

impl TerminalSurface {
	pub fn new(settings: SurfaceSettings) -> Self {
		Self {
			live: AtomicBool::new(true),
			settings,
		}
	}

	pub fn set_live(&self, live: bool) {
		self.live.store(live, Ordering::Release);
	}

	fn print(&self, line: &str) {
		let mut out = std::io::stdout().lock();
		let _ = writeln!(out, "{line}");
		let _ = out.flush();
	}
}

impl Surface<String> for TerminalSurface {
	fn is_live(&self) -> bool {
		self.live.load(Ordering::Acquire)
	}

	fn show(&self, message: &SurfaceMessage<String>) {
		let mut line = format!("> {}", message.content);
		for label in [&message.primary_label, &message.secondary_label].into_iter().flatten() {
			line.push_str(&format!("  [{label}]"));
		}
		self.print(&line);
	}

	fn deactivate(&self) {
		self.print("  ...");
	}

	fn clear(&self) {
		self.print("  (closed)");
	}

	fn activation_duration(&self) -> Duration {
		self.settings.activation()
	}

	fn deactivation_duration(&self) -> Duration {
		self.settings.deactivation()
	}
}
