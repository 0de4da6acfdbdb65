use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use herald_queue::QueueConfig;
use serde::Deserialize;

/// Contents of the `--config` TOML file.
///
/// ```toml
/// [queue]
/// default_duration_ms = 4000
/// hover_grace_ms = 1500
///
/// [surface]
/// activation_ms = 150
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	pub queue: QueueConfig,
	pub surface: SurfaceSettings,
}

/// Animation timings the terminal surface reports to the queue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceSettings {
	pub activation_ms: u64,
	pub deactivation_ms: u64,
}

impl Default for SurfaceSettings {
	fn default() -> Self {
		Self {
			activation_ms: 150,
			deactivation_ms: 150,
		}
	}
}

impl SurfaceSettings {
	pub fn activation(&self) -> Duration {
		Duration::from_millis(self.activation_ms)
	}

	pub fn deactivation(&self) -> Duration {
		Duration::from_millis(self.deactivation_ms)
	}
}

/// Reads settings from `path`, or the defaults when no file is given.
pub fn load(path: Option<&Path>) -> anyhow::Result<Settings> {
	let Some(path) = path else {
		return Ok(Settings::default());
	};
	let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
	parse(&text).with_context(|| format!("loading {}", path.display()))
}

fn parse(text: &str) -> anyhow::Result<Settings> {
	let settings: Settings = toml::from_str(text)?;
	settings.queue.validate()?;
	Ok(settings)
}
