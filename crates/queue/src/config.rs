use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Timing and policy knobs for a [`NotificationQueue`](crate::NotificationQueue).
///
/// Durations are written as whole milliseconds when deserialized, e.g.
/// `tick_ms = 200`. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
	/// Minimum display time for messages that do not set their own.
	#[serde(rename = "default_duration_ms", deserialize_with = "millis")]
	pub default_duration: Duration,
	/// Polling granularity of the duration monitor. Each tick observed while
	/// paused pushes the deadline out by one tick.
	#[serde(rename = "tick_ms", deserialize_with = "millis")]
	pub tick: Duration,
	/// Quiet window after the pointer leaves a surface before the message may close.
	#[serde(rename = "hover_grace_ms", deserialize_with = "millis")]
	pub hover_grace: Duration,
	/// Delay between attempts to find a live surface.
	#[serde(rename = "surface_backoff_ms", deserialize_with = "millis")]
	pub surface_backoff: Duration,
	/// Upper bound on how long the coordinator waits for a surface's deactivation animation.
	#[serde(rename = "max_deactivation_wait_ms", deserialize_with = "millis")]
	pub max_deactivation_wait: Duration,
	/// Drop incoming messages that match a queued message's content and labels.
	pub discard_duplicates: bool,
	/// Capacity of the lifecycle event broadcast channel.
	pub event_buffer: usize,
}

impl Default for QueueConfig {
	fn default() -> Self {
		Self {
			default_duration: Duration::from_secs(3),
			tick: Duration::from_millis(200),
			hover_grace: Duration::from_secs(2),
			surface_backoff: Duration::from_secs(1),
			max_deactivation_wait: Duration::from_secs(1),
			discard_duplicates: true,
			event_buffer: 64,
		}
	}
}

impl QueueConfig {
	/// Checks values the engine cannot run with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.tick.is_zero() {
			return Err(ConfigError::ZeroTick);
		}
		if self.event_buffer == 0 {
			return Err(ConfigError::ZeroEventBuffer);
		}
		Ok(())
	}

	/// Sets the default message duration.
	#[must_use]
	pub fn default_duration(mut self, duration: Duration) -> Self {
		self.default_duration = duration;
		self
	}

	/// Sets the duration monitor tick.
	#[must_use]
	pub fn tick(mut self, tick: Duration) -> Self {
		self.tick = tick;
		self
	}

	/// Sets the hover grace window.
	#[must_use]
	pub fn hover_grace(mut self, grace: Duration) -> Self {
		self.hover_grace = grace;
		self
	}

	/// Sets the live-surface retry delay.
	#[must_use]
	pub fn surface_backoff(mut self, backoff: Duration) -> Self {
		self.surface_backoff = backoff;
		self
	}

	/// Enables or disables duplicate suppression.
	#[must_use]
	pub fn discard_duplicates(mut self, discard: bool) -> Self {
		self.discard_duplicates = discard;
		self
	}
}

fn millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
	D: Deserializer<'de>,
{
	u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_validate() {
		assert_eq!(QueueConfig::default().validate(), Ok(()));
	}

	#[test]
	fn zero_tick_is_rejected() {
		let config = QueueConfig::default().tick(Duration::ZERO);
		assert_eq!(config.validate(), Err(ConfigError::ZeroTick));
	}

	#[test]
	fn partial_toml_keeps_defaults() {
		let config: QueueConfig = toml::from_str("tick_ms = 50\ndiscard_duplicates = false\n").unwrap();
		assert_eq!(config.tick, Duration::from_millis(50));
		assert!(!config.discard_duplicates);
		assert_eq!(config.hover_grace, Duration::from_secs(2));
		assert_eq!(config.default_duration, Duration::from_secs(3));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(toml::from_str::<QueueConfig>("tick = 50\n").is_err());
	}
}
