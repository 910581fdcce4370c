//! Session settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the session controller and runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Milliseconds between timer ticks
    pub tick_millis: u64,
    /// Longest session that may be started
    pub max_duration_minutes: u32,
    /// Duration used when none is given
    pub default_duration_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_millis: 1000,
            max_duration_minutes: 60,
            default_duration_minutes: 25,
        }
    }
}

impl SessionConfig {
    /// Tick period; never zero.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}
