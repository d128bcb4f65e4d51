//! Scheduler configuration.

use serde::Deserialize;

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between the starts of consecutive passes.
    pub interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}
