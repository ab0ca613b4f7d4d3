use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Phase lengths and tick cadence.
///
/// Durations count abstract ticks, not seconds. With the default
/// `tick_interval_ms` of 1000 one tick happens to be one second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_duration")]
    pub work_duration: u64,
    #[serde(default = "default_rest_duration")]
    pub rest_duration: u64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_work_duration() -> u64 {
    25
}
fn default_rest_duration() -> u64 {
    10
}
fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            rest_duration: default_rest_duration(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl TimerConfig {
    /// # Errors
    /// Returns an error if a phase duration or the tick interval is zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.work_duration == 0 {
            return Err(ValidationError::ZeroDuration {
                field: "work_duration",
            });
        }
        if self.rest_duration == 0 {
            return Err(ValidationError::ZeroDuration {
                field: "rest_duration",
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ValidationError::ZeroTickInterval);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
