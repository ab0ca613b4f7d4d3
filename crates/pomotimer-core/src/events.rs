use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every state change of a session produces an Event.
/// The presentation layer redraws on them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining: u64,
        at: DateTime<Utc>,
    },
    Ticked {
        phase: Phase,
        remaining: u64,
        at: DateTime<Utc>,
    },
    /// The countdown hit zero and the session switched phase.
    /// The session is paused afterwards.
    PhaseCompleted {
        completed: Phase,
        duration: u64,
        next: Phase,
        remaining: u64,
        at: DateTime<Utc>,
    },
    PhaseSkipped {
        skipped: Phase,
        next: Phase,
        remaining: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        remaining: u64,
        total: u64,
        progress: f64,
        is_running: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True when the session switched phase, either by expiry or by skip.
    pub fn is_phase_change(&self) -> bool {
        matches!(self, Event::PhaseCompleted { .. } | Event::PhaseSkipped { .. })
    }
}
