//! Work/rest session state machine.
//!
//! The session does not own a clock. Whoever drives it calls `tick()` at a
//! fixed cadence while it is running; ticks while paused are ignored.
//!
//! ## State Transitions
//!
//! ```text
//! Work-Paused <-> Work-Running --expiry--> Rest-Paused
//! Rest-Paused <-> Rest-Running --expiry--> Work-Paused
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = Session::new(&TimerConfig::default())?;
//! session.start();
//! // On every tick of the driver:
//! session.tick(); // Some(Event::PhaseCompleted { .. }) at the boundary
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Phase, TimerConfig};
use crate::error::ValidationError;
use crate::events::Event;

/// Mutable state of one timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    phase: Phase,
    /// Ticks left in the current phase. Never zero between calls: hitting
    /// zero switches phase and reloads it.
    remaining: u64,
    is_running: bool,
    work_duration: u64,
    rest_duration: u64,
}

impl Session {
    /// Create a session in the Work-Paused state with a full work phase.
    ///
    /// # Errors
    /// Returns an error if either phase duration is zero.
    pub fn new(config: &TimerConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            phase: Phase::Work,
            remaining: config.work_duration,
            is_running: false,
            work_duration: config.work_duration,
            rest_duration: config.rest_duration,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn work_duration(&self) -> u64 {
        self.work_duration
    }

    pub fn rest_duration(&self) -> u64 {
        self.rest_duration
    }

    pub fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_duration,
            Phase::Rest => self.rest_duration,
        }
    }

    /// Length of the current phase in ticks.
    pub fn total(&self) -> u64 {
        self.duration_of(self.phase)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.remaining as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            remaining: self.remaining,
            total: self.total(),
            progress: self.progress(),
            is_running: self.is_running,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.is_running {
            return None;
        }
        self.is_running = true;
        debug!(phase = %self.phase, remaining = self.remaining, "timer started");
        Some(Event::TimerStarted {
            phase: self.phase,
            remaining: self.remaining,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.is_running = false;
        debug!(phase = %self.phase, remaining = self.remaining, "timer paused");
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining: self.remaining,
            at: Utc::now(),
        })
    }

    /// The single user action: start when paused, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Advance the countdown by one tick.
    ///
    /// Returns `None` while paused. At the phase boundary the session
    /// switches phase, reloads the countdown and stops.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            let completed = self.phase;
            let duration = self.total();
            self.switch_phase();
            info!(%completed, next = %self.phase, "phase completed");
            return Some(Event::PhaseCompleted {
                completed,
                duration,
                next: self.phase,
                remaining: self.remaining,
                at: Utc::now(),
            });
        }
        Some(Event::Ticked {
            phase: self.phase,
            remaining: self.remaining,
            at: Utc::now(),
        })
    }

    /// Abandon the current phase and land paused at the start of the next.
    pub fn skip(&mut self) -> Option<Event> {
        let skipped = self.phase;
        self.switch_phase();
        info!(%skipped, next = %self.phase, "phase skipped");
        Some(Event::PhaseSkipped {
            skipped,
            next: self.phase,
            remaining: self.remaining,
            at: Utc::now(),
        })
    }

    /// Back to Work-Paused with a full work phase.
    pub fn reset(&mut self) -> Option<Event> {
        self.phase = Phase::Work;
        self.remaining = self.work_duration;
        self.is_running = false;
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Adopt new phase durations, keeping the phase and running flag.
    ///
    /// The countdown is clamped to the new length of the current phase so
    /// progress never exceeds 1.
    ///
    /// # Errors
    /// Returns an error if either phase duration is zero.
    pub fn apply_config(&mut self, config: &TimerConfig) -> Result<(), ValidationError> {
        config.validate()?;
        self.work_duration = config.work_duration;
        self.rest_duration = config.rest_duration;
        self.remaining = self.remaining.clamp(1, self.total());
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn switch_phase(&mut self) {
        self.phase = self.phase.next();
        self.remaining = self.total();
        self.is_running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn session() -> Session {
        Session::new(&TimerConfig::default()).unwrap()
    }

    fn run_ticks(session: &mut Session, n: u64) -> Vec<Event> {
        (0..n).filter_map(|_| session.tick()).collect()
    }

    #[test]
    fn starts_in_work_paused() {
        let s = session();
        assert_eq!(s.phase(), Phase::Work);
        assert_eq!(s.remaining(), 25);
        assert!(!s.is_running());
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn rejects_zero_duration() {
        let cfg = TimerConfig {
            work_duration: 0,
            ..TimerConfig::default()
        };
        assert!(Session::new(&cfg).is_err());
    }

    #[test]
    fn work_expires_into_rest_paused() {
        let mut s = session();
        s.start();
        let events = run_ticks(&mut s, 25);
        assert_eq!(s.phase(), Phase::Rest);
        assert_eq!(s.remaining(), 10);
        assert!(!s.is_running());
        assert!(matches!(
            events.last(),
            Some(Event::PhaseCompleted {
                completed: Phase::Work,
                duration: 25,
                next: Phase::Rest,
                remaining: 10,
                ..
            })
        ));
    }

    #[test]
    fn one_tick_short_of_expiry_stays_in_phase() {
        let mut s = session();
        s.start();
        run_ticks(&mut s, 24);
        assert_eq!(s.phase(), Phase::Work);
        assert_eq!(s.remaining(), 1);
        assert!(s.is_running());
    }

    #[test]
    fn rest_expires_into_work_paused() {
        let mut s = session();
        s.skip();
        assert_eq!(s.phase(), Phase::Rest);
        s.start();
        run_ticks(&mut s, 10);
        assert_eq!(s.phase(), Phase::Work);
        assert_eq!(s.remaining(), 25);
        assert!(!s.is_running());
    }

    #[test]
    fn round_trip_restores_work_duration() {
        let mut s = session();
        s.start();
        run_ticks(&mut s, 25);
        s.start();
        run_ticks(&mut s, 10);
        assert_eq!(s.phase(), Phase::Work);
        assert_eq!(s.remaining(), 25);
        assert_eq!(s.work_duration(), 25);
    }

    #[test]
    fn ticks_while_paused_change_nothing() {
        let mut s = session();
        s.start();
        run_ticks(&mut s, 3);
        s.pause();
        let before = s.clone();
        assert!(run_ticks(&mut s, 100).is_empty());
        assert_eq!(s, before);
    }

    #[test]
    fn ticks_after_expiry_are_ignored_until_restart() {
        let mut s = session();
        s.start();
        run_ticks(&mut s, 25);
        assert!(s.tick().is_none());
        assert_eq!(s.remaining(), 10);
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut s = session();
        assert!(s.pause().is_none());
        assert!(s.start().is_some());
        assert!(s.start().is_none());
        assert!(s.is_running());
        assert!(s.pause().is_some());
        assert!(s.pause().is_none());
        assert!(!s.is_running());
    }

    #[test]
    fn toggle_flips_running() {
        let mut s = session();
        assert!(matches!(s.toggle(), Some(Event::TimerStarted { .. })));
        assert!(s.is_running());
        assert!(matches!(s.toggle(), Some(Event::TimerPaused { .. })));
        assert!(!s.is_running());
    }

    #[test]
    fn pause_resumes_from_stored_remaining() {
        let mut s = session();
        s.start();
        run_ticks(&mut s, 5);
        s.pause();
        s.start();
        s.tick();
        assert_eq!(s.remaining(), 19);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut s = session();
        s.skip();
        s.start();
        s.tick();
        s.reset();
        assert_eq!(s, session());
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let cfg = TimerConfig {
            work_duration: 4,
            ..TimerConfig::default()
        };
        let mut s = Session::new(&cfg).unwrap();
        s.start();
        s.tick();
        assert!((s.progress() - 0.25).abs() < f64::EPSILON);
        s.tick();
        assert!((s.progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_config_clamps_remaining() {
        let mut s = session();
        let cfg = TimerConfig {
            work_duration: 5,
            rest_duration: 3,
            ..TimerConfig::default()
        };
        s.apply_config(&cfg).unwrap();
        assert_eq!(s.remaining(), 5);
        assert_eq!(s.rest_duration(), 3);
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn snapshot_reflects_state() {
        let s = session();
        match s.snapshot() {
            Event::StateSnapshot {
                phase,
                remaining,
                total,
                is_running,
                ..
            } => {
                assert_eq!(phase, Phase::Work);
                assert_eq!(remaining, 25);
                assert_eq!(total, 25);
                assert!(!is_running);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Start,
        Pause,
        Toggle,
        Tick,
        Skip,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            1 => Just(Op::Start),
            1 => Just(Op::Pause),
            1 => Just(Op::Toggle),
            8 => Just(Op::Tick),
            1 => Just(Op::Skip),
        ]
    }

    proptest! {
        #[test]
        fn remaining_stays_within_phase(
            work in 1u64..40,
            rest in 1u64..20,
            ops in proptest::collection::vec(op(), 0..300),
        ) {
            let cfg = TimerConfig { work_duration: work, rest_duration: rest, ..TimerConfig::default() };
            let mut s = Session::new(&cfg).unwrap();
            for op in ops {
                let was_running = s.is_running();
                let phase = s.phase();
                let event = match &op {
                    Op::Start => s.start(),
                    Op::Pause => s.pause(),
                    Op::Toggle => s.toggle(),
                    Op::Tick => s.tick(),
                    Op::Skip => s.skip(),
                };
                prop_assert!(s.remaining() >= 1);
                prop_assert!(s.remaining() <= s.total());
                prop_assert!((0.0..=1.0).contains(&s.progress()));
                if let Some(ev) = event {
                    if ev.is_phase_change() {
                        prop_assert_ne!(s.phase(), phase);
                        prop_assert!(!s.is_running());
                        prop_assert_eq!(s.remaining(), s.total());
                    }
                } else if matches!(op, Op::Tick) {
                    prop_assert!(!was_running);
                }
            }
        }
    }
}
