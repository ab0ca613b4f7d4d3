//! View data handed to the presentation layer.
//!
//! The core never draws anything. After every state change it builds a
//! [`Frame`] and passes it to a [`Presenter`], which owns the actual
//! rendering (terminal line, progress ring, tray icon, ...).

use serde::{Deserialize, Serialize};

use crate::timer::{Phase, Session};

/// Display text for each phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseLabels {
    #[serde(default = "default_work_label")]
    pub work: String,
    #[serde(default = "default_rest_label")]
    pub rest: String,
}

fn default_work_label() -> String {
    "Work".into()
}
fn default_rest_label() -> String {
    "Rest".into()
}

impl Default for PhaseLabels {
    fn default() -> Self {
        Self {
            work: default_work_label(),
            rest: default_rest_label(),
        }
    }
}

impl PhaseLabels {
    pub fn label(&self, phase: Phase) -> &str {
        match phase {
            Phase::Work => &self.work,
            Phase::Rest => &self.rest,
        }
    }
}

/// Everything a presentation layer needs to draw one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub phase: Phase,
    pub phase_label: String,
    /// `MM:SS`
    pub time_text: String,
    /// 0.0 .. 1.0, how much of the phase has elapsed.
    pub progress_fraction: f64,
    pub is_running: bool,
}

impl Frame {
    pub fn from_session(session: &Session, labels: &PhaseLabels) -> Self {
        Self {
            phase: session.phase(),
            phase_label: labels.label(session.phase()).to_string(),
            time_text: format_clock(session.remaining()),
            progress_fraction: session.progress(),
            is_running: session.is_running(),
        }
    }
}

/// Format a tick count as `MM:SS`. Minutes wrap at one hour.
pub fn format_clock(ticks: u64) -> String {
    format!("{:02}:{:02}", ticks / 60 % 60, ticks % 60)
}

/// Receives a frame on every tick and on every start, pause or phase change.
pub trait Presenter: Send {
    fn render(&mut self, frame: &Frame);
}

impl<F> Presenter for F
where
    F: FnMut(&Frame) + Send,
{
    fn render(&mut self, frame: &Frame) {
        self(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerConfig;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(25), "00:25");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(3600 + 5), "00:05");
    }

    #[test]
    fn frame_for_fresh_session() {
        let session = Session::new(&TimerConfig::default()).unwrap();
        let frame = Frame::from_session(&session, &PhaseLabels::default());
        assert_eq!(frame.phase_label, "Work");
        assert_eq!(frame.time_text, "00:25");
        assert_eq!(frame.progress_fraction, 0.0);
        assert!(!frame.is_running);
    }

    #[test]
    fn frame_uses_custom_labels() {
        let mut session = Session::new(&TimerConfig::default()).unwrap();
        session.skip();
        let labels = PhaseLabels {
            work: "Работа".into(),
            rest: "Отдых".into(),
        };
        let frame = Frame::from_session(&session, &labels);
        assert_eq!(frame.phase_label, "Отдых");
        assert_eq!(frame.time_text, "00:10");
    }

    #[test]
    fn closures_are_presenters() {
        let mut seen = Vec::new();
        {
            let mut presenter = |frame: &Frame| seen.push(frame.time_text.clone());
            let session = Session::new(&TimerConfig::default()).unwrap();
            presenter.render(&Frame::from_session(&session, &PhaseLabels::default()));
        }
        assert_eq!(seen, vec!["00:25".to_string()]);
    }
}
