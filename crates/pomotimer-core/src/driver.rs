//! Tick driver.
//!
//! Owns a [`Session`] and a background ticker task that calls
//! [`Session::tick`] on a fixed interval while the session is running.
//! Pausing aborts the ticker; starting spawns a new one that counts down
//! from the stored remaining time. A phase switch stops the session, and
//! the ticker exits on its own.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::error::ValidationError;
use crate::events::Event;
use crate::timer::{Session, TimerConfig};
use crate::view::{Frame, PhaseLabels, Presenter};

type SharedPresenter = Arc<Mutex<Box<dyn Presenter>>>;

pub struct Driver {
    session: Arc<Mutex<Session>>,
    presenter: SharedPresenter,
    labels: Arc<PhaseLabels>,
    tick_interval: Duration,
    ticker: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<Event>,
}

impl Driver {
    /// Wrap an existing session. Every event the session produces is also
    /// sent on the returned channel.
    pub fn new(
        session: Session,
        tick_interval: Duration,
        labels: PhaseLabels,
        presenter: Box<dyn Presenter>,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let driver = Self {
            session: Arc::new(Mutex::new(session)),
            presenter: Arc::new(Mutex::new(presenter)),
            labels: Arc::new(labels),
            tick_interval,
            ticker: None,
            events,
        };
        (driver, rx)
    }

    /// Build a fresh session from `config` and drive it.
    ///
    /// # Errors
    /// Returns an error if the config has a zero duration or tick interval.
    pub fn from_config(
        config: &TimerConfig,
        labels: PhaseLabels,
        presenter: Box<dyn Presenter>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Event>), ValidationError> {
        let session = Session::new(config)?;
        Ok(Self::new(session, config.tick_interval(), labels, presenter))
    }

    pub async fn session(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub async fn frame(&self) -> Frame {
        Frame::from_session(&*self.session.lock().await, &self.labels)
    }

    /// True while a ticker task is alive.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Push the current state to the presenter without changing it.
    pub async fn render(&self) {
        let frame = self.frame().await;
        self.presenter.lock().await.render(&frame);
    }

    pub async fn start(&mut self) -> Option<Event> {
        self.command(Session::start).await
    }

    pub async fn pause(&mut self) -> Option<Event> {
        self.command(Session::pause).await
    }

    pub async fn toggle(&mut self) -> Option<Event> {
        self.command(Session::toggle).await
    }

    pub async fn skip(&mut self) -> Option<Event> {
        self.command(Session::skip).await
    }

    pub async fn reset(&mut self) -> Option<Event> {
        self.command(Session::reset).await
    }

    /// Stop the ticker without touching the session.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    async fn command(&mut self, op: fn(&mut Session) -> Option<Event>) -> Option<Event> {
        let (event, frame, was_running, running) = {
            let mut session = self.session.lock().await;
            let was_running = session.is_running();
            let event = op(&mut *session);
            let frame = Frame::from_session(&*session, &self.labels);
            (event, frame, was_running, session.is_running())
        };

        // A ticker that just switched phase may still be alive while it
        // renders; it exits without ticking again, so a restart always needs
        // a fresh one.
        if running {
            if !was_running || !self.is_ticking() {
                self.spawn_ticker();
            }
        } else {
            self.shutdown();
        }

        if let Some(ref event) = event {
            self.presenter.lock().await.render(&frame);
            let _ = self.events.send(event.clone());
        }
        event
    }

    fn spawn_ticker(&mut self) {
        self.shutdown();

        let session = self.session.clone();
        let presenter = self.presenter.clone();
        let labels = self.labels.clone();
        let events = self.events.clone();
        let period = self.tick_interval;

        debug!(?period, "spawning ticker");
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;

                let (event, frame) = {
                    let mut guard = session.lock().await;
                    let Some(event) = guard.tick() else {
                        break;
                    };
                    (event, Frame::from_session(&*guard, &labels))
                };
                trace!(time = %frame.time_text, "tick");

                presenter.lock().await.render(&frame);
                let phase_changed = event.is_phase_change();
                let _ = events.send(event);
                if phase_changed {
                    break;
                }
            }
            debug!("ticker stopped");
        });
        self.ticker = Some(handle);
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
