use clap::Subcommand;
use pomotimer_core::{Config, Database, Event, Frame, Session};
use tracing::warn;

const SESSION_KEY: &str = "session";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown (no-op if already running)
    Start,
    /// Pause the countdown (no-op if not running)
    Pause,
    /// Start if paused, pause if running
    Toggle,
    /// Advance the countdown by whole ticks
    Tick {
        #[arg(long, default_value = "1")]
        count: u64,
    },
    /// Abandon the current phase and move to the next one
    Skip,
    /// Back to the start of a work phase
    Reset,
    /// Print the current state as JSON
    Status {
        /// Print the presentation frame instead of the raw snapshot
        #[arg(long)]
        frame: bool,
    },
}

/// Restore the saved session, adopting the current timer settings.
/// Falls back to a fresh session when nothing usable is stored.
pub(crate) fn load_session(
    db: &Database,
    config: &Config,
) -> Result<Session, Box<dyn std::error::Error>> {
    if let Some(json) = db.kv_get(SESSION_KEY)? {
        match serde_json::from_str::<Session>(&json) {
            Ok(mut session) => {
                session.apply_config(&config.timer)?;
                return Ok(session);
            }
            Err(e) => warn!("discarding unreadable saved session: {e}"),
        }
    }
    Ok(Session::new(&config.timer)?)
}

pub(crate) fn save_session(
    db: &Database,
    session: &Session,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(session)?;
    db.kv_set(SESSION_KEY, &json)?;
    Ok(())
}

/// Store completed phases in the history table.
pub(crate) fn record(db: &Database, event: &Event) {
    if let Event::PhaseCompleted {
        completed,
        duration,
        at,
        ..
    } = event
    {
        if let Err(e) = db.record_phase(*completed, *duration, *at) {
            warn!("failed to record completed {completed} phase: {e}");
        }
    }
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut session = load_session(&db, &config)?;

    let outcome = match action {
        TimerAction::Start => session.start(),
        TimerAction::Pause => session.pause(),
        TimerAction::Toggle => session.toggle(),
        TimerAction::Skip => session.skip(),
        TimerAction::Reset => session.reset(),
        TimerAction::Tick { count } => {
            for _ in 0..count {
                let Some(event) = session.tick() else {
                    break;
                };
                if event.is_phase_change() {
                    record(&db, &event);
                    print_event(&event)?;
                }
            }
            None
        }
        TimerAction::Status { frame } => {
            if frame {
                let frame = Frame::from_session(&session, &config.labels);
                println!("{}", serde_json::to_string(&frame)?);
                return Ok(());
            }
            None
        }
    };

    if let Some(event) = outcome {
        print_event(&event)?;
    }
    print_event(&session.snapshot())?;

    save_session(&db, &session)?;
    Ok(())
}
