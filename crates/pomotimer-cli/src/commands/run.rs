use std::io::Write;

use clap::Args;
use pomotimer_core::{Config, Database, Driver, Event, Frame, Presenter};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use super::timer::{load_session, record, save_session};

const BAR_WIDTH: usize = 24;

#[derive(Args)]
pub struct RunArgs {
    /// Work phase length in ticks (overrides config for this run)
    #[arg(long)]
    work: Option<u64>,
    /// Rest phase length in ticks (overrides config for this run)
    #[arg(long)]
    rest: Option<u64>,
    /// Milliseconds between ticks (overrides config for this run)
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Start from a fresh work phase instead of the saved session
    #[arg(long)]
    fresh: bool,
    /// Do not record completed phases in the history
    #[arg(long)]
    no_history: bool,
}

/// Draws each frame on a single, rewritten terminal line.
struct TerminalPresenter {
    out: std::io::Stdout,
}

impl TerminalPresenter {
    fn new() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn render_line(frame: &Frame) -> String {
    let icon = if frame.is_running { "||" } else { "> " };
    format!(
        "{:<8} {}  [{}] {}",
        frame.phase_label,
        frame.time_text,
        progress_bar(frame.progress_fraction),
        icon
    )
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, frame: &Frame) {
        let mut out = self.out.lock();
        let _ = write!(out, "\r\x1b[2K{}", render_line(frame));
        let _ = out.flush();
    }
}

/// Rings the terminal bell on a completed phase and records it.
fn on_event(db: &Database, event: &Event, keep_history: bool, out: &mut impl Write) {
    if let Event::PhaseCompleted { completed, next, .. } = event {
        info!(%completed, %next, "phase completed");
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
        if keep_history {
            record(db, event);
        }
    }
}

fn drain_events(db: &Database, events: &mut UnboundedReceiver<Event>, keep_history: bool) {
    while let Ok(event) = events.try_recv() {
        if keep_history {
            record(db, &event);
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(work) = args.work {
        config.timer.work_duration = work;
    }
    if let Some(rest) = args.rest {
        config.timer.rest_duration = rest;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.timer.tick_interval_ms = tick_ms;
    }
    config.timer.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_loop(config, args.fresh, !args.no_history))
}

async fn run_loop(
    config: Config,
    fresh: bool,
    keep_history: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut session = load_session(&db, &config)?;
    if fresh {
        session.reset();
    }
    // A session saved mid-run resumes paused.
    session.pause();

    let (mut driver, mut events) = Driver::new(
        session,
        config.timer.tick_interval(),
        config.labels.clone(),
        Box::new(TerminalPresenter::new()),
    );

    eprintln!("enter: start/pause   s: skip   r: reset   q: quit");
    driver.render().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match line.trim() {
                    "" | "t" => {
                        driver.toggle().await;
                    }
                    "s" => {
                        driver.skip().await;
                    }
                    "r" => {
                        driver.reset().await;
                    }
                    "q" => break,
                    other => warn!(input = other, "unknown command"),
                }
            }
            Some(event) = events.recv() => {
                on_event(&db, &event, keep_history, &mut std::io::stdout());
            }
        }
    }

    driver.shutdown();
    // A phase that completed while the quit was being read is still queued.
    drain_events(&db, &mut events, keep_history);
    driver.pause().await;
    println!();
    save_session(&db, &driver.session().await)?;
    Ok(())
}
