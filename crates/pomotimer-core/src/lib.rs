//! # pomotimer Core Library
//!
//! The work/rest countdown behind pomotimer. The state machine knows
//! nothing about clocks or rendering: a driver feeds it ticks and a
//! presenter draws whatever it reports.
//!
//! ## Architecture
//!
//! - **Session**: Work/Rest × Running/Paused state machine, advanced one
//!   tick at a time by whoever owns it
//! - **Driver**: tokio interval task that ticks a session while it runs
//! - **View**: `Frame` (label, `MM:SS`, progress fraction, running flag)
//!   and the `Presenter` trait that receives it
//! - **Storage**: TOML configuration and SQLite phase history
//!
//! ## Key Components
//!
//! - [`Session`]: Core timer state machine
//! - [`Driver`]: Interval-based tick source
//! - [`Config`]: Application configuration management
//! - [`Database`]: Phase history and statistics

pub mod driver;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;
pub mod view;

pub use driver::Driver;
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use storage::{Config, Database, PhaseRecord, Stats};
pub use timer::{Phase, Session, TimerConfig};
pub use view::{format_clock, Frame, PhaseLabels, Presenter};
