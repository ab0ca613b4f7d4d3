mod config;
mod phase;
mod session;

pub use config::TimerConfig;
pub use phase::Phase;
pub use session::Session;
