mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, PhaseRecord, Stats};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the directory holding `config.toml` and `pomotimer.db`.
///
/// `POMOTIMER_HOME` overrides the location outright. Otherwise this is
/// `~/.config/pomotimer/`, or `~/.config/pomotimer-dev/` when
/// `POMOTIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOTIMER_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POMOTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomotimer-dev")
            } else {
                base_dir.join("pomotimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
