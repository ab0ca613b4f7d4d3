//! SQLite-based phase history and key-value store.
//!
//! Provides persistent storage for:
//! - Completed work and rest phases
//! - Phase statistics (daily and all-time)
//! - Key-value store for application state (the CLI keeps its session here)

use std::path::Path;

use chrono::{DateTime, Local, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::timer::Phase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub id: i64,
    pub phase: Phase,
    /// Length of the phase in ticks.
    pub duration: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub work_phases: u64,
    pub work_ticks: u64,
    pub rest_phases: u64,
    pub rest_ticks: u64,
}

impl Stats {
    fn add(&mut self, phase: Phase, count: u64, ticks: u64) {
        match phase {
            Phase::Work => {
                self.work_phases += count;
                self.work_ticks += ticks;
            }
            Phase::Rest => {
                self.rest_phases += count;
                self.rest_ticks += ticks;
            }
        }
    }
}

/// SQLite database for phase history.
pub struct Database {
    conn: Connection,
}

/// Start of the local calendar day containing `now`, as UTC.
///
/// `completed_at` is stored as UTC RFC 3339, which compares correctly as
/// text against another UTC timestamp.
fn local_day_start(now: DateTime<Local>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN);
    // A DST jump over midnight leaves no local midnight; fall back to the
    // naive time read as UTC.
    midnight
        .and_local_timezone(Local)
        .earliest()
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

impl Database {
    /// Open the database at `~/.config/pomotimer/pomotimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("pomotimer.db"))
    }

    /// # Errors
    /// See [`Database::open`].
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS phases (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                phase        TEXT NOT NULL,
                duration     INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_phases_completed_at ON phases(completed_at);",
        )?;
        Ok(())
    }

    /// Record a phase that ran to completion.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_phase(
        &self,
        phase: Phase,
        duration: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO phases (phase, duration, completed_at) VALUES (?1, ?2, ?3)",
            params![phase.as_str(), duration, completed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent completed phases, newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn recent_phases(&self, limit: usize) -> Result<Vec<PhaseRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phase, duration, completed_at
             FROM phases
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, phase, duration, completed_at) = row?;
            let phase = phase.parse::<Phase>().map_err(DatabaseError::QueryFailed)?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
                .with_timezone(&Utc);
            records.push(PhaseRecord {
                id,
                phase,
                duration,
                completed_at,
            });
        }
        Ok(records)
    }

    /// Stats for phases completed since local midnight, the same day the
    /// history listing shows.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn stats_today(&self) -> Result<Stats, DatabaseError> {
        self.stats_since(&local_day_start(Local::now()).to_rfc3339())
    }

    /// # Errors
    /// Returns an error if the query fails.
    pub fn stats_all(&self) -> Result<Stats, DatabaseError> {
        self.stats_since("")
    }

    fn stats_since(&self, since: &str) -> Result<Stats, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT phase, COUNT(*), COALESCE(SUM(duration), 0)
             FROM phases
             WHERE completed_at >= ?1
             GROUP BY phase",
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        })?;

        let mut stats = Stats::default();
        for row in rows {
            let (phase, count, ticks) = row?;
            if let Ok(phase) = phase.parse::<Phase>() {
                stats.add(phase, count, ticks);
            }
        }
        Ok(stats)
    }

    /// Get a value from the kv store.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
