//! SQLite-backed key-value persistence.
//!
//! Provides durable slots for:
//! - The session history (serialized as one JSON array)
//! - The timer engine between CLI invocations
//!
//! Reads never fail hard: missing or corrupt slots degrade to an empty
//! history or a fresh timer.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::history::History;
use crate::timer::TimerEngine;

const HISTORY_KEY: &str = "focus_history";
const TIMER_KEY: &str = "timer_engine";

/// Timer engine plus the wall-clock time it was last saved.
///
/// A driver that restarts while the engine is running advances it by the
/// whole seconds elapsed since `saved_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedTimer {
    pub engine: TimerEngine,
    pub saved_at: DateTime<Utc>,
}

impl PersistedTimer {
    pub fn new(engine: TimerEngine) -> Self {
        Self {
            engine,
            saved_at: Utc::now(),
        }
    }
}

/// SQLite database holding the key-value slots.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/fokus.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("fokus.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Restore the session history. Never fails.
    pub fn load_history(&self) -> History {
        let json = match self.kv_get(HISTORY_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return History::new(),
            Err(e) => {
                warn!(error = %e, "could not read history, starting empty");
                return History::new();
            }
        };
        match serde_json::from_str::<History>(&json) {
            Ok(history) => {
                debug!(sessions = history.len(), "history loaded");
                history
            }
            Err(e) => {
                warn!(error = %e, "stored history is corrupt, starting empty");
                History::new()
            }
        }
    }

    /// Persist the whole history.
    pub fn save_history(&self, history: &History) -> Result<()> {
        let json = serde_json::to_string(history)?;
        self.kv_set(HISTORY_KEY, &json)
    }

    /// Restore the timer, or a fresh idle one with `default_minutes`.
    pub fn load_timer(&self, default_minutes: u32) -> PersistedTimer {
        let fresh = || PersistedTimer::new(TimerEngine::new(default_minutes));
        match self.kv_get(TIMER_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<PersistedTimer>(&json) {
                Ok(timer) if timer.engine.remaining_secs() <= timer.engine.total_secs() => timer,
                Ok(timer) => {
                    warn!(
                        remaining_secs = timer.engine.remaining_secs(),
                        total_secs = timer.engine.total_secs(),
                        "stored timer is corrupt, starting fresh"
                    );
                    fresh()
                }
                Err(e) => {
                    warn!(error = %e, "stored timer is corrupt, starting fresh");
                    fresh()
                }
            },
            Ok(None) => fresh(),
            Err(e) => {
                warn!(error = %e, "could not read timer, starting fresh");
                fresh()
            }
        }
    }

    pub fn save_timer(&self, timer: &PersistedTimer) -> Result<()> {
        let json = serde_json::to_string(timer)?;
        self.kv_set(TIMER_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRecord;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn history_roundtrip() {
        let db = Database::open_memory().unwrap();
        let mut history = History::new();
        history.append(SessionRecord::new("read", 25, 0, Utc::now()));
        history.append(SessionRecord::new("write", 4, 6, Utc::now()));
        db.save_history(&history).unwrap();
        assert_eq!(db.load_history(), history);
    }

    #[test]
    fn missing_history_is_empty() {
        let db = Database::open_memory().unwrap();
        assert!(db.load_history().is_empty());
    }

    #[test]
    fn corrupt_history_degrades_to_empty() {
        let db = Database::open_memory().unwrap();
        db.kv_set(HISTORY_KEY, "{not json").unwrap();
        assert!(db.load_history().is_empty());
    }

    #[test]
    fn timer_with_more_remaining_than_planned_starts_fresh() {
        let db = Database::open_memory().unwrap();
        db.kv_set(
            TIMER_KEY,
            r#"{"engine":{"planned_minutes":1,"remaining_secs":61,"task_label":"x","state":"paused"},"saved_at":"2024-01-01T10:00:00Z"}"#,
        )
        .unwrap();
        let timer = db.load_timer(25);
        assert_eq!(timer.engine, TimerEngine::new(25));
    }

    #[test]
    fn consistent_timer_is_restored() {
        let db = Database::open_memory().unwrap();
        db.kv_set(
            TIMER_KEY,
            r#"{"engine":{"planned_minutes":1,"remaining_secs":60,"task_label":"x","state":"paused"},"saved_at":"2024-01-01T10:00:00Z"}"#,
        )
        .unwrap();
        let timer = db.load_timer(25);
        assert_eq!(timer.engine.planned_minutes(), 1);
        assert_eq!(timer.engine.task_label(), "x");
    }

    #[test]
    fn corrupt_timer_starts_fresh() {
        let db = Database::open_memory().unwrap();
        db.kv_set(TIMER_KEY, "[]").unwrap();
        let timer = db.load_timer(25);
        assert_eq!(timer.engine, TimerEngine::new(25));
    }
}
