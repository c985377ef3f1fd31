//! The session record: one finished focus interval.
//!
//! Records are immutable once created. Corrections are modeled as removing
//! the record from the history and appending a new one.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Label used when a session is recorded without a usable task name.
pub const UNTITLED_TASK: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default = "untitled", deserialize_with = "deserialize_task")]
    task: String,
    /// Minutes actually worked, not the planned duration.
    duration_minutes: u32,
    /// Whole minutes left on the clock when the session ended early.
    #[serde(default)]
    saved_minutes: u32,
    /// When the session ended.
    timestamp: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        task: &str,
        duration_minutes: u32,
        saved_minutes: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            task: normalize_task(task),
            duration_minutes,
            saved_minutes,
            timestamp,
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn saved_minutes(&self) -> u32 {
        self.saved_minutes
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Calendar date of the session in the given time zone.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.timestamp.with_timezone(tz).date_naive()
    }

    /// True when the session was ended early with at least one whole minute to spare.
    pub fn is_partial(&self) -> bool {
        self.saved_minutes > 0
    }
}

fn normalize_task(task: &str) -> String {
    let trimmed = task.trim();
    if trimmed.is_empty() {
        untitled()
    } else {
        trimmed.to_string()
    }
}

fn untitled() -> String {
    UNTITLED_TASK.to_string()
}

fn deserialize_task<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_task(raw.as_deref().unwrap_or_default()))
}
