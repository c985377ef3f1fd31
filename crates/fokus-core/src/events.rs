use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;
use crate::timer::TimerState;

/// Every state change of the timer produces an Event.
/// The presentation layer reacts to them (sounds, toasts, history appends).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        planned_minutes: u32,
        task_label: String,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    DurationChanged {
        planned_minutes: u32,
        at: DateTime<Utc>,
    },
    /// Start was attempted with a blank task label.
    ValidationFailed {
        at: DateTime<Utc>,
    },
    /// A session finished, naturally or early. The record belongs in history.
    SessionCompleted {
        record: SessionRecord,
        early: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        planned_minutes: u32,
        remaining_secs: u64,
        total_secs: u64,
        clock: String,
        task_label: String,
        validation_error: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The completed session record, if this event carries one.
    pub fn completed_record(&self) -> Option<&SessionRecord> {
        match self {
            Event::SessionCompleted { record, .. } => Some(record),
            _ => None,
        }
    }
}
