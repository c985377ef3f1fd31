//! Ordered session history, newest first.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::session::SessionRecord;

/// The full log of recorded sessions.
///
/// Serializes as a plain JSON array so the persisted slot stays readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<SessionRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from records already ordered newest first.
    pub fn from_records(records: Vec<SessionRecord>) -> Self {
        Self { records }
    }

    /// Record a newly completed session at the front.
    pub fn append(&mut self, record: SessionRecord) {
        self.records.insert(0, record);
    }

    /// Remove the record at `index` (0 is the newest).
    pub fn remove_at(&mut self, index: usize) -> Result<SessionRecord> {
        if index >= self.records.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "history".into(),
                index,
                len: self.records.len(),
            }
            .into());
        }
        Ok(self.records.remove(index))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of worked minutes across every record.
    pub fn total_minutes(&self) -> u64 {
        self.records
            .iter()
            .map(|r| u64::from(r.duration_minutes()))
            .sum()
    }
}
