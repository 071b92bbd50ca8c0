//! Committed time blocks on today's calendar.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Rough energy demand of a block or suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
    Low,
    Medium,
    High,
}

impl Default for Energy {
    fn default() -> Self {
        Energy::Medium
    }
}

/// A concrete commitment on the day: something that occupies `[start, end)`.
///
/// Blocks are half-open intervals; a block ending at 09:30 does not
/// conflict with one starting at 09:30.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Start timestamp
    pub start_time: DateTime<Utc>,
    /// Duration in minutes (end time is derived)
    pub duration_minutes: u32,
    /// Energy demand
    #[serde(default)]
    pub energy: Energy,
    /// Display emoji
    pub emoji: Option<String>,
    /// Weak backlink to the pillar this block satisfies, if any
    pub pillar_id: Option<String>,
}

impl TimeBlock {
    /// Create a block with a fresh id.
    pub fn new(title: impl Into<String>, start_time: DateTime<Utc>, duration_minutes: u32) -> Self {
        TimeBlock {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            start_time,
            duration_minutes,
            energy: Energy::Medium,
            emoji: None,
            pillar_id: None,
        }
    }

    pub fn with_energy(mut self, energy: Energy) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_pillar(mut self, pillar_id: impl Into<String>) -> Self {
        self.pillar_id = Some(pillar_id.into());
        self
    }

    /// Derived end timestamp.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Half-open overlap with `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time()
    }
}
