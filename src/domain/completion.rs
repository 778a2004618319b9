/// CompletionEvent entity and completion-date normalization
///
/// A CompletionEvent records that a habit was performed on a calendar date.
/// Events are append-only: they are never mutated and never individually
/// deleted by users (deleting the habit cascades them away).
///
/// The store does not enforce uniqueness per (habit, date): several rows
/// for the same day are legal, and aggregations that need day granularity
/// deduplicate by date themselves.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{DomainError, HabitId};

/// A record of completing a habit on a specific calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Unique identifier for this event
    pub id: i64,
    /// Which habit was completed
    pub habit_id: HabitId,
    /// Which calendar day the completion counts for
    pub date: NaiveDate,
    /// Wall-clock time the completion was recorded; informational only,
    /// aggregation works purely on `date`
    pub completed_at: DateTime<Utc>,
}

impl CompletionEvent {
    /// Create an event from existing data (used when loading from the database)
    pub fn from_existing(
        id: i64,
        habit_id: HabitId,
        date: NaiveDate,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            habit_id,
            date,
            completed_at,
        }
    }
}

/// Normalize an externally supplied completion date
///
/// Request payloads arrive in a few shapes: absent (meaning "today"), a
/// plain `YYYY-MM-DD`, or a full ISO timestamp with a `T` separator. This
/// is the single parsing point that turns all of them into a strict
/// `NaiveDate` so nothing downstream has to care about input shape.
pub fn normalize_completion_date(
    input: Option<&str>,
    today: NaiveDate,
) -> Result<NaiveDate, DomainError> {
    let raw = match input {
        None => return Ok(today),
        Some(s) => s.trim(),
    };

    if raw.is_empty() {
        return Ok(today);
    }

    // Full ISO timestamps carry the date up to the 'T'
    let date_part = match raw.split_once('T') {
        Some((date, _)) => date,
        None => raw,
    };

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(format!("Unrecognized date: {}", raw)))
}
