/// Handler for the "complete habit" action
///
/// The one endpoint that mutates more than a single row: it normalizes
/// the requested date, then hands off to the points engine for the
/// event append, point increment and badge checks.

use serde::Deserialize;
use chrono::NaiveDate;

use crate::domain::{normalize_completion_date, HabitId, UserId};
use crate::points::{CompletionRecorded, PointsEngine};
use crate::storage::{BadgeStore, CompletionStore, HabitRegistry, LedgerStore};
use crate::ServiceError;

/// Parameters for completing a habit
#[derive(Debug, Default, Deserialize)]
pub struct CompleteHabitParams {
    /// Completion date as `YYYY-MM-DD` or a full ISO timestamp;
    /// defaults to today when absent
    pub date: Option<String>,
}

/// Record a completion for one of the user's habits
pub fn complete_habit<S>(
    store: &S,
    points: &PointsEngine,
    user_id: UserId,
    habit_id: HabitId,
    params: CompleteHabitParams,
    today: NaiveDate,
) -> Result<CompletionRecorded, ServiceError>
where
    S: HabitRegistry + CompletionStore + LedgerStore + BadgeStore,
{
    let date = normalize_completion_date(params.date.as_deref(), today)?;
    points.record_completion(store, user_id, habit_id, date)
}
