/// Habit CRUD handlers
///
/// All operations are scoped to the requesting user: reads only return
/// their own habits, and mutations on someone else's habit report
/// NotFound rather than leaking its existence. Validation happens before
/// any write.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::domain::{Category, Frequency, Habit, HabitId, UserId};
use crate::storage::{CompletionStore, HabitRegistry};
use crate::ServiceError;

/// Parameters for creating a habit
#[derive(Debug, Deserialize)]
pub struct CreateHabitParams {
    pub name: String,
    pub category: String,
    pub frequency: String,
}

/// Parameters for updating a habit
#[derive(Debug, Deserialize)]
pub struct UpdateHabitParams {
    pub name: String,
    pub category: String,
    pub frequency: String,
}

/// A habit joined with its completion dates, as the habit list shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitWithDates {
    #[serde(flatten)]
    pub habit: Habit,
    /// Every completion date, ascending; may repeat when a day was
    /// completed more than once
    pub completed_dates: Vec<NaiveDate>,
}

/// Create a habit for the requesting user
pub fn create_habit<S: HabitRegistry>(
    store: &S,
    user_id: UserId,
    params: CreateHabitParams,
) -> Result<Habit, ServiceError> {
    Habit::validate_name(&params.name)?;
    let category = Category::parse(&params.category)?;
    let frequency = Frequency::parse(&params.frequency)?;

    let habit = store.create_habit(user_id, &params.name, category, frequency)?;
    Ok(habit)
}

/// List the user's habits, each with its completion dates
pub fn list_habits<S: HabitRegistry + CompletionStore>(
    store: &S,
    user_id: UserId,
) -> Result<Vec<HabitWithDates>, ServiceError> {
    let habits = store.list_habits(user_id)?;

    let mut listed = Vec::with_capacity(habits.len());
    for habit in habits {
        let completed_dates = store.completed_dates(habit.id)?;
        listed.push(HabitWithDates {
            habit,
            completed_dates,
        });
    }

    Ok(listed)
}

/// Update name, category and frequency of one of the user's habits
pub fn update_habit<S: HabitRegistry>(
    store: &S,
    user_id: UserId,
    habit_id: HabitId,
    params: UpdateHabitParams,
) -> Result<Habit, ServiceError> {
    owned_habit(store, user_id, habit_id)?;

    Habit::validate_name(&params.name)?;
    let category = Category::parse(&params.category)?;
    let frequency = Frequency::parse(&params.frequency)?;

    store.update_habit(habit_id, &params.name, category, frequency)?;

    store
        .get_habit(habit_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("Habit {} not found", habit_id)))
}

/// Delete one of the user's habits; completions cascade away with it
pub fn delete_habit<S: HabitRegistry>(
    store: &S,
    user_id: UserId,
    habit_id: HabitId,
) -> Result<(), ServiceError> {
    owned_habit(store, user_id, habit_id)?;
    store.delete_habit(habit_id)?;
    Ok(())
}

/// Fetch a habit and verify ownership, reporting NotFound otherwise
fn owned_habit<S: HabitRegistry>(
    store: &S,
    user_id: UserId,
    habit_id: HabitId,
) -> Result<Habit, ServiceError> {
    store
        .get_habit(habit_id)?
        .filter(|h| h.user_id == user_id)
        .ok_or_else(|| ServiceError::NotFound(format!("Habit {} not found", habit_id)))
}
