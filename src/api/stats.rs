/// User statistics handlers
///
/// Payloads for the profile header and the statistics page: points and
/// level from the ledger, habit and completion totals, the 30-day
/// success rate, streak figures, earned badges and the category view.

use serde::Serialize;
use chrono::{Duration, NaiveDate};

use crate::analytics::{percentage, AnalyticsEngine, CategoryStats};
use crate::domain::{Badge, UserId};
use crate::storage::{BadgeStore, CompletionStore, HabitRegistry, LedgerStore, UserStore};
use crate::ServiceError;

/// Days of history behind the "overall success rate" figure
const SUCCESS_RATE_WINDOW_DAYS: i64 = 30;

/// The comprehensive per-user statistics payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStatsPayload {
    pub total_points: i64,
    pub level: i64,
    pub total_habits: u32,
    pub total_completions: u64,
    /// Completions over the trailing 30 days as a percentage of
    /// attempted slots (habits x 30)
    pub overall_success_rate: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Build the comprehensive statistics payload for a user
pub fn get_user_stats<S>(
    store: &S,
    analytics: &AnalyticsEngine,
    user_id: UserId,
    today: NaiveDate,
) -> Result<UserStatsPayload, ServiceError>
where
    S: UserStore + HabitRegistry + CompletionStore + LedgerStore,
{
    store
        .get_user(user_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

    let ledger = store.ledger(user_id)?;
    let habits = store.list_habits(user_id)?;
    let total_completions = store.user_completion_count(user_id)?;

    let window_start = today - Duration::days(SUCCESS_RATE_WINDOW_DAYS - 1);
    let recent = store.user_completions_in_range(user_id, window_start, today)?;
    let attempted = habits.len() as u64 * SUCCESS_RATE_WINDOW_DAYS as u64;
    let overall_success_rate = percentage(recent.len() as u32, attempted);

    let all_events = store.user_completions(user_id)?;
    let streaks = analytics.compute_streaks(&all_events, today);

    Ok(UserStatsPayload {
        total_points: ledger.total_points,
        level: ledger.level,
        total_habits: habits.len() as u32,
        total_completions,
        overall_success_rate,
        current_streak: streaks.current,
        longest_streak: streaks.longest,
    })
}

/// Category statistics over the trailing 30 days
pub fn get_category_stats<S>(
    store: &S,
    analytics: &AnalyticsEngine,
    user_id: UserId,
    today: NaiveDate,
) -> Result<Vec<CategoryStats>, ServiceError>
where
    S: HabitRegistry + CompletionStore,
{
    let habits = store.list_habits(user_id)?;
    let window_start = today - Duration::days(SUCCESS_RATE_WINDOW_DAYS - 1);
    let events = store.user_completions_in_range(user_id, window_start, today)?;

    Ok(analytics.compute_category_stats(&habits, &events, SUCCESS_RATE_WINDOW_DAYS as u32))
}

/// All badges earned by the user, newest first
pub fn get_user_badges<S: BadgeStore>(
    store: &S,
    user_id: UserId,
) -> Result<Vec<Badge>, ServiceError> {
    Ok(store.badges(user_id)?)
}
