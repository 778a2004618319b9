/// Analytics, leaderboard and calendar handlers
///
/// Thin orchestration over the analytics engine: fetch the user's habits
/// and the relevant completion events, run the pure computation, shape
/// the payload the front end renders.

use serde::Serialize;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::analytics::{
    AnalyticsEngine, AnalyticsSummary, CalendarBucket, HabitCompletionCount, Period,
};
use crate::domain::{Habit, UserId};
use crate::storage::{CompletionStore, HabitRegistry};
use crate::ServiceError;

/// Monthly leaderboard payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyLeaderboardPayload {
    pub year: i32,
    pub month: u32,
    pub most_completed: Vec<HabitCompletionCount>,
}

/// Calendar payload: day buckets plus the habit definitions the UI
/// cross-references them against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarPayload {
    pub year: i32,
    pub month: u32,
    pub calendar_data: BTreeMap<NaiveDate, CalendarBucket>,
    pub habits: Vec<Habit>,
}

/// Analytics summary for a lookback period given as `7d|30d|90d|1y`
pub fn get_analytics<S>(
    store: &S,
    analytics: &AnalyticsEngine,
    user_id: UserId,
    period: &str,
    today: NaiveDate,
) -> Result<AnalyticsSummary, ServiceError>
where
    S: HabitRegistry + CompletionStore,
{
    let period: Period = period.parse()?;

    let habits = store.list_habits(user_id)?;
    let window_start = today - Duration::days(period.days() - 1);
    let events = store.user_completions_in_range(user_id, window_start, today)?;

    Ok(analytics.compute_summary(&habits, &events, period, today))
}

/// This month's most completed habits
pub fn get_monthly_leaderboard<S>(
    store: &S,
    analytics: &AnalyticsEngine,
    user_id: UserId,
    year: i32,
    month: u32,
) -> Result<MonthlyLeaderboardPayload, ServiceError>
where
    S: HabitRegistry + CompletionStore,
{
    let habits = store.list_habits(user_id)?;
    let events = store.user_completions(user_id)?;

    let most_completed = analytics.compute_monthly_leaderboard(&habits, &events, year, month)?;

    Ok(MonthlyLeaderboardPayload {
        year,
        month,
        most_completed,
    })
}

/// Calendar data for one month
pub fn get_calendar<S>(
    store: &S,
    analytics: &AnalyticsEngine,
    user_id: UserId,
    year: i32,
    month: u32,
) -> Result<CalendarPayload, ServiceError>
where
    S: HabitRegistry + CompletionStore,
{
    let habits = store.list_habits(user_id)?;
    let events = store.user_completions(user_id)?;

    let calendar_data = analytics.compute_calendar_buckets(&habits, &events, year, month)?;

    Ok(CalendarPayload {
        year,
        month,
        calendar_data,
        habits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Frequency};
    use crate::storage::{SqliteStorage, UserStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (SqliteStorage, UserId) {
        let storage = SqliteStorage::in_memory().unwrap();
        let user = storage.create_user("alice", "alice@example.com").unwrap();
        (storage, user.id)
    }

    #[test]
    fn test_unsupported_period_rejected() {
        let (storage, user_id) = setup();
        let result = get_analytics(
            &storage,
            &AnalyticsEngine::new(),
            user_id,
            "14d",
            date(2024, 3, 15),
        );
        assert!(matches!(result, Err(ServiceError::Analytics(_))));
    }

    #[test]
    fn test_analytics_payload_for_active_user() {
        let (storage, user_id) = setup();
        let habit = storage
            .create_habit(user_id, "Run", Category::Sport, Frequency::Daily)
            .unwrap();
        let today = date(2024, 3, 15);

        for day in 13..=15 {
            storage.insert_completion(habit.id, date(2024, 3, day)).unwrap();
        }

        let summary =
            get_analytics(&storage, &AnalyticsEngine::new(), user_id, "7d", today).unwrap();
        assert_eq!(summary.period, Period::Week);
        assert_eq!(summary.total_completions, 3);
        assert_eq!(summary.streak_data.current, 3);
        assert_eq!(summary.top_habits[0].name, "Run");
    }

    #[test]
    fn test_calendar_round_trip() {
        let (storage, user_id) = setup();
        let habit = storage
            .create_habit(user_id, "Run", Category::Sport, Frequency::Daily)
            .unwrap();

        for day in 1..=5 {
            storage.insert_completion(habit.id, date(2024, 3, day)).unwrap();
        }

        let payload =
            get_calendar(&storage, &AnalyticsEngine::new(), user_id, 2024, 3).unwrap();
        assert_eq!(payload.calendar_data.len(), 5);
        assert!(payload.calendar_data.values().all(|b| b.count == 1));
        assert_eq!(payload.habits.len(), 1);
    }

    #[test]
    fn test_leaderboard_payload_carries_month() {
        let (storage, user_id) = setup();
        let habit = storage
            .create_habit(user_id, "Run", Category::Sport, Frequency::Daily)
            .unwrap();
        storage.insert_completion(habit.id, date(2024, 3, 1)).unwrap();

        let payload =
            get_monthly_leaderboard(&storage, &AnalyticsEngine::new(), user_id, 2024, 3).unwrap();
        assert_eq!(payload.year, 2024);
        assert_eq!(payload.month, 3);
        assert_eq!(payload.most_completed.len(), 1);
    }
}
