/// Reward and aggregation rules exercised through the public interface
use habit_tracker_core::*;
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (SqliteStorage, UserId, HabitId) {
    let storage = SqliteStorage::in_memory().expect("Failed to open in-memory database");
    let user = storage
        .create_user("alice", "alice@example.com")
        .expect("Failed to create user");
    let habit = storage
        .create_habit(user.id, "Run", Category::Sport, Frequency::Daily)
        .expect("Failed to create habit");
    (storage, user.id, habit.id)
}

#[cfg(test)]
mod reward_rules {
    use super::*;

    #[test]
    fn test_one_point_per_completion_and_level_law() {
        let (storage, user_id, habit_id) = setup();
        let engine = PointsEngine::new();

        for n in 1..=25i64 {
            let day = date(2024, 1, 1) + chrono::Duration::days(2 * n);
            let result = engine
                .record_completion(&storage, user_id, habit_id, day)
                .unwrap();
            assert_eq!(result.ledger.total_points, n);
            assert_eq!(result.ledger.level, n / 10 + 1);
        }
    }

    #[test]
    fn test_badges_reported_only_on_the_crossing_call() {
        let (storage, user_id, habit_id) = setup();
        let engine = PointsEngine::new();

        let mut reported = Vec::new();
        for day in 1..=10 {
            let result = engine
                .record_completion(&storage, user_id, habit_id, date(2024, 3, day))
                .unwrap();
            for badge in result.badges_awarded {
                reported.push((day, badge));
            }
        }

        // Exactly one grant, on the seventh consecutive day
        assert_eq!(reported, vec![(7, "7-day streak".to_string())]);
        assert_eq!(storage.badges(user_id).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_dates_count_rows_but_not_streaks() {
        let (storage, user_id, habit_id) = setup();
        let engine = PointsEngine::new();

        for _ in 0..3 {
            engine
                .record_completion(&storage, user_id, habit_id, date(2024, 3, 1))
                .unwrap();
        }

        // Row-counting views see three events
        assert_eq!(storage.completed_dates(habit_id).unwrap().len(), 3);
        assert_eq!(storage.user_completion_count(user_id).unwrap(), 3);
        assert_eq!(storage.ledger(user_id).unwrap().total_points, 3);

        // Streaks work on distinct dates
        let events = storage.user_completions(user_id).unwrap();
        let streaks = AnalyticsEngine::new().compute_streaks(&events, date(2024, 3, 1));
        assert_eq!(streaks.longest, 1);
    }
}

#[cfg(test)]
mod aggregation_rules {
    use super::*;

    #[test]
    fn test_calendar_reflects_recorded_completions() {
        let (storage, user_id, habit_id) = setup();
        let engine = PointsEngine::new();

        for day in 1..=5 {
            engine
                .record_completion(&storage, user_id, habit_id, date(2024, 3, day))
                .unwrap();
        }

        let payload = get_calendar(&storage, &AnalyticsEngine::new(), user_id, 2024, 3).unwrap();
        assert_eq!(payload.calendar_data.len(), 5);
        for day in 1..=5 {
            let bucket = &payload.calendar_data[&date(2024, 3, day)];
            assert_eq!(bucket.count, 1);
            assert_eq!(bucket.habits, vec!["Run"]);
            assert_eq!(bucket.categories, vec!["sport"]);
        }
    }

    #[test]
    fn test_deleting_a_habit_cascades_its_events() {
        let (storage, user_id, habit_id) = setup();
        let engine = PointsEngine::new();

        engine
            .record_completion(&storage, user_id, habit_id, date(2024, 3, 1))
            .unwrap();
        delete_habit(&storage, user_id, habit_id).unwrap();

        assert!(storage.user_completions(user_id).unwrap().is_empty());
        // Already-earned points survive the habit
        assert_eq!(storage.ledger(user_id).unwrap().total_points, 1);
    }

    #[test]
    fn test_stats_streak_needs_recent_activity() {
        let (storage, user_id, habit_id) = setup();
        let engine = PointsEngine::new();

        for day in 1..=4 {
            engine
                .record_completion(&storage, user_id, habit_id, date(2024, 3, day))
                .unwrap();
        }

        // Queried the day after the run ends, it still counts as current
        let fresh =
            get_user_stats(&storage, &AnalyticsEngine::new(), user_id, date(2024, 3, 5)).unwrap();
        assert_eq!(fresh.current_streak, 4);
        assert_eq!(fresh.longest_streak, 4);

        // A week later the run is history, not a current streak
        let stale =
            get_user_stats(&storage, &AnalyticsEngine::new(), user_id, date(2024, 3, 12)).unwrap();
        assert_eq!(stale.current_streak, 0);
        assert_eq!(stale.longest_streak, 4);
    }
}
