/// End-to-end workflow tests against the service façade
use habit_tracker_core::*;
use chrono::NaiveDate;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn test_config(db: &NamedTempFile) -> Config {
    Config::new(db.path().to_path_buf(), "habit_tracker_core=debug")
}

#[cfg(test)]
mod service_workflow {
    use super::*;

    #[tokio::test]
    async fn test_full_user_journey() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let service = HabitTrackerService::new(&test_config(&temp_file))
            .await
            .expect("Failed to create service");
        let storage = service.storage();

        // Register and set up a habit
        let user = register_user(
            storage,
            RegisterUserParams {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .unwrap();

        let habit = create_habit(
            storage,
            user.id,
            CreateHabitParams {
                name: "Morning Run".to_string(),
                category: "sport".to_string(),
                frequency: "daily".to_string(),
            },
        )
        .unwrap();

        // Complete it daily for a week
        let mut last = None;
        for day in 1..=7 {
            let result = complete_habit(
                storage,
                service.points(),
                user.id,
                habit.id,
                CompleteHabitParams {
                    date: Some(format!("2024-03-{:02}", day)),
                },
                date(2024, 3, 7),
            )
            .unwrap();
            last = Some(result);
        }
        let last = last.unwrap();
        assert_eq!(last.ledger.total_points, 7);
        assert_eq!(last.badges_awarded, vec!["7-day streak"]);

        // Stats line up with the week of activity
        let stats =
            get_user_stats(storage, service.analytics(), user.id, date(2024, 3, 7)).unwrap();
        assert_eq!(stats.total_points, 7);
        assert_eq!(stats.total_completions, 7);
        assert_eq!(stats.current_streak, 7);
        // 7 completions over 1 habit x 30 days rounds to 23%
        assert_eq!(stats.overall_success_rate, 23);

        // Analytics summary over the week
        let summary =
            get_analytics(storage, service.analytics(), user.id, "7d", date(2024, 3, 7)).unwrap();
        assert_eq!(summary.total_completions, 7);
        assert_eq!(summary.success_rate, 100);
        assert_eq!(summary.top_habits[0].name, "Morning Run");

        // Leaderboard and calendar for March
        let board =
            get_monthly_leaderboard(storage, service.analytics(), user.id, 2024, 3).unwrap();
        assert_eq!(board.most_completed[0].completed_count, 7);

        let calendar = get_calendar(storage, service.analytics(), user.id, 2024, 3).unwrap();
        assert_eq!(calendar.calendar_data.len(), 7);

        // Badge listing and admin view
        let badges = get_user_badges(storage, user.id).unwrap();
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].badge_name, "7-day streak");

        let overview = admin_overview(storage).unwrap();
        assert_eq!(overview.total_users, 1);
        assert_eq!(overview.total_habits, 1);
        assert_eq!(overview.total_completions, 7);
        assert_eq!(overview.most_active[0].total_points, 7);

        // Removing the account takes habits, events and rewards with it
        assert_eq!(list_users(storage).unwrap()[0].username, "alice");
        delete_user(storage, user.id).unwrap();

        let emptied = admin_overview(storage).unwrap();
        assert_eq!(emptied.total_users, 0);
        assert_eq!(emptied.total_habits, 0);
        assert_eq!(emptied.total_completions, 0);
        assert!(list_users(storage).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let config = test_config(&temp_file);

        let user_id = {
            let service = HabitTrackerService::new(&config)
                .await
                .expect("Failed to create first service");
            let user = register_user(
                service.storage(),
                RegisterUserParams {
                    username: "alice".to_string(),
                    email: "alice@example.com".to_string(),
                },
            )
            .unwrap();
            let habit = create_habit(
                service.storage(),
                user.id,
                CreateHabitParams {
                    name: "Read".to_string(),
                    category: "study".to_string(),
                    frequency: "daily".to_string(),
                },
            )
            .unwrap();
            complete_habit(
                service.storage(),
                service.points(),
                user.id,
                habit.id,
                CompleteHabitParams::default(),
                date(2024, 3, 1),
            )
            .unwrap();
            user.id
        };

        let reopened = HabitTrackerService::new(&config)
            .await
            .expect("Failed to reopen service");
        let stats = get_user_stats(
            reopened.storage(),
            reopened.analytics(),
            user_id,
            date(2024, 3, 1),
        )
        .unwrap();
        assert_eq!(stats.total_points, 1);
        assert_eq!(stats.total_completions, 1);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let service = HabitTrackerService::new(&test_config(&temp_file))
            .await
            .expect("Failed to create service");

        register_user(
            service.storage(),
            RegisterUserParams {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .unwrap();

        let result = register_user(
            service.storage(),
            RegisterUserParams {
                username: "alice".to_string(),
                email: "elsewhere@example.com".to_string(),
            },
        );
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert_eq!(service.storage().user_count().unwrap(), 1);
    }
}
