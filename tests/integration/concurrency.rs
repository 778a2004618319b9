/// Concurrent completion recording against one database file
///
/// Each thread opens its own connection; the point increments happen in
/// single UPDATE statements at the database, so simultaneous completions
/// must all land in the final total.
use habit_tracker_core::*;
use chrono::NaiveDate;
use std::thread;
use tempfile::NamedTempFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[cfg(test)]
mod concurrent_completions {
    use super::*;

    #[test]
    fn test_simultaneous_completions_both_count() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        // Migrate and seed from the main thread first
        let storage = SqliteStorage::new(db_path.clone()).expect("Failed to open database");
        let user = storage
            .create_user("alice", "alice@example.com")
            .expect("Failed to create user");
        let habit = storage
            .create_habit(user.id, "Run", Category::Sport, Frequency::Daily)
            .expect("Failed to create habit");

        let mut handles = Vec::new();
        for _ in 0..2 {
            let path = db_path.clone();
            let user_id = user.id;
            let habit_id = habit.id;
            handles.push(thread::spawn(move || {
                let storage = SqliteStorage::new(path).expect("Failed to open database");
                PointsEngine::new()
                    .record_completion(&storage, user_id, habit_id, date(2024, 3, 1))
                    .expect("Failed to record completion")
            }));
        }
        for handle in handles {
            handle.join().expect("Worker thread panicked");
        }

        // Neither increment may overwrite the other
        assert_eq!(storage.ledger(user.id).unwrap().total_points, 2);
        assert_eq!(storage.user_completion_count(user.id).unwrap(), 2);
        assert_eq!(storage.completed_dates(habit.id).unwrap().len(), 2);
    }

    #[test]
    fn test_many_concurrent_completions_sum_exactly() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let storage = SqliteStorage::new(db_path.clone()).expect("Failed to open database");
        let user = storage
            .create_user("alice", "alice@example.com")
            .expect("Failed to create user");
        let habit = storage
            .create_habit(user.id, "Run", Category::Sport, Frequency::Daily)
            .expect("Failed to create habit");

        const THREADS: usize = 4;
        const PER_THREAD: i64 = 5;

        let mut handles = Vec::new();
        for t in 0..THREADS {
            let path = db_path.clone();
            let user_id = user.id;
            let habit_id = habit.id;
            handles.push(thread::spawn(move || {
                let storage = SqliteStorage::new(path).expect("Failed to open database");
                let engine = PointsEngine::new();
                for day in 0..PER_THREAD {
                    engine
                        .record_completion(
                            &storage,
                            user_id,
                            habit_id,
                            date(2024, 3, 1) + chrono::Duration::days(t as i64 * PER_THREAD + day),
                        )
                        .expect("Failed to record completion");
                }
            }));
        }
        for handle in handles {
            handle.join().expect("Worker thread panicked");
        }

        let expected = THREADS as i64 * PER_THREAD;
        assert_eq!(storage.ledger(user.id).unwrap().total_points, expected);
        assert_eq!(
            storage.user_completion_count(user.id).unwrap(),
            expected as u64
        );
    }
}
