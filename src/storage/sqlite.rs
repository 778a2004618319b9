/// SQLite implementation of the storage interfaces
///
/// This module provides the concrete SQLite implementation behind the
/// HabitRegistry, CompletionStore, LedgerStore, BadgeStore and UserStore
/// traits. It handles all SQL queries and data conversion.

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::{params, Connection, Row};
use chrono::{NaiveDate, Utc};

use crate::domain::{
    level_for, Badge, Category, CompletionEvent, Frequency, Habit, HabitId, PointsLedger, User,
    UserId,
};
use crate::storage::{
    migrations, ActiveUser, BadgeStore, CompletionStore, HabitRegistry, LedgerStore, StorageError,
    UserStore,
};

/// How long a writer waits on a locked database before giving up
///
/// Concurrent completion recording uses one connection per request, so
/// writers must queue behind each other instead of failing immediately.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based storage implementation
///
/// Holds one connection; the web layer opens one storage per request, and
/// SQLite serializes the writes (see `BUSY_TIMEOUT`).
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        Self::configure(conn, &format!("{:?}", db_path))
    }

    /// In-memory storage, used by tests
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        Self::configure(conn, "in-memory")
    }

    fn configure(conn: Connection, label: &str) -> Result<Self, StorageError> {
        // Cascading deletes depend on this pragma
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| StorageError::Connection(format!("Failed to set busy timeout: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite storage initialized at: {}", label);

        Ok(Self { conn })
    }

    /// Map a habits row (id, user_id, name, category, frequency, created_at)
    fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let category_str: String = row.get(3)?;
        let category = Category::parse(&category_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(3, "Invalid category".to_string(), rusqlite::types::Type::Text)
        })?;

        let frequency_str: String = row.get(4)?;
        let frequency = Frequency::parse(&frequency_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(4, "Invalid frequency".to_string(), rusqlite::types::Type::Text)
        })?;

        Ok(Habit::from_existing(
            HabitId(row.get(0)?),
            UserId(row.get(1)?),
            row.get(2)?, // name
            category,
            frequency,
            row.get(5)?, // created_at
        ))
    }

    /// Map a habit_completions row (id, habit_id, date, completion_time)
    fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<CompletionEvent> {
        Ok(CompletionEvent::from_existing(
            row.get(0)?,
            HabitId(row.get(1)?),
            row.get(2)?, // date
            row.get(3)?, // completion_time
        ))
    }
}

impl HabitRegistry for SqliteStorage {
    /// Create a new habit, rejecting duplicate names per owner before
    /// any write happens
    fn create_habit(
        &self,
        user_id: UserId,
        name: &str,
        category: Category,
        frequency: Frequency,
    ) -> Result<Habit, StorageError> {
        let name = name.trim();

        let already_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM habits WHERE user_id = ?1 AND name = ?2)",
            params![user_id.0, name],
            |row| row.get(0),
        )?;
        if already_exists {
            return Err(StorageError::DuplicateHabitName {
                name: name.to_string(),
            });
        }

        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO habits (user_id, name, category, frequency, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id.0, name, category.as_str(), frequency.as_str(), created_at],
        )?;

        let habit = Habit::from_existing(
            HabitId(self.conn.last_insert_rowid()),
            user_id,
            name.to_string(),
            category,
            frequency,
            created_at,
        );

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(habit)
    }

    fn get_habit(&self, habit_id: HabitId) -> Result<Option<Habit>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, category, frequency, created_at
             FROM habits WHERE id = ?1",
        )?;

        let result = stmt.query_row(params![habit_id.0], Self::habit_from_row);

        match result {
            Ok(habit) => Ok(Some(habit)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, category, frequency, created_at
             FROM habits WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;

        let habit_iter = stmt.query_map(params![user_id.0], Self::habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    fn update_habit(
        &self,
        habit_id: HabitId,
        name: &str,
        category: Category,
        frequency: Frequency,
    ) -> Result<(), StorageError> {
        let name = name.trim();

        // A rename must not collide with another habit of the same owner
        let collides: bool = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM habits
                WHERE name = ?1 AND id != ?2
                  AND user_id = (SELECT user_id FROM habits WHERE id = ?2)
            )",
            params![name, habit_id.0],
            |row| row.get(0),
        )?;
        if collides {
            return Err(StorageError::DuplicateHabitName {
                name: name.to_string(),
            });
        }

        let rows_affected = self.conn.execute(
            "UPDATE habits SET name = ?2, category = ?3, frequency = ?4 WHERE id = ?1",
            params![habit_id.0, name, category.as_str(), frequency.as_str()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id });
        }

        tracing::debug!("Updated habit: {} ({})", name, habit_id);
        Ok(())
    }

    fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![habit_id.0])?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    fn total_habit_count(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM habits", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl CompletionStore for SqliteStorage {
    fn insert_completion(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> Result<CompletionEvent, StorageError> {
        let completed_at = Utc::now();

        self.conn.execute(
            "INSERT INTO habit_completions (habit_id, date, completion_time)
             VALUES (?1, ?2, ?3)",
            params![habit_id.0, date, completed_at],
        )?;

        let event = CompletionEvent::from_existing(
            self.conn.last_insert_rowid(),
            habit_id,
            date,
            completed_at,
        );

        tracing::debug!("Recorded completion {} for habit {} on {}", event.id, habit_id, date);
        Ok(event)
    }

    fn completed_dates(&self, habit_id: HabitId) -> Result<Vec<NaiveDate>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT date FROM habit_completions WHERE habit_id = ?1 ORDER BY date",
        )?;

        let date_iter = stmt.query_map(params![habit_id.0], |row| row.get(0))?;

        let mut dates = Vec::new();
        for date in date_iter {
            dates.push(date?);
        }

        Ok(dates)
    }

    fn habit_completions_in_range(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CompletionEvent>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, date, completion_time
             FROM habit_completions
             WHERE habit_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date, completion_time",
        )?;

        let event_iter =
            stmt.query_map(params![habit_id.0, start, end], Self::completion_from_row)?;

        let mut events = Vec::new();
        for event in event_iter {
            events.push(event?);
        }

        Ok(events)
    }

    fn user_completions_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CompletionEvent>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT hc.id, hc.habit_id, hc.date, hc.completion_time
             FROM habit_completions hc
             JOIN habits h ON hc.habit_id = h.id
             WHERE h.user_id = ?1 AND hc.date BETWEEN ?2 AND ?3
             ORDER BY hc.date, hc.completion_time",
        )?;

        let event_iter =
            stmt.query_map(params![user_id.0, start, end], Self::completion_from_row)?;

        let mut events = Vec::new();
        for event in event_iter {
            events.push(event?);
        }

        Ok(events)
    }

    fn user_completions(&self, user_id: UserId) -> Result<Vec<CompletionEvent>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT hc.id, hc.habit_id, hc.date, hc.completion_time
             FROM habit_completions hc
             JOIN habits h ON hc.habit_id = h.id
             WHERE h.user_id = ?1
             ORDER BY hc.date, hc.completion_time",
        )?;

        let event_iter = stmt.query_map(params![user_id.0], Self::completion_from_row)?;

        let mut events = Vec::new();
        for event in event_iter {
            events.push(event?);
        }

        Ok(events)
    }

    fn user_completion_count(&self, user_id: UserId) -> Result<u64, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM habit_completions hc
             JOIN habits h ON hc.habit_id = h.id
             WHERE h.user_id = ?1",
            params![user_id.0],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn total_completion_count(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM habit_completions", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl LedgerStore for SqliteStorage {
    fn ledger(&self, user_id: UserId) -> Result<PointsLedger, StorageError> {
        let result = self.conn.query_row(
            "SELECT total_points, level FROM user_stats WHERE user_id = ?1",
            params![user_id.0],
            |row| {
                Ok(PointsLedger {
                    user_id,
                    total_points: row.get(0)?,
                    level: row.get(1)?,
                })
            },
        );

        match result {
            Ok(ledger) => Ok(ledger),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StorageError::UserNotFound { user_id })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Atomic increment: the addition and level derivation happen inside
    /// one UPDATE, so concurrent callers can never lose points to a
    /// read-modify-write interleaving. The level expression mirrors
    /// `domain::level_for`.
    fn add_points(&self, user_id: UserId, delta: i64) -> Result<PointsLedger, StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE user_stats
             SET total_points = total_points + ?1,
                 level = (total_points + ?1) / 10 + 1
             WHERE user_id = ?2",
            params![delta, user_id.0],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::UserNotFound { user_id });
        }

        let ledger = self.ledger(user_id)?;
        debug_assert_eq!(ledger.level, level_for(ledger.total_points));
        Ok(ledger)
    }
}

impl BadgeStore for SqliteStorage {
    fn has_badge(&self, user_id: UserId, badge_name: &str) -> Result<bool, StorageError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM badges WHERE user_id = ?1 AND badge_name = ?2)",
            params![user_id.0, badge_name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Idempotent award: the UNIQUE(user_id, badge_name) constraint plus
    /// OR IGNORE makes the second award a no-op, and the row count tells
    /// us whether this call granted the badge
    fn award_badge(&self, user_id: UserId, badge_name: &str) -> Result<bool, StorageError> {
        let rows_affected = self.conn.execute(
            "INSERT OR IGNORE INTO badges (user_id, badge_name, earned_at)
             VALUES (?1, ?2, ?3)",
            params![user_id.0, badge_name, Utc::now()],
        )?;

        let awarded = rows_affected == 1;
        if awarded {
            tracing::info!("Awarded badge '{}' to user {}", badge_name, user_id);
        }
        Ok(awarded)
    }

    fn badges(&self, user_id: UserId) -> Result<Vec<Badge>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT badge_name, earned_at FROM badges
             WHERE user_id = ?1
             ORDER BY earned_at DESC, id DESC",
        )?;

        let badge_iter = stmt.query_map(params![user_id.0], |row| {
            Ok(Badge {
                badge_name: row.get(0)?,
                earned_at: row.get(1)?,
            })
        })?;

        let mut badges = Vec::new();
        for badge in badge_iter {
            badges.push(badge?);
        }

        Ok(badges)
    }
}

impl UserStore for SqliteStorage {
    /// Register a user and their zeroed ledger in one transaction, so a
    /// user row can never exist without its stats row
    fn create_user(&self, username: &str, email: &str) -> Result<User, StorageError> {
        let username = username.trim();
        let email = email.trim();

        let taken: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 OR email = ?2)",
            params![username, email],
            |row| row.get(0),
        )?;
        if taken {
            return Err(StorageError::DuplicateUser {
                username: username.to_string(),
            });
        }

        let created_at = Utc::now();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
            params![username, email, created_at],
        )?;
        let user_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO user_stats (user_id, total_points, level) VALUES (?1, 0, 1)",
            params![user_id],
        )?;

        tx.commit()?;

        tracing::info!("Registered user {} ({})", username, user_id);

        Ok(User::from_existing(
            UserId(user_id),
            username.to_string(),
            email.to_string(),
            created_at,
        ))
    }

    fn get_user(&self, user_id: UserId) -> Result<Option<User>, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, username, email, created_at FROM users WHERE id = ?1",
            params![user_id.0],
            |row| {
                Ok(User::from_existing(
                    UserId(row.get(0)?),
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                ))
            },
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, email, created_at FROM users
             ORDER BY created_at DESC, id DESC",
        )?;

        let user_iter = stmt.query_map([], |row| {
            Ok(User::from_existing(
                UserId(row.get(0)?),
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
            ))
        })?;

        let mut users = Vec::new();
        for user in user_iter {
            users.push(user?);
        }

        Ok(users)
    }

    fn delete_user(&self, user_id: UserId) -> Result<(), StorageError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![user_id.0])?;

        if rows_affected == 0 {
            return Err(StorageError::UserNotFound { user_id });
        }

        tracing::info!("Deleted user {}", user_id);
        Ok(())
    }

    fn user_count(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn most_active_users(&self, limit: u32) -> Result<Vec<ActiveUser>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.username, us.total_points, us.level
             FROM users u
             JOIN user_stats us ON u.id = us.user_id
             ORDER BY us.total_points DESC, u.username
             LIMIT ?1",
        )?;

        let user_iter = stmt.query_map(params![limit], |row| {
            Ok(ActiveUser {
                user_id: UserId(row.get(0)?),
                username: row.get(1)?,
                total_points: row.get(2)?,
                level: row.get(3)?,
            })
        })?;

        let mut users = Vec::new();
        for user in user_iter {
            users.push(user?);
        }

        Ok(users)
    }
}
