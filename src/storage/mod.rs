/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. The four
/// traits below are the collaborator seams of the system: the analytics
/// and points engines only ever see these interfaces, so tests can swap
/// in scratch databases (or alternative backends later) freely.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{
    Badge, Category, CompletionEvent, Frequency, Habit, HabitId, PointsLedger, User, UserId,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: HabitId },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    #[error("Duplicate habit name for this user: {name}")]
    DuplicateHabitName { name: String },

    #[error("Duplicate user: {username}")]
    DuplicateUser { username: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Registry of habit definitions, scoped per owner
pub trait HabitRegistry {
    /// Create a habit; fails with `DuplicateHabitName` when the owner
    /// already has a habit with the same name
    fn create_habit(
        &self,
        user_id: UserId,
        name: &str,
        category: Category,
        frequency: Frequency,
    ) -> Result<Habit, StorageError>;

    /// Get a habit by id; `None` when absent
    fn get_habit(&self, habit_id: HabitId) -> Result<Option<Habit>, StorageError>;

    /// List all habits owned by a user, newest first
    fn list_habits(&self, user_id: UserId) -> Result<Vec<Habit>, StorageError>;

    /// Update name/category/frequency of an existing habit
    fn update_habit(
        &self,
        habit_id: HabitId,
        name: &str,
        category: Category,
        frequency: Frequency,
    ) -> Result<(), StorageError>;

    /// Delete a habit; its completion events cascade away with it
    fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError>;

    /// Total habit count across all users (admin aggregate)
    fn total_habit_count(&self) -> Result<u64, StorageError>;
}

/// Append-only store of completion events
///
/// No uniqueness contract: several events for the same habit and date are
/// permitted, and aggregations must tolerate the duplicates.
pub trait CompletionStore {
    /// Append one completion event
    fn insert_completion(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> Result<CompletionEvent, StorageError>;

    /// All completion dates for one habit, ascending (may repeat)
    fn completed_dates(&self, habit_id: HabitId) -> Result<Vec<NaiveDate>, StorageError>;

    /// Events for one habit within an inclusive date range
    fn habit_completions_in_range(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CompletionEvent>, StorageError>;

    /// Events across all of a user's habits within an inclusive date
    /// range, ordered by date then recording time
    fn user_completions_in_range(
        &self,
        user_id: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CompletionEvent>, StorageError>;

    /// Every event across all of a user's habits
    fn user_completions(&self, user_id: UserId) -> Result<Vec<CompletionEvent>, StorageError>;

    /// Total event count for a user
    fn user_completion_count(&self, user_id: UserId) -> Result<u64, StorageError>;

    /// Total event count across all users (admin aggregate)
    fn total_completion_count(&self) -> Result<u64, StorageError>;
}

/// Per-user points ledger
pub trait LedgerStore {
    /// Current ledger for a user
    fn ledger(&self, user_id: UserId) -> Result<PointsLedger, StorageError>;

    /// Add points and rederive the level in a single atomic update.
    ///
    /// The increment must be applied at the storage boundary, never as a
    /// read-modify-write from the caller: concurrent increments for the
    /// same user must all be reflected in the final total.
    fn add_points(&self, user_id: UserId, delta: i64) -> Result<PointsLedger, StorageError>;
}

/// Per-user badge set
pub trait BadgeStore {
    /// Whether the user already holds the named badge
    fn has_badge(&self, user_id: UserId, badge_name: &str) -> Result<bool, StorageError>;

    /// Award a badge; returns `true` only when it was newly granted.
    /// Awarding an already-held badge is not an error.
    fn award_badge(&self, user_id: UserId, badge_name: &str) -> Result<bool, StorageError>;

    /// All badges earned by a user, newest first
    fn badges(&self, user_id: UserId) -> Result<Vec<Badge>, StorageError>;
}

/// User accounts, as far as the core needs them
pub trait UserStore {
    /// Register a user and bootstrap their zeroed points ledger in the
    /// same transaction
    fn create_user(&self, username: &str, email: &str) -> Result<User, StorageError>;

    /// Get a user by id; `None` when absent
    fn get_user(&self, user_id: UserId) -> Result<Option<User>, StorageError>;

    /// All registered users, newest first (admin listing)
    fn list_users(&self) -> Result<Vec<User>, StorageError>;

    /// Delete a user; their habits, completions, ledger and badges
    /// cascade away with them
    fn delete_user(&self, user_id: UserId) -> Result<(), StorageError>;

    /// Total user count (admin aggregate)
    fn user_count(&self) -> Result<u64, StorageError>;

    /// Users ordered by total points descending, at most `limit` rows
    /// (admin aggregate)
    fn most_active_users(&self, limit: u32) -> Result<Vec<ActiveUser>, StorageError>;
}

/// Admin leaderboard row: a user joined with their ledger
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ActiveUser {
    pub user_id: UserId,
    pub username: String,
    pub total_points: i64,
    pub level: i64,
}
