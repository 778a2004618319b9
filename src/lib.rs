/// Public library interface for the habit tracker core
///
/// This module exports the service façade and the public types used by
/// the web collaborator and by tests.

use thiserror::Error;

// Internal modules
mod domain;
mod storage;
mod analytics;
mod points;
mod api;
mod config;

// Re-export public modules and types
pub use domain::*;
pub use storage::{
    ActiveUser, BadgeStore, CompletionStore, HabitRegistry, LedgerStore, SqliteStorage,
    StorageError, UserStore,
};
pub use analytics::{
    AnalyticsEngine, AnalyticsError, AnalyticsSummary, CalendarBucket, CategoryStats, DailyCount,
    HabitCompletionCount, Period,
};
pub use points::{CompletionRecorded, PointsEngine};
pub use api::*;
pub use config::{default_database_path, Config};

/// Errors surfaced at the service boundary
///
/// Storage and domain errors are folded into the caller-facing taxonomy
/// here: the web collaborator maps these onto HTTP statuses without ever
/// inspecting SQLite error codes.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Persistence(StorageError),

    /// A multi-step mutation was left partially applied: the durable
    /// prefix is reported, never silently dropped
    #[error("Inconsistent state: {0}")]
    Inconsistency(String),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::HabitNotFound { habit_id } => {
                ServiceError::NotFound(format!("Habit {} not found", habit_id))
            }
            StorageError::UserNotFound { user_id } => {
                ServiceError::NotFound(format!("User {} not found", user_id))
            }
            StorageError::DuplicateHabitName { name } => {
                ServiceError::Conflict(format!("A habit named '{}' already exists", name))
            }
            StorageError::DuplicateUser { username } => {
                ServiceError::Conflict(format!("Username '{}' is already taken", username))
            }
            other => ServiceError::Persistence(other),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

/// Service façade tying storage and the two engines together
///
/// The web collaborator constructs one of these at startup and calls the
/// handler functions in `api` with its parts.
pub struct HabitTrackerService {
    storage: SqliteStorage,
    analytics: AnalyticsEngine,
    points: PointsEngine,
}

impl HabitTrackerService {
    /// Open the database, run pending migrations and assemble the engines
    pub async fn new(config: &Config) -> Result<Self, ServiceError> {
        tracing::info!(
            "Initializing habit tracker core with database: {:?}",
            config.database_path
        );

        if let Some(parent) = config.database_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let storage = SqliteStorage::new(config.database_path.clone())?;

        Ok(Self {
            storage,
            analytics: AnalyticsEngine::new(),
            points: PointsEngine::new(),
        })
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }

    pub fn points(&self) -> &PointsEngine {
        &self.points
    }

    /// Connectivity report logged at startup
    pub fn report_counts(&self) -> Result<(), ServiceError> {
        let users = self.storage.user_count()?;
        let habits = self.storage.total_habit_count()?;
        tracing::info!("Database ready: {} users, {} habits", users, habits);
        Ok(())
    }
}
