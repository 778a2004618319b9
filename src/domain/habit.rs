/// Habit entity and related validation
///
/// This module defines the core Habit struct that represents a recurring
/// task a user wants to track. Each habit is owned by exactly one user;
/// names are unique per owner (enforced by the registry at write time).

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{Category, DomainError, Frequency, HabitId, UserId};

/// A habit represents something the user wants to do regularly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// The owning user; completions and stats are always scoped to them
    pub user_id: UserId,
    /// Display name, unique per owner (e.g. "Morning Run")
    pub name: String,
    /// Category for organization and category analytics
    pub category: Category,
    /// How often this habit should be performed
    pub frequency: Frequency,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a habit from existing data (used when loading from the database)
    ///
    /// Assumes the data was validated when it was first written.
    pub fn from_existing(
        id: HabitId,
        user_id: UserId,
        name: String,
        category: Category,
        frequency: Frequency,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            category,
            frequency,
            created_at,
        }
    }

    /// Validate a habit name according to business rules
    ///
    /// Called before every create and rename, ahead of any mutation.
    pub fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string(),
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string(),
            ));
        }

        Ok(())
    }
}
