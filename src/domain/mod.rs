/// Domain module containing core business logic and data types
///
/// This module defines the core entities (User, Habit, CompletionEvent,
/// PointsLedger, Badge) and their validation rules, plus the streak fold
/// that the analytics engine builds on.

pub mod types;
pub mod user;
pub mod habit;
pub mod completion;
pub mod ledger;
pub mod streak;

// Re-export public types for easy access
pub use types::*;
pub use user::*;
pub use habit::*;
pub use completion::*;
pub use ledger::*;
pub use streak::*;

use thiserror::Error;

/// Errors that can occur during domain validation
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}
