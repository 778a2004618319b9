/// Core types and enums used throughout the domain layer
///
/// This module defines the fundamental identifier types plus the Category
/// and Frequency enums used by Habit, CompletionEvent and the engines.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::DomainError;

/// Unique identifier for a user account
///
/// Wraps the integer row id so a user id can't accidentally be passed
/// where a habit id is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HabitId(pub i64);

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Categories for organizing habits into different life areas
///
/// This is a fixed set: the front end offers exactly these choices and the
/// category analytics group by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sport,
    PersonalGrowth,
    Study,
    Health,
    Entertainment,
    Other,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 6] = [
        Category::Sport,
        Category::PersonalGrowth,
        Category::Study,
        Category::Health,
        Category::Entertainment,
        Category::Other,
    ];

    /// Canonical string form, used for storage and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sport => "sport",
            Category::PersonalGrowth => "personal_growth",
            Category::Study => "study",
            Category::Health => "health",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }

    /// Parse a category from an externally supplied string
    ///
    /// Store rows and request payloads are not trusted to be exactly cased,
    /// so this accepts any casing and either space, hyphen or underscore
    /// as a separator before rejecting.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let normalized = input.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "sport" => Ok(Category::Sport),
            "personal_growth" => Ok(Category::PersonalGrowth),
            "study" => Ok(Category::Study),
            "health" => Ok(Category::Health),
            "entertainment" => Ok(Category::Entertainment),
            "other" => Ok(Category::Other),
            _ => Err(DomainError::InvalidCategory(input.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a habit should be performed
///
/// The application supports daily and weekly habits. Aggregation treats
/// both the same way (one completion per calendar date); frequency is a
/// property of the habit definition shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    /// Canonical string form, used for storage and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }

    /// Parse a frequency from an externally supplied string
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            _ => Err(DomainError::InvalidFrequency(input.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_tolerates_shape_variance() {
        assert_eq!(Category::parse("sport").unwrap(), Category::Sport);
        assert_eq!(Category::parse("  Health ").unwrap(), Category::Health);
        assert_eq!(Category::parse("Personal Growth").unwrap(), Category::PersonalGrowth);
        assert_eq!(Category::parse("personal-growth").unwrap(), Category::PersonalGrowth);
        assert_eq!(Category::parse("ENTERTAINMENT").unwrap(), Category::Entertainment);
    }

    #[test]
    fn test_category_parse_rejects_unknown() {
        assert!(Category::parse("gardening").is_err());
        assert!(Category::parse("").is_err());
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()).unwrap(), category);
        }
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!(Frequency::parse("daily").unwrap(), Frequency::Daily);
        assert_eq!(Frequency::parse("Weekly").unwrap(), Frequency::Weekly);
        assert!(Frequency::parse("hourly").is_err());
    }
}
