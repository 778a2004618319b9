/// Points ledger and badge types
///
/// Every user has exactly one PointsLedger row, created with zero points at
/// registration. Points only ever go up; the level is derived from the
/// total by integer division. Badges are one-time achievements keyed by
/// (user, badge name); awarding is idempotent.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::UserId;

/// Points granted for each recorded completion
pub const POINTS_PER_COMPLETION: i64 = 1;

/// Points needed to advance one level
pub const POINTS_PER_LEVEL: i64 = 10;

/// Total points at which the mastery badge is earned
pub const MASTERY_BADGE_POINTS: i64 = 30;

/// Distinct completion days, inside the trailing window of the same
/// length, needed for the streak badge
pub const STREAK_BADGE_DAYS: i64 = 7;

/// Derive the level for a point total: one level per ten points,
/// starting at level one
pub fn level_for(total_points: i64) -> i64 {
    total_points / POINTS_PER_LEVEL + 1
}

/// A user's accumulated points and derived level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsLedger {
    pub user_id: UserId,
    /// Monotonically non-decreasing point total
    pub total_points: i64,
    /// Always `total_points / 10 + 1`
    pub level: i64,
}

impl PointsLedger {
    /// Fresh ledger for a newly registered user
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            total_points: 0,
            level: 1,
        }
    }
}

/// The fixed set of badges the engine can award
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeKind {
    /// Completed the same habit on seven consecutive-window days
    SevenDayStreak,
    /// Reached thirty total points
    ThirtyPointMastery,
}

impl BadgeKind {
    /// The badge name as persisted and shown to users
    pub fn name(&self) -> &'static str {
        match self {
            BadgeKind::SevenDayStreak => "7-day streak",
            BadgeKind::ThirtyPointMastery => "30-point mastery",
        }
    }
}

/// An earned badge row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub badge_name: String,
    pub earned_at: DateTime<Utc>,
}
