/// Points and badge engine
///
/// Recording a completion is the one multi-step mutation in the system:
/// append the event, bump the ledger, evaluate badge predicates. The
/// ordering contract matters: nothing is written before the habit is
/// verified, and a failure after the event insert is surfaced as an
/// inconsistency instead of being silently swallowed (the event row is
/// already durable at that point and is not rolled back).

use serde::Serialize;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

use crate::domain::{
    level_for, BadgeKind, CompletionEvent, HabitId, PointsLedger, UserId, MASTERY_BADGE_POINTS,
    POINTS_PER_COMPLETION, STREAK_BADGE_DAYS,
};
use crate::storage::{BadgeStore, CompletionStore, HabitRegistry, LedgerStore};
use crate::ServiceError;

/// Result of recording one completion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRecorded {
    pub event: CompletionEvent,
    pub ledger: PointsLedger,
    /// Whether this completion pushed the user over a level boundary
    pub level_up: bool,
    /// Badge names granted by this call; a badge already held is neither
    /// re-granted nor re-reported
    pub badges_awarded: Vec<String>,
}

/// Engine for awarding points and badges on habit completion
pub struct PointsEngine;

impl PointsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Record a completion for `habit_id` on `date` and apply its rewards
    ///
    /// Steps, in order:
    /// 1. verify the habit exists and belongs to `user_id` (no writes yet)
    /// 2. append the completion event; failure aborts the whole call
    /// 3. add one point via the store's atomic increment
    /// 4. evaluate badge predicates: streak badge first, then mastery
    ///
    /// Steps 3 and 4 run after the event is durable; if either fails the
    /// partial state is reported as `ServiceError::Inconsistency` and
    /// logged, never hidden.
    pub fn record_completion<S>(
        &self,
        store: &S,
        user_id: UserId,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> Result<CompletionRecorded, ServiceError>
    where
        S: HabitRegistry + CompletionStore + LedgerStore + BadgeStore,
    {
        let habit = store
            .get_habit(habit_id)?
            .filter(|h| h.user_id == user_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Habit {} not found", habit_id)))?;

        let event = store.insert_completion(habit_id, date)?;

        let ledger = store
            .add_points(user_id, POINTS_PER_COMPLETION)
            .map_err(|e| {
                tracing::error!(
                    "Completion {} recorded for habit {} but the point increment failed: {}",
                    event.id,
                    habit_id,
                    e
                );
                ServiceError::Inconsistency(format!(
                    "Completion recorded but points were not added: {}",
                    e
                ))
            })?;
        let level_up = ledger.level > level_for(ledger.total_points - POINTS_PER_COMPLETION);

        let badges_awarded = self
            .evaluate_badges(store, user_id, habit_id, date, &ledger)
            .map_err(|e| {
                tracing::error!(
                    "Completion {} recorded for habit {} but badge evaluation failed: {}",
                    event.id,
                    habit_id,
                    e
                );
                ServiceError::Inconsistency(format!(
                    "Completion recorded but badge evaluation failed: {}",
                    e
                ))
            })?;

        tracing::debug!(
            "User {} completed '{}' on {}: {} points, level {}",
            user_id,
            habit.name,
            date,
            ledger.total_points,
            ledger.level
        );

        Ok(CompletionRecorded {
            event,
            ledger,
            level_up,
            badges_awarded,
        })
    }

    /// Run the badge predicates in their fixed order and collect the
    /// names that were newly granted
    fn evaluate_badges<S>(
        &self,
        store: &S,
        user_id: UserId,
        habit_id: HabitId,
        date: NaiveDate,
        ledger: &PointsLedger,
    ) -> Result<Vec<String>, ServiceError>
    where
        S: CompletionStore + BadgeStore,
    {
        let mut awarded = Vec::new();

        // Streak badge: the trailing window [date - 6, date] has room for
        // exactly seven distinct days; duplicates within a day must not
        // count twice
        let window_start = date - Duration::days(STREAK_BADGE_DAYS - 1);
        let recent = store.habit_completions_in_range(habit_id, window_start, date)?;
        let distinct_days: BTreeSet<NaiveDate> = recent.iter().map(|e| e.date).collect();
        if distinct_days.len() as i64 >= STREAK_BADGE_DAYS {
            let badge = BadgeKind::SevenDayStreak;
            if store.award_badge(user_id, badge.name())? {
                awarded.push(badge.name().to_string());
            }
        }

        // Mastery badge: thirty points lifetime
        if ledger.total_points >= MASTERY_BADGE_POINTS {
            let badge = BadgeKind::ThirtyPointMastery;
            if store.award_badge(user_id, badge.name())? {
                awarded.push(badge.name().to_string());
            }
        }

        Ok(awarded)
    }
}

impl Default for PointsEngine {
    fn default() -> Self {
        Self::new()
    }
}
