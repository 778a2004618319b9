/// Analytics engine for completion aggregation
///
/// Everything here is a pure function of caller-supplied habits and
/// completion events: no storage handles, no hidden state, and "today" is
/// always an explicit argument. Identical inputs give identical outputs,
/// so invocations for different users can run concurrently without any
/// coordination.
///
/// Duplicate events per (habit, date) are legal input. Counting operations
/// (calendar, leaderboards, category stats) count rows; streaks work on
/// distinct dates.

use serde::{Deserialize, Serialize};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{Category, CompletionEvent, Habit, HabitId, StreakSummary};

/// How many habits the leaderboards report
const LEADERBOARD_SIZE: usize = 5;

/// Errors produced by analytics entry points
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Unsupported period: {0} (expected 7d, 30d, 90d or 1y)")]
    InvalidPeriod(String),

    #[error("Invalid calendar month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Lookback window for the analytics summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "7d",
            Period::Month => "30d",
            Period::Quarter => "90d",
            Period::Year => "1y",
        }
    }

    /// Window length in days, ending at "today" inclusive
    pub fn days(&self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        }
    }
}

impl FromStr for Period {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" => Ok(Period::Week),
            "30d" => Ok(Period::Month),
            "90d" => Ok(Period::Quarter),
            "1y" => Ok(Period::Year),
            other => Err(AnalyticsError::InvalidPeriod(other.to_string())),
        }
    }
}

/// Per-category completion figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub category: Category,
    pub total_habits: u32,
    pub completed_count: u32,
    /// Percentage of attempted slots (habits x days in range) that were
    /// completed; 0 when the category has no habits
    pub success_rate: u32,
}

/// Leaderboard row: a habit and how often it was completed in the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitCompletionCount {
    pub id: HabitId,
    pub name: String,
    pub category: Category,
    pub completed_count: u32,
}

/// One calendar day with at least one completion
///
/// `habits` and `categories` are parallel vectors in event order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalendarBucket {
    pub count: u32,
    pub habits: Vec<String>,
    pub categories: Vec<String>,
}

/// A day and its completion count, for trend charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Everything the analytics view needs for one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub period: Period,
    pub total_habits: u32,
    pub total_completions: u32,
    pub success_rate: u32,
    pub daily_trend: Vec<DailyCount>,
    pub top_habits: Vec<HabitCompletionCount>,
    pub streak_data: StreakSummary,
}

/// Analytics engine for processing habit data
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self
    }

    /// User-level streak figures: the best current and longest streak
    /// across all of the user's habits
    pub fn compute_streaks(&self, events: &[CompletionEvent], today: NaiveDate) -> StreakSummary {
        let mut dates_by_habit: HashMap<HabitId, Vec<NaiveDate>> = HashMap::new();
        for event in events {
            dates_by_habit.entry(event.habit_id).or_default().push(event.date);
        }

        dates_by_habit
            .into_values()
            .map(|dates| StreakSummary::from_dates(dates, today))
            .fold(StreakSummary::default(), StreakSummary::max)
    }

    /// Completion figures per category
    ///
    /// Every category of the fixed set appears in the output, including
    /// ones the user has no habits in (with all-zero figures), so the
    /// category view renders uniformly. Ordered by completed count
    /// descending, then category name for stable output.
    pub fn compute_category_stats(
        &self,
        habits: &[Habit],
        events: &[CompletionEvent],
        days_in_range: u32,
    ) -> Vec<CategoryStats> {
        let category_of: HashMap<HabitId, Category> =
            habits.iter().map(|h| (h.id, h.category)).collect();

        let mut stats: Vec<CategoryStats> = Category::ALL
            .iter()
            .map(|&category| {
                let total_habits =
                    habits.iter().filter(|h| h.category == category).count() as u32;
                let completed_count = events
                    .iter()
                    .filter(|e| category_of.get(&e.habit_id) == Some(&category))
                    .count() as u32;

                CategoryStats {
                    category,
                    total_habits,
                    completed_count,
                    success_rate: percentage(completed_count, total_habits as u64 * days_in_range as u64),
                }
            })
            .collect();

        stats.sort_by(|a, b| {
            b.completed_count
                .cmp(&a.completed_count)
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        });
        stats
    }

    /// Top habits for one calendar month
    ///
    /// At most five entries, completion count descending with name as the
    /// tie break; habits without completions in the month are excluded.
    pub fn compute_monthly_leaderboard(
        &self,
        habits: &[Habit],
        events: &[CompletionEvent],
        year: i32,
        month: u32,
    ) -> Result<Vec<HabitCompletionCount>, AnalyticsError> {
        let (start, end) = month_bounds(year, month)?;
        let in_month: Vec<&CompletionEvent> = events
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .collect();

        Ok(rank_habits(habits, &in_month))
    }

    /// Calendar day buckets for one calendar month
    ///
    /// Days without completions are absent from the map; the calendar UI
    /// treats absence as zero. Events referencing unknown habits (e.g. a
    /// habit deleted between queries) are skipped.
    pub fn compute_calendar_buckets(
        &self,
        habits: &[Habit],
        events: &[CompletionEvent],
        year: i32,
        month: u32,
    ) -> Result<BTreeMap<NaiveDate, CalendarBucket>, AnalyticsError> {
        let (start, end) = month_bounds(year, month)?;
        let habit_by_id: HashMap<HabitId, &Habit> = habits.iter().map(|h| (h.id, h)).collect();

        let mut buckets: BTreeMap<NaiveDate, CalendarBucket> = BTreeMap::new();
        for event in events {
            if event.date < start || event.date > end {
                continue;
            }
            let habit = match habit_by_id.get(&event.habit_id) {
                Some(habit) => habit,
                None => continue,
            };

            let bucket = buckets.entry(event.date).or_default();
            bucket.count += 1;
            bucket.habits.push(habit.name.clone());
            bucket.categories.push(habit.category.as_str().to_string());
        }

        Ok(buckets)
    }

    /// Everything the analytics view shows for one lookback period
    ///
    /// All sub-computations are restricted to the window
    /// `[today - days + 1, today]`.
    pub fn compute_summary(
        &self,
        habits: &[Habit],
        events: &[CompletionEvent],
        period: Period,
        today: NaiveDate,
    ) -> AnalyticsSummary {
        let start = today - Duration::days(period.days() - 1);
        let windowed: Vec<CompletionEvent> = events
            .iter()
            .filter(|e| e.date >= start && e.date <= today)
            .cloned()
            .collect();

        let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for event in &windowed {
            *per_day.entry(event.date).or_insert(0) += 1;
        }
        let daily_trend = per_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect();

        let window_refs: Vec<&CompletionEvent> = windowed.iter().collect();

        AnalyticsSummary {
            period,
            total_habits: habits.len() as u32,
            total_completions: windowed.len() as u32,
            success_rate: percentage(
                windowed.len() as u32,
                habits.len() as u64 * period.days() as u64,
            ),
            daily_trend,
            top_habits: rank_habits(habits, &window_refs),
            streak_data: self.compute_streaks(&windowed, today),
        }
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Rounded percentage of completed over attempted slots; zero when no
/// slots were attempted (never a division by zero)
pub(crate) fn percentage(completed: u32, attempted_slots: u64) -> u32 {
    if attempted_slots == 0 {
        return 0;
    }
    ((completed as f64 / attempted_slots as f64) * 100.0).round() as u32
}

/// First and last day of a calendar month
fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AnalyticsError> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(AnalyticsError::InvalidMonth { year, month })?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(AnalyticsError::InvalidMonth { year, month })?;

    Ok((start, next_month - Duration::days(1)))
}

/// Count completions per habit and rank them: count descending, habit
/// name ascending on ties, zero-count habits dropped, top five kept
fn rank_habits(habits: &[Habit], events: &[&CompletionEvent]) -> Vec<HabitCompletionCount> {
    let mut counts: HashMap<HabitId, u32> = HashMap::new();
    for event in events {
        *counts.entry(event.habit_id).or_insert(0) += 1;
    }

    let mut ranked: Vec<HabitCompletionCount> = habits
        .iter()
        .filter_map(|habit| {
            let completed_count = *counts.get(&habit.id)?;
            (completed_count > 0).then(|| HabitCompletionCount {
                id: habit.id,
                name: habit.name.clone(),
                category: habit.category,
                completed_count,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.completed_count
            .cmp(&a.completed_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(LEADERBOARD_SIZE);
    ranked
}
