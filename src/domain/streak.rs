/// Streak calculation over completion dates
///
/// A streak is a run of consecutive calendar days each having at least one
/// completion. Input dates may contain duplicates (the completion store
/// permits several rows per day), so the fold deduplicates by date before
/// walking the gaps.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Current and longest streak figures for one habit (or the max across a
/// user's habits, when aggregated by the analytics engine)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    /// Length of the streak ending at the most recent completion, or zero
    /// when that completion is older than yesterday; a run that stopped
    /// three days ago is history, not a current streak
    pub current: u32,
    /// Longest run of consecutive completion days ever recorded
    pub longest: u32,
}

impl StreakSummary {
    /// Fold a set of completion dates into streak figures
    ///
    /// `today` is passed explicitly so the recency cutoff for `current`
    /// is deterministic under test.
    pub fn from_dates<I>(dates: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        // Dedupe and order ascending in one pass
        let distinct: BTreeSet<NaiveDate> = dates.into_iter().collect();
        if distinct.is_empty() {
            return Self::default();
        }

        let mut longest: u32 = 1;
        let mut run: u32 = 1;
        let mut previous: Option<NaiveDate> = None;

        for date in &distinct {
            if let Some(prev) = previous {
                if (*date - prev).num_days() == 1 {
                    run += 1;
                } else {
                    run = 1;
                }
            }
            longest = longest.max(run);
            previous = Some(*date);
        }

        // The ascending walk ends on the most recent date, so `run` is the
        // length of the run that touches it. It only counts as current if
        // that date is today or yesterday.
        let most_recent = *distinct.iter().next_back().unwrap_or(&today);
        let current = if (today - most_recent).num_days() <= 1 {
            run
        } else {
            0
        };

        Self { current, longest }
    }

    /// Pairwise max, used to aggregate per-habit streaks into a user figure
    pub fn max(self, other: Self) -> Self {
        Self {
            current: self.current.max(other.current),
            longest: self.longest.max(other.longest),
        }
    }
}
