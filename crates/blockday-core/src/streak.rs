//! Streak and weekly-activity calculator.
//!
//! Two views of the same idea:
//! - [`compute_streak`] derives the current streak from a Monday-first
//!   7-slot weekly-hours array, for display.
//! - [`StreakRecord`] is the persisted day-to-day counter that also keeps the
//!   longest streak ever reached.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::clock::{is_yesterday, weekday_index, worked_on};

/// Result of [`compute_streak`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current_streak: u32,
    /// Monday-first; `true` when the day has recorded hours.
    pub week_activity: [bool; 7],
    pub days_worked: u32,
    pub worked_today: bool,
}

/// Derive the current streak from this week's hours.
///
/// The walk starts at today when today counts as worked, otherwise at
/// yesterday: a streak is not broken until a full day passes with nothing
/// logged. It stops at the first idle day or at Monday.
pub fn compute_streak(weekly_hours: &[f64; 7], today: Weekday, today_has_entries: bool) -> StreakSummary {
    let mut week_activity = [false; 7];
    for (slot, hours) in week_activity.iter_mut().zip(weekly_hours.iter()) {
        *slot = worked_on(*hours, false);
    }

    let today_idx = weekday_index(today);
    let worked_today = worked_on(weekly_hours[today_idx], today_has_entries);

    let start = if worked_today {
        Some(today_idx)
    } else {
        today_idx.checked_sub(1)
    };

    let mut current_streak = 0;
    if let Some(start) = start {
        for idx in (0..=start).rev() {
            let active = if idx == today_idx { worked_today } else { week_activity[idx] };
            if !active {
                break;
            }
            current_streak += 1;
        }
    }

    StreakSummary {
        current_streak,
        week_activity,
        days_worked: week_activity.iter().filter(|a| **a).count() as u32,
        worked_today,
    }
}

/// Persisted streak counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub current_streak: u32,
    /// Never decreases.
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
}

impl StreakRecord {
    /// Register work on `today`.
    ///
    /// Same day is a no-op, the day after the last activity extends the
    /// streak, anything else restarts it at 1.
    pub fn record_activity(&mut self, today: NaiveDate) {
        match self.last_activity_date {
            Some(last) if last == today => return,
            Some(last) if is_yesterday(last, today) => self.current_streak += 1,
            Some(last) if last > today => {
                tracing::debug!(%last, %today, "activity date earlier than last recorded, ignoring");
                return;
            }
            _ => self.current_streak = 1,
        }
        self.last_activity_date = Some(today);
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    /// Streak as seen on `today` without recording activity.
    ///
    /// Still alive when the last activity was today or yesterday.
    pub fn current_as_of(&self, today: NaiveDate) -> u32 {
        match self.last_activity_date {
            Some(last) if last == today || is_yesterday(last, today) => self.current_streak,
            _ => 0,
        }
    }
}
