//! Stored progression counters and the derived gamification view.
//!
//! Only `total_xp` and the raw counters are persisted; level, title, color
//! and progress are recomputed on every read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::achievements::UnlockedAchievement;
use super::level::LevelProgress;
use crate::streak::StreakRecord;

/// Raw, persisted progression counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressCounters {
    /// Monotonically non-decreasing.
    pub total_xp: u64,
    pub total_work_minutes: u64,
    pub total_sessions: u64,
    pub focus_sessions: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
    #[serde(default)]
    pub achievements: Vec<UnlockedAchievement>,
}

impl ProgressCounters {
    /// Add XP; totals never go down.
    pub fn add_xp(&mut self, amount: u32) {
        self.total_xp = self.total_xp.saturating_add(u64::from(amount));
    }

    /// Count one finished work block of `minutes`.
    pub fn record_work_block(&mut self, minutes: u32) {
        self.total_work_minutes = self.total_work_minutes.saturating_add(u64::from(minutes));
        self.total_sessions += 1;
        self.focus_sessions += 1;
    }

    pub fn streak(&self) -> StreakRecord {
        StreakRecord {
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            last_activity_date: self.last_activity_date,
        }
    }

    pub fn set_streak(&mut self, record: StreakRecord) {
        self.current_streak = record.current_streak;
        self.longest_streak = record.longest_streak;
        self.last_activity_date = record.last_activity_date;
    }
}

/// Read model combining counters with the level curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamificationState {
    pub total_xp: u64,
    pub level: u32,
    pub level_title: String,
    pub level_color: String,
    pub current_level_xp: u64,
    /// 0 at max level.
    pub next_level_xp: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_hours_worked: f64,
    pub total_sessions: u64,
    pub focus_sessions: u64,
    pub achievements_unlocked: usize,
}

impl GamificationState {
    pub fn from_counters(counters: &ProgressCounters) -> Self {
        let progress = LevelProgress::from_xp(counters.total_xp);
        Self {
            total_xp: counters.total_xp,
            level: progress.level,
            level_title: progress.title,
            level_color: progress.color,
            current_level_xp: progress.current_level_xp,
            next_level_xp: progress.next_level_xp,
            current_streak: counters.current_streak,
            longest_streak: counters.longest_streak,
            total_hours_worked: counters.total_work_minutes as f64 / 60.0,
            total_sessions: counters.total_sessions,
            focus_sessions: counters.focus_sessions,
            achievements_unlocked: counters.achievements.len(),
        }
    }
}

impl From<&ProgressCounters> for GamificationState {
    fn from(counters: &ProgressCounters) -> Self {
        Self::from_counters(counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_state_follows_total_xp() {
        let mut counters = ProgressCounters::default();
        counters.add_xp(90);
        assert_eq!(GamificationState::from(&counters).level, 1);
        counters.add_xp(10);
        let state = GamificationState::from(&counters);
        assert_eq!(state.level, 2);
        assert_eq!(state.level_title, "Worker");
        assert_eq!(state.current_level_xp, 0);
        assert_eq!(state.next_level_xp, 200);
    }

    #[test]
    fn hours_are_derived_from_minutes() {
        let mut counters = ProgressCounters::default();
        counters.record_work_block(90);
        counters.record_work_block(30);
        let state = GamificationState::from(&counters);
        assert_eq!(state.total_sessions, 2);
        assert!((state.total_hours_worked - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn xp_saturates_instead_of_wrapping() {
        let mut counters = ProgressCounters {
            total_xp: u64::MAX - 1,
            ..Default::default()
        };
        counters.add_xp(10);
        assert_eq!(counters.total_xp, u64::MAX);
        assert_eq!(GamificationState::from(&counters).next_level_xp, 0);
    }
}
