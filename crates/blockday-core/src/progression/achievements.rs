//! Achievement catalog and unlock evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::ProgressCounters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Streak,
    Productivity,
    Consistency,
    Focus,
}

#[derive(Debug, Clone, Copy)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    pub requirement: u64,
    pub xp_reward: u32,
}

pub const ACHIEVEMENTS: [AchievementDefinition; 13] = [
    AchievementDefinition { id: "streak_3", name: "Getting Started", description: "Work 3 days in a row", category: AchievementCategory::Streak, requirement: 3, xp_reward: 100 },
    AchievementDefinition { id: "streak_7", name: "Week Warrior", description: "Work 7 days in a row", category: AchievementCategory::Streak, requirement: 7, xp_reward: 250 },
    AchievementDefinition { id: "streak_14", name: "Fortnight Fighter", description: "Work 14 days in a row", category: AchievementCategory::Streak, requirement: 14, xp_reward: 500 },
    AchievementDefinition { id: "streak_30", name: "Monthly Master", description: "Work 30 days in a row", category: AchievementCategory::Streak, requirement: 30, xp_reward: 1000 },
    AchievementDefinition { id: "hours_10", name: "First Steps", description: "Log 10 hours of work", category: AchievementCategory::Productivity, requirement: 10, xp_reward: 50 },
    AchievementDefinition { id: "hours_50", name: "Dedicated", description: "Log 50 hours of work", category: AchievementCategory::Productivity, requirement: 50, xp_reward: 200 },
    AchievementDefinition { id: "hours_100", name: "Century Club", description: "Log 100 hours of work", category: AchievementCategory::Productivity, requirement: 100, xp_reward: 500 },
    AchievementDefinition { id: "hours_500", name: "Half Millennium", description: "Log 500 hours of work", category: AchievementCategory::Productivity, requirement: 500, xp_reward: 1500 },
    AchievementDefinition { id: "sessions_10", name: "Regular", description: "Complete 10 work sessions", category: AchievementCategory::Consistency, requirement: 10, xp_reward: 75 },
    AchievementDefinition { id: "sessions_50", name: "Reliable", description: "Complete 50 work sessions", category: AchievementCategory::Consistency, requirement: 50, xp_reward: 300 },
    AchievementDefinition { id: "sessions_100", name: "Dependable", description: "Complete 100 work sessions", category: AchievementCategory::Consistency, requirement: 100, xp_reward: 750 },
    AchievementDefinition { id: "focus_10", name: "Focus Finder", description: "Complete 10 focus sessions", category: AchievementCategory::Focus, requirement: 10, xp_reward: 100 },
    AchievementDefinition { id: "focus_50", name: "Deep Thinker", description: "Complete 50 focus sessions", category: AchievementCategory::Focus, requirement: 50, xp_reward: 400 },
];

impl AchievementDefinition {
    /// Current progress value this achievement is measured against.
    pub fn progress(&self, counters: &ProgressCounters) -> u64 {
        match self.category {
            AchievementCategory::Streak => u64::from(counters.current_streak.max(counters.longest_streak)),
            AchievementCategory::Productivity => counters.total_work_minutes / 60,
            AchievementCategory::Consistency => counters.total_sessions,
            AchievementCategory::Focus => counters.focus_sessions,
        }
    }
}

/// An achievement that has been unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Unlock every achievement whose requirement is now met.
///
/// Already-unlocked ids are skipped, so the returned list only holds newly
/// unlocked definitions and their XP is awarded exactly once.
pub fn evaluate(counters: &mut ProgressCounters, at: DateTime<Utc>) -> Vec<&'static AchievementDefinition> {
    let mut newly = Vec::new();
    for def in ACHIEVEMENTS.iter() {
        if counters.achievements.iter().any(|a| a.id == def.id) {
            continue;
        }
        if def.progress(counters) >= def.requirement {
            counters.achievements.push(UnlockedAchievement {
                id: def.id.to_string(),
                unlocked_at: at,
            });
            newly.push(def);
        }
    }
    newly
}
