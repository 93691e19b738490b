//! XP, levels and achievements.

pub mod achievements;
pub mod level;
pub mod rewards;
pub mod state;

pub use achievements::{AchievementCategory, AchievementDefinition, UnlockedAchievement, ACHIEVEMENTS};
pub use level::{level_for, next_level_for, sanitize_xp, LevelDefinition, LevelProgress, LEVEL_CURVE};
pub use rewards::{DayMilestone, XpAction};
pub use state::{GamificationState, ProgressCounters};
pub use achievements::evaluate as evaluate_achievements;

use crate::error::Result;

/// The gamification collaborator.
///
/// Awards are fire-and-forget from the planner's side: a failure is logged
/// and the schedule keeps moving.
pub trait XpSink {
    fn award_xp(&mut self, amount: u32, reason: &str) -> Result<()>;
}

/// Storage for the raw progression counters.
pub trait ProgressStore {
    fn load_counters(&self) -> Result<ProgressCounters>;
    fn save_counters(&mut self, counters: &ProgressCounters) -> Result<()>;
}
