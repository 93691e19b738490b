//! Level curve and XP/level calculator.
//!
//! The curve is a data table, not a chain of conditionals: `level_for` is a
//! monotonic lookup over thresholds that start at zero and strictly increase.

use serde::{Deserialize, Serialize};

/// One row of the level curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelDefinition {
    pub level: u32,
    /// Cumulative XP needed to reach this level.
    pub threshold: u64,
    pub title: &'static str,
    pub color: &'static str,
}

pub const LEVEL_CURVE: [LevelDefinition; 10] = [
    LevelDefinition { level: 1, threshold: 0, title: "Apprentice", color: "#a0a0a0" },
    LevelDefinition { level: 2, threshold: 100, title: "Worker", color: "#4ade80" },
    LevelDefinition { level: 3, threshold: 300, title: "Craftsman", color: "#22c55e" },
    LevelDefinition { level: 4, threshold: 600, title: "Journeyman", color: "#3b82f6" },
    LevelDefinition { level: 5, threshold: 1000, title: "Artisan", color: "#6366f1" },
    LevelDefinition { level: 6, threshold: 1500, title: "Expert", color: "#8b5cf6" },
    LevelDefinition { level: 7, threshold: 2500, title: "Master", color: "#a855f7" },
    LevelDefinition { level: 8, threshold: 4000, title: "Grandmaster", color: "#cca43b" },
    LevelDefinition { level: 9, threshold: 6000, title: "Legend", color: "#f59e0b" },
    LevelDefinition { level: 10, threshold: 10000, title: "Mythic", color: "#ef4444" },
];

/// Threshold of the last level; XP is saturated here for lookups.
pub fn max_threshold() -> u64 {
    LEVEL_CURVE[LEVEL_CURVE.len() - 1].threshold
}

/// Coerce a raw (possibly negative or NaN) XP value into the lookup range.
pub fn sanitize_xp(raw: f64) -> u64 {
    if raw.is_nan() || raw < 0.0 {
        tracing::debug!(raw, "invalid XP value coerced to 0");
        return 0;
    }
    // float -> int casts saturate, so +inf lands on u64::MAX before the clamp
    (raw.floor() as u64).min(max_threshold())
}

/// Highest level whose threshold is `<= xp`.
pub fn level_for(xp: u64) -> &'static LevelDefinition {
    let xp = xp.min(max_threshold());
    // partition_point needs the predicate to be true for a prefix, which the
    // strictly increasing thresholds guarantee.
    let idx = LEVEL_CURVE.partition_point(|l| l.threshold <= xp);
    &LEVEL_CURVE[idx.saturating_sub(1)]
}

/// First level whose threshold is `> xp`, or `None` at max level.
pub fn next_level_for(xp: u64) -> Option<&'static LevelDefinition> {
    let xp = xp.min(max_threshold());
    LEVEL_CURVE.iter().find(|l| l.threshold > xp)
}

/// Derived level display values for a total XP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub title: String,
    pub color: String,
    /// XP earned since reaching the current level.
    pub current_level_xp: u64,
    /// XP span of the current level; 0 at max level.
    pub next_level_xp: u64,
}

impl LevelProgress {
    pub fn from_xp(total_xp: u64) -> Self {
        let xp = total_xp.min(max_threshold());
        let current = level_for(xp);
        let next_level_xp = next_level_for(xp)
            .map(|next| next.threshold - current.threshold)
            .unwrap_or(0);
        Self {
            level: current.level,
            title: current.title.to_string(),
            color: current.color.to_string(),
            current_level_xp: xp - current.threshold,
            next_level_xp,
        }
    }

    /// Same as [`LevelProgress::from_xp`] for unchecked input.
    pub fn from_raw(raw_xp: f64) -> Self {
        Self::from_xp(sanitize_xp(raw_xp))
    }

    pub fn is_max_level(&self) -> bool {
        self.next_level_xp == 0
    }

    /// 0.0 .. 100.0 progress toward the next level (100 at max level).
    pub fn percent(&self) -> f64 {
        if self.next_level_xp == 0 {
            return 100.0;
        }
        (self.current_level_xp as f64 / self.next_level_xp as f64 * 100.0).min(100.0)
    }
}
