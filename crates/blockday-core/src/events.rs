use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::carry_over::CarryOverResolution;
use crate::progression::DayMilestone;
use crate::schedule::{BlockId, BlockType};

/// Every state change in the planner produces an Event.
/// The host drains them after each call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ScheduleBuilt {
        date: NaiveDate,
        template_id: String,
        blocks: usize,
        carried_minutes: u32,
        at: NaiveDateTime,
    },
    BlockStarted {
        block_id: BlockId,
        at: NaiveDateTime,
    },
    /// `recompute_now` switched the active block (or cleared it in a gap).
    BlockActivated {
        block_id: Option<BlockId>,
        at: NaiveDateTime,
    },
    BlockCompleted {
        block_id: BlockId,
        block_type: BlockType,
        duration_minutes: u32,
        at: NaiveDateTime,
    },
    BlockSkipped {
        block_id: BlockId,
        block_type: BlockType,
        at: NaiveDateTime,
    },
    BlockResized {
        block_id: BlockId,
        duration_minutes: u32,
        at: NaiveDateTime,
    },
    XpAwarded {
        amount: u32,
        reason: String,
        total_xp: u64,
        at: NaiveDateTime,
    },
    LevelUp {
        level: u32,
        title: String,
        at: NaiveDateTime,
    },
    MilestoneReached {
        milestone: DayMilestone,
        bonus_xp: u32,
        at: NaiveDateTime,
    },
    AchievementUnlocked {
        achievement_id: String,
        xp_reward: u32,
        at: NaiveDateTime,
    },
    CarryOverOffered {
        source_date: NaiveDate,
        block_ids: Vec<BlockId>,
        total_minutes: u32,
        at: NaiveDateTime,
    },
    CarryOverAccepted {
        source_date: NaiveDate,
        resolution: CarryOverResolution,
        at: NaiveDateTime,
    },
    CarryOverDismissed {
        source_date: NaiveDate,
        at: NaiveDateTime,
    },
}
