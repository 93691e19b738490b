//! Day schedule types: blocks, statuses and the per-date schedule.
//!
//! Positions are minute offsets from the day's start time. Blocks keep their
//! plan order in `DaySchedule::blocks`; the reflow engine rewrites offsets so
//! that non-skipped blocks never overlap.

pub mod builder;
pub mod reflow;
pub mod stats;
pub mod template;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::progression::DayMilestone;

pub use builder::{build_schedule, ScheduleBuilder};
pub use reflow::{
    append_block, on_block_completed, on_block_resized, on_block_skipped, on_block_started,
    recompute_now, Transition,
};
pub use stats::ScheduleStats;
pub use template::{catalog, template_by_id, BlockTemplate, TemplateBlock, DEFAULT_TEMPLATE_ID};

/// Identifier of a block, unique within one day.
pub type BlockId = u32;

/// Kind of schedule block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    /// Focused work
    Work,
    /// Short rest
    Break,
    /// Meal break
    Lunch,
    /// Flexible work time
    Flex,
    /// User-defined category, neither work nor break
    Custom(String),
}

impl BlockType {
    /// Counts toward the day's work total and carry-over.
    pub fn is_work(&self) -> bool {
        matches!(self, BlockType::Work | BlockType::Flex)
    }

    pub fn is_break(&self) -> bool {
        matches!(self, BlockType::Break | BlockType::Lunch)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockStatus {
    Pending,
    Active,
    Completed,
    Skipped,
}

impl BlockStatus {
    /// Completed and skipped blocks never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, BlockStatus::Completed | BlockStatus::Skipped)
    }
}

/// Attribution for a block carried over from an earlier day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarriedFrom {
    pub source_date: NaiveDate,
    pub source_block_ids: Vec<BlockId>,
}

/// A single planned time segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub label: String,
    pub block_type: BlockType,
    pub start_offset_minutes: u32,
    /// Always at least 1.
    pub duration_minutes: u32,
    pub status: BlockStatus,
    #[serde(default)]
    pub carried_from: Option<CarriedFrom>,
}

impl Block {
    pub fn end_offset_minutes(&self) -> u32 {
        self.start_offset_minutes.saturating_add(self.duration_minutes)
    }

    /// Whether `offset` (minutes from day start) falls in `[start, end)`.
    pub fn contains(&self, offset: i64) -> bool {
        offset >= i64::from(self.start_offset_minutes) && offset < i64::from(self.end_offset_minutes())
    }
}

/// The plan for one calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub template_id: String,
    pub target_work_minutes: u32,
    /// Minutes injected from the previous day's carry-over.
    pub carried_minutes: u32,
    /// Offset the remaining (non-terminal) blocks are laid out from.
    #[serde(default)]
    pub anchor_offset_minutes: u32,
    /// Work minutes dropped by skips; feeds end-of-day carry-over.
    #[serde(default)]
    pub skipped_work_minutes: u32,
    /// Set once a block has been started by hand.
    #[serde(default)]
    pub explicit_start: bool,
    /// Milestones already awarded today.
    #[serde(default)]
    pub milestones: Vec<DayMilestone>,
    pub blocks: Vec<Block>,
}

impl DaySchedule {
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn next_block_id(&self) -> BlockId {
        self.blocks.iter().map(|b| b.id).max().unwrap_or(0) + 1
    }

    /// No block has been explicitly started, completed or skipped yet.
    ///
    /// A block marked active by `recompute_now` alone does not count.
    pub fn is_untouched(&self) -> bool {
        !self.explicit_start
            && self.anchor_offset_minutes == 0
            && self.blocks.iter().all(|b| !b.status.is_terminal())
    }

    pub fn active_block(&self) -> Option<&Block> {
        self.blocks.iter().find(|b| b.status == BlockStatus::Active)
    }

    /// First pending block in plan order.
    pub fn next_block(&self) -> Option<&Block> {
        self.blocks.iter().find(|b| b.status == BlockStatus::Pending)
    }

    pub fn work_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.block_type.is_work())
    }

    /// Work minutes across all non-skipped blocks.
    pub fn total_work_minutes(&self) -> u32 {
        self.work_blocks()
            .filter(|b| b.status != BlockStatus::Skipped)
            .map(|b| b.duration_minutes)
            .sum()
    }

    pub fn completed_work_blocks(&self) -> usize {
        self.work_blocks()
            .filter(|b| b.status == BlockStatus::Completed)
            .count()
    }

    /// Work blocks left unfinished, in plan order.
    ///
    /// Pending and active blocks always count; skipped ones only when
    /// `include_skipped` is set.
    pub fn incomplete_work_blocks(&self, include_skipped: bool) -> Vec<&Block> {
        self.work_blocks()
            .filter(|b| match b.status {
                BlockStatus::Pending | BlockStatus::Active => true,
                BlockStatus::Skipped => include_skipped,
                BlockStatus::Completed => false,
            })
            .collect()
    }

    /// End of the latest non-skipped block.
    pub fn end_offset_minutes(&self) -> u32 {
        self.blocks
            .iter()
            .filter(|b| b.status != BlockStatus::Skipped)
            .map(Block::end_offset_minutes)
            .max()
            .unwrap_or(0)
    }

    /// Every work block is completed.
    pub fn is_complete(&self) -> bool {
        let mut work = self.work_blocks().peekable();
        work.peek().is_some() && work.all(|b| b.status == BlockStatus::Completed)
    }

    /// Non-skipped blocks sorted by start time, for display.
    pub fn timeline(&self) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self
            .blocks
            .iter()
            .filter(|b| b.status != BlockStatus::Skipped)
            .collect();
        blocks.sort_by_key(|b| (b.start_offset_minutes, b.id));
        blocks
    }
}

/// Per-date schedule storage. Writes are whole-record and last-write-wins.
pub trait ScheduleStore {
    fn load_schedule(&self, date: NaiveDate) -> Result<Option<DaySchedule>>;
    fn save_schedule(&mut self, schedule: &DaySchedule) -> Result<()>;
}

/// "HH:MM" serde for start times; malformed stored values fall back to 08:00.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(crate::clock::time_or_default(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: BlockId, block_type: BlockType, start: u32, duration: u32, status: BlockStatus) -> Block {
        Block {
            id,
            label: format!("Block {id}"),
            block_type,
            start_offset_minutes: start,
            duration_minutes: duration,
            status,
            carried_from: None,
        }
    }

    fn schedule(blocks: Vec<Block>) -> DaySchedule {
        DaySchedule {
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            template_id: "standard".into(),
            target_work_minutes: 480,
            carried_minutes: 0,
            anchor_offset_minutes: 0,
            skipped_work_minutes: 0,
            explicit_start: false,
            milestones: vec![],
            blocks,
        }
    }

    #[test]
    fn block_type_classification() {
        assert!(BlockType::Work.is_work());
        assert!(BlockType::Flex.is_work());
        assert!(BlockType::Lunch.is_break());
        let custom = BlockType::Custom("Reading".into());
        assert!(!custom.is_work() && !custom.is_break());
    }

    #[test]
    fn schedule_serializes_start_time_as_hhmm() {
        let s = schedule(vec![block(1, BlockType::Work, 0, 60, BlockStatus::Pending)]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["start_time"], "08:00");
        assert_eq!(json["blocks"][0]["block_type"], "WORK");
        assert_eq!(json["blocks"][0]["status"], "PENDING");
        let decoded: DaySchedule = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, s);
    }

    #[test]
    fn incomplete_work_respects_skip_flag() {
        let s = schedule(vec![
            block(1, BlockType::Work, 0, 60, BlockStatus::Completed),
            block(2, BlockType::Break, 60, 15, BlockStatus::Pending),
            block(3, BlockType::Work, 75, 60, BlockStatus::Skipped),
            block(4, BlockType::Flex, 75, 30, BlockStatus::Active),
        ]);
        let ids: Vec<_> = s.incomplete_work_blocks(false).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![4]);
        let ids: Vec<_> = s.incomplete_work_blocks(true).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(s.total_work_minutes(), 90);
        assert_eq!(s.end_offset_minutes(), 105);
        assert!(!s.is_complete());
    }

    #[test]
    fn timeline_excludes_skipped_and_sorts() {
        let s = schedule(vec![
            block(1, BlockType::Work, 90, 60, BlockStatus::Pending),
            block(2, BlockType::Work, 0, 90, BlockStatus::Completed),
            block(3, BlockType::Break, 0, 15, BlockStatus::Skipped),
        ]);
        let ids: Vec<_> = s.timeline().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(s.next_block_id(), 4);
    }
}
