//! Dynamic reflow engine.
//!
//! The schedule always describes what is left to do from now on. Every
//! event rewrites positions from current statuses alone:
//!
//! ```text
//! completed blocks   : fixed history, never overlapping each other
//! anchor             : end of the latest completion (or a started block)
//! non-terminal blocks: laid out back to back from the anchor, plan order
//! skipped blocks     : out of the timeline entirely
//! ```
//!
//! Events on terminal blocks are no-ops, so duplicated UI events and
//! at-least-once persistence replays are harmless.

use chrono::NaiveTime;

use super::{Block, BlockId, BlockStatus, BlockType, CarriedFrom, DaySchedule};
use crate::clock::offset_from;
use crate::error::ValidationError;

/// Longest a single block may be resized to.
pub const MAX_BLOCK_MINUTES: u32 = 24 * 60;

/// What an event did to the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The block was already completed or skipped; nothing changed.
    AlreadyTerminal(BlockStatus),
}

impl Transition {
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

fn non_negative_offset(schedule: &DaySchedule, at: NaiveTime) -> u32 {
    offset_from(schedule.start_time, at).clamp(0, i64::from(u32::MAX)) as u32
}

/// Latest end among completed blocks, ignoring `except`.
fn completed_frontier(schedule: &DaySchedule, except: Option<BlockId>) -> u32 {
    schedule
        .blocks
        .iter()
        .filter(|b| b.status == BlockStatus::Completed && Some(b.id) != except)
        .map(Block::end_offset_minutes)
        .max()
        .unwrap_or(0)
}

/// Lay every non-terminal block out contiguously from the anchor.
fn relayout(schedule: &mut DaySchedule) {
    let mut cursor = schedule.anchor_offset_minutes;
    for block in schedule.blocks.iter_mut().filter(|b| !b.status.is_terminal()) {
        block.start_offset_minutes = cursor;
        cursor = cursor.saturating_add(block.duration_minutes);
    }
}

fn lookup(schedule: &DaySchedule, id: BlockId) -> Result<BlockStatus, ValidationError> {
    schedule
        .block(id)
        .map(|b| b.status)
        .ok_or(ValidationError::UnknownBlock { id, date: schedule.date })
}

/// Mark a block completed at wall-clock time `at`.
///
/// The block ends at `at` (never before the previous completion) and that
/// end becomes the anchor, so finishing early pulls the rest of the day in
/// and finishing late pushes it out.
pub fn on_block_completed(
    schedule: &mut DaySchedule,
    id: BlockId,
    at: NaiveTime,
) -> Result<Transition, ValidationError> {
    let status = lookup(schedule, id)?;
    if status.is_terminal() {
        tracing::debug!(block = id, ?status, "complete on terminal block ignored");
        return Ok(Transition::AlreadyTerminal(status));
    }

    let at = non_negative_offset(schedule, at);
    let frontier = completed_frontier(schedule, Some(id)).max(schedule.anchor_offset_minutes);
    let end = at.max(frontier + 1);

    if let Some(block) = schedule.block_mut(id) {
        let start = block.start_offset_minutes.clamp(frontier, end - 1);
        block.start_offset_minutes = start;
        block.duration_minutes = end - start;
        block.status = BlockStatus::Completed;
    }
    schedule.anchor_offset_minutes = end;
    relayout(schedule);
    Ok(Transition::Applied)
}

/// Mark a block skipped; its minutes leave the day.
///
/// Skipped work is tallied in `skipped_work_minutes` for end-of-day
/// carry-over.
pub fn on_block_skipped(schedule: &mut DaySchedule, id: BlockId) -> Result<Transition, ValidationError> {
    let status = lookup(schedule, id)?;
    if status.is_terminal() {
        tracing::debug!(block = id, ?status, "skip on terminal block ignored");
        return Ok(Transition::AlreadyTerminal(status));
    }

    let mut skipped_work = 0;
    if let Some(block) = schedule.block_mut(id) {
        block.status = BlockStatus::Skipped;
        if block.block_type.is_work() {
            skipped_work = block.duration_minutes;
        }
    }
    schedule.skipped_work_minutes += skipped_work;
    relayout(schedule);
    Ok(Transition::Applied)
}

/// Start a block explicitly at `at`.
///
/// The block moves to the front of the remaining plan and the anchor moves
/// to `at`, so a late start pushes the rest of the day later.
pub fn on_block_started(
    schedule: &mut DaySchedule,
    id: BlockId,
    at: NaiveTime,
) -> Result<Transition, ValidationError> {
    let status = lookup(schedule, id)?;
    if status.is_terminal() {
        tracing::debug!(block = id, ?status, "start on terminal block ignored");
        return Ok(Transition::AlreadyTerminal(status));
    }

    let from = schedule.blocks.iter().position(|b| b.id == id);
    let to = schedule.blocks.iter().position(|b| !b.status.is_terminal());
    if let (Some(from), Some(to)) = (from, to) {
        let block = schedule.blocks.remove(from);
        schedule.blocks.insert(to, block);
    }

    let at = non_negative_offset(schedule, at);
    schedule.anchor_offset_minutes = at.max(completed_frontier(schedule, None));
    schedule.explicit_start = true;
    for block in schedule.blocks.iter_mut().filter(|b| !b.status.is_terminal()) {
        block.status = if block.id == id { BlockStatus::Active } else { BlockStatus::Pending };
    }
    relayout(schedule);
    Ok(Transition::Applied)
}

/// Change a not-yet-finished block's length and shift everything after it.
///
/// The new length must be between 1 and [`MAX_BLOCK_MINUTES`].
pub fn on_block_resized(
    schedule: &mut DaySchedule,
    id: BlockId,
    minutes: u32,
) -> Result<Transition, ValidationError> {
    let status = lookup(schedule, id)?;
    if status.is_terminal() {
        tracing::debug!(block = id, ?status, "resize on terminal block ignored");
        return Ok(Transition::AlreadyTerminal(status));
    }
    if minutes == 0 || minutes > MAX_BLOCK_MINUTES {
        return Err(ValidationError::InvalidDuration { id, minutes });
    }
    if let Some(block) = schedule.block_mut(id) {
        block.duration_minutes = minutes;
    }
    relayout(schedule);
    Ok(Transition::Applied)
}

/// Append a pending block after the current remainder of the day.
pub fn append_block(
    schedule: &mut DaySchedule,
    block_type: BlockType,
    label: String,
    minutes: u32,
    carried_from: Option<CarriedFrom>,
) -> BlockId {
    let id = schedule.next_block_id();
    schedule.blocks.push(Block {
        id,
        label,
        block_type,
        start_offset_minutes: 0,
        duration_minutes: minutes.max(1),
        status: BlockStatus::Pending,
        carried_from,
    });
    relayout(schedule);
    id
}

/// Decide which block is active at `now`.
///
/// Only non-terminal blocks are considered; the one whose `[start, end)`
/// window holds `now` becomes active and every other one goes back to
/// pending. In a gap, nothing is active. Returns the active block id.
pub fn recompute_now(schedule: &mut DaySchedule, now: NaiveTime) -> Option<BlockId> {
    let now = offset_from(schedule.start_time, now);
    let mut active = None;
    for block in schedule.blocks.iter_mut().filter(|b| !b.status.is_terminal()) {
        if active.is_none() && block.contains(now) {
            block.status = BlockStatus::Active;
            active = Some(block.id);
        } else {
            block.status = BlockStatus::Pending;
        }
    }
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{build_schedule, template_by_id};
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn standard() -> DaySchedule {
        build_schedule(
            template_by_id("standard"),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            t(8, 0),
            480,
            0,
        )
    }

    fn starts(s: &DaySchedule) -> Vec<u32> {
        s.blocks.iter().map(|b| b.start_offset_minutes).collect()
    }

    fn assert_no_overlap(s: &DaySchedule) {
        let timeline = s.timeline();
        for pair in timeline.windows(2) {
            assert!(
                pair[0].end_offset_minutes() <= pair[1].start_offset_minutes,
                "{:?} overlaps {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn early_completion_pulls_rest_of_day_in() {
        let mut s = standard();
        assert!(on_block_completed(&mut s, 1, t(9, 30)).unwrap().is_applied());
        let first = s.block(1).unwrap();
        assert_eq!((first.start_offset_minutes, first.duration_minutes), (0, 90));
        assert_eq!(starts(&s), vec![0, 90, 105, 225, 255, 375, 390]);
        assert_eq!(s.anchor_offset_minutes, 90);
        assert_no_overlap(&s);
    }

    #[test]
    fn late_completion_pushes_rest_of_day_out() {
        let mut s = standard();
        on_block_completed(&mut s, 1, t(10, 30)).unwrap();
        assert_eq!(s.block(1).unwrap().duration_minutes, 150);
        assert_eq!(s.block(2).unwrap().start_offset_minutes, 150);
        assert_eq!(s.end_offset_minutes(), 570);
    }

    #[test]
    fn completing_twice_is_a_no_op() {
        let mut once = standard();
        on_block_completed(&mut once, 1, t(9, 45)).unwrap();
        let mut twice = once.clone();
        let second = on_block_completed(&mut twice, 1, t(11, 0)).unwrap();
        assert_eq!(second, Transition::AlreadyTerminal(BlockStatus::Completed));
        assert_eq!(once, twice);
    }

    #[test]
    fn skip_removes_minutes_from_the_day() {
        let mut s = standard();
        on_block_skipped(&mut s, 2).unwrap();
        assert_eq!(s.block(3).unwrap().start_offset_minutes, 120);
        assert_eq!(s.skipped_work_minutes, 0);

        on_block_skipped(&mut s, 3).unwrap();
        assert_eq!(s.skipped_work_minutes, 120);
        assert_eq!(s.block(4).unwrap().start_offset_minutes, 120);
        assert_eq!(s.end_offset_minutes(), 540 - 135);

        let again = on_block_skipped(&mut s, 3).unwrap();
        assert!(!again.is_applied());
        assert_eq!(s.skipped_work_minutes, 120);
        assert_no_overlap(&s);
    }

    #[test]
    fn out_of_order_completion_keeps_timeline_consistent() {
        let mut s = standard();
        on_block_completed(&mut s, 3, t(9, 0)).unwrap();
        on_block_completed(&mut s, 1, t(10, 0)).unwrap();
        assert_eq!(s.block(3).unwrap().end_offset_minutes(), 60);
        let first = s.block(1).unwrap();
        assert_eq!((first.start_offset_minutes, first.end_offset_minutes()), (60, 120));
        assert_eq!(s.block(2).unwrap().start_offset_minutes, 120);
        assert_no_overlap(&s);
    }

    #[test]
    fn completion_before_day_start_still_takes_a_minute() {
        let mut s = standard();
        on_block_completed(&mut s, 1, t(7, 0)).unwrap();
        let first = s.block(1).unwrap();
        assert_eq!((first.start_offset_minutes, first.duration_minutes), (0, 1));
        assert_eq!(s.block(2).unwrap().start_offset_minutes, 1);
    }

    #[test]
    fn recompute_now_marks_single_active_block() {
        let mut s = standard();
        assert_eq!(recompute_now(&mut s, t(10, 5)), Some(2));
        assert_eq!(s.block(2).unwrap().status, BlockStatus::Active);
        assert_eq!(recompute_now(&mut s, t(10, 20)), Some(3));
        assert_eq!(s.block(2).unwrap().status, BlockStatus::Pending);
        let active = s.blocks.iter().filter(|b| b.status == BlockStatus::Active).count();
        assert_eq!(active, 1);
    }

    #[test]
    fn recompute_now_in_gap_or_outside_day() {
        let mut s = standard();
        on_block_completed(&mut s, 1, t(9, 0)).unwrap();
        on_block_skipped(&mut s, 2).unwrap();
        on_block_skipped(&mut s, 3).unwrap();
        assert_eq!(recompute_now(&mut s, t(7, 59)), None);
        assert_eq!(recompute_now(&mut s, t(23, 0)), None);
        // only the completed block covers 08:30, and completed never goes active
        assert_eq!(recompute_now(&mut s, t(8, 30)), None);
    }

    #[test]
    fn started_block_moves_to_front_and_anchors() {
        let mut s = standard();
        on_block_started(&mut s, 3, t(8, 10)).unwrap();
        assert_eq!(s.blocks[0].id, 3);
        assert_eq!(s.block(3).unwrap().status, BlockStatus::Active);
        assert_eq!(s.block(3).unwrap().start_offset_minutes, 10);
        assert_eq!(s.block(1).unwrap().start_offset_minutes, 130);
        assert_eq!(recompute_now(&mut s, t(8, 15)), Some(3));
    }

    #[test]
    fn resize_shifts_following_blocks() {
        let mut s = standard();
        on_block_resized(&mut s, 1, 90).unwrap();
        assert_eq!(s.block(2).unwrap().start_offset_minutes, 90);
        assert!(on_block_resized(&mut s, 1, 0).is_err());
        on_block_completed(&mut s, 1, t(9, 30)).unwrap();
        assert!(!on_block_resized(&mut s, 1, 30).unwrap().is_applied());
    }

    #[test]
    fn oversized_resize_is_rejected() {
        let mut s = standard();
        let before = s.clone();
        assert!(matches!(
            on_block_resized(&mut s, 1, u32::MAX),
            Err(ValidationError::InvalidDuration { id: 1, minutes: u32::MAX })
        ));
        assert!(on_block_resized(&mut s, 3, MAX_BLOCK_MINUTES + 1).is_err());
        assert_eq!(s, before);

        assert!(on_block_resized(&mut s, 3, MAX_BLOCK_MINUTES).unwrap().is_applied());
        assert_eq!(s.block(4).unwrap().start_offset_minutes, 135 + MAX_BLOCK_MINUTES);
        assert_no_overlap(&s);
    }

    #[test]
    fn start_at_day_start_marks_day_touched() {
        let mut s = standard();
        on_block_started(&mut s, 3, t(8, 0)).unwrap();
        assert_eq!(s.anchor_offset_minutes, 0);
        assert!(!s.is_untouched());
    }

    #[test]
    fn unknown_block_is_an_error() {
        let mut s = standard();
        assert!(matches!(
            on_block_completed(&mut s, 99, t(9, 0)),
            Err(ValidationError::UnknownBlock { id: 99, .. })
        ));
    }

    #[test]
    fn appended_block_goes_after_remainder() {
        let mut s = standard();
        on_block_completed(&mut s, 1, t(10, 0)).unwrap();
        let id = append_block(&mut s, BlockType::Work, "Extra".into(), 45, None);
        assert_eq!(id, 8);
        let extra = s.block(id).unwrap();
        assert_eq!(extra.start_offset_minutes, 540);
        assert_no_overlap(&s);
    }
}
