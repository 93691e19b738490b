//! Derived statistics for one day's schedule.
//!
//! Everything here is recomputed from the schedule and the caller's "now";
//! nothing is stored.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::{BlockStatus, DaySchedule};
use crate::clock::{format_offset, offset_from};

/// Percentage points a day may lag behind elapsed time and still be on track.
pub const ON_TRACK_TOLERANCE: f64 = 10.0;

/// Snapshot of a day's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// Work minutes across non-skipped blocks
    pub total_work_minutes: u32,
    /// Break and lunch minutes across non-skipped blocks
    pub break_minutes: u32,
    pub completed_work_minutes: u32,
    /// Work minutes in pending or active blocks
    pub remaining_work_minutes: u32,
    pub skipped_work_minutes: u32,
    /// Completed work blocks
    pub completed_blocks: usize,
    /// Non-skipped work blocks
    pub total_blocks: usize,
    /// Completed share of planned work (0 to 100)
    pub progress_percent: f64,
    /// Share of the day's span already elapsed at `now` (0 to 100)
    pub expected_percent: f64,
    pub is_on_track: bool,
    /// Wall-clock end of the last remaining block, "HH:MM"
    pub estimated_end: String,
}

impl ScheduleStats {
    pub fn compute(schedule: &DaySchedule, now: NaiveTime) -> Self {
        let mut total_work_minutes = 0;
        let mut break_minutes = 0;
        let mut completed_work_minutes = 0;
        let mut remaining_work_minutes = 0;
        let mut completed_blocks = 0;
        let mut total_blocks = 0;

        for block in schedule.blocks.iter().filter(|b| b.status != BlockStatus::Skipped) {
            if block.block_type.is_break() {
                break_minutes += block.duration_minutes;
            }
            if !block.block_type.is_work() {
                continue;
            }
            total_blocks += 1;
            total_work_minutes += block.duration_minutes;
            if block.status == BlockStatus::Completed {
                completed_blocks += 1;
                completed_work_minutes += block.duration_minutes;
            } else {
                remaining_work_minutes += block.duration_minutes;
            }
        }

        let progress_percent = percent(completed_work_minutes, total_work_minutes);
        let span = schedule.end_offset_minutes();
        let elapsed = offset_from(schedule.start_time, now).clamp(0, i64::from(span)) as u32;
        let expected_percent = percent(elapsed, span);

        Self {
            total_work_minutes,
            break_minutes,
            completed_work_minutes,
            remaining_work_minutes,
            skipped_work_minutes: schedule.skipped_work_minutes,
            completed_blocks,
            total_blocks,
            progress_percent,
            expected_percent,
            is_on_track: progress_percent >= expected_percent - ON_TRACK_TOLERANCE,
            estimated_end: format_offset(schedule.start_time, span),
        }
    }
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (f64::from(part) / f64::from(whole) * 100.0).min(100.0)
}
