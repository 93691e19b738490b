//! Daily schedule builder.
//!
//! Expands a template into an ordered, contiguous block list. Work-type
//! blocks are scaled so the day's work matches the target; breaks keep
//! their template length. A carried-over work block, when present, leads
//! the day and pushes everything else later.

use chrono::{NaiveDate, NaiveTime};

use super::template::BlockTemplate;
use super::{Block, BlockId, BlockStatus, BlockType, CarriedFrom, DaySchedule};

/// Label for the block injected by carry-over.
pub fn carried_label(minutes: u32) -> String {
    format!("Carry-over Work (+{minutes}m from yesterday)")
}

/// Builder for a [`DaySchedule`].
#[derive(Debug, Clone)]
pub struct ScheduleBuilder<'a> {
    template: &'a BlockTemplate,
    date: NaiveDate,
    start_time: NaiveTime,
    target_work_minutes: Option<u32>,
    carried_minutes: u32,
    carried_from: Option<CarriedFrom>,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(template: &'a BlockTemplate, date: NaiveDate) -> Self {
        Self {
            template,
            date,
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            target_work_minutes: None,
            carried_minutes: 0,
            carried_from: None,
        }
    }

    pub fn start_time(mut self, start_time: NaiveTime) -> Self {
        self.start_time = start_time;
        self
    }

    /// Work minutes for the day; defaults to the template's composition.
    pub fn target_work_minutes(mut self, minutes: u32) -> Self {
        self.target_work_minutes = Some(minutes);
        self
    }

    pub fn carried_minutes(mut self, minutes: u32) -> Self {
        self.carried_minutes = minutes;
        self
    }

    pub fn carried_from(mut self, source: CarriedFrom) -> Self {
        self.carried_from = Some(source);
        self
    }

    pub fn build(self) -> DaySchedule {
        let nominal = self.template.composed_work_minutes();
        let target = self.target_work_minutes.unwrap_or(nominal);
        let durations = scale_work_durations(self.template, target);

        let mut blocks = Vec::with_capacity(self.template.blocks.len() + 1);
        let mut next_id: BlockId = 1;
        let mut cursor = 0u32;

        if self.carried_minutes > 0 {
            blocks.push(Block {
                id: next_id,
                label: carried_label(self.carried_minutes),
                block_type: BlockType::Work,
                start_offset_minutes: cursor,
                duration_minutes: self.carried_minutes,
                status: BlockStatus::Pending,
                carried_from: self.carried_from.clone(),
            });
            next_id += 1;
            cursor += self.carried_minutes;
        }

        for (template_block, duration) in self.template.blocks.iter().zip(durations) {
            blocks.push(Block {
                id: next_id,
                label: template_block.label.to_string(),
                block_type: template_block.block_type.clone(),
                start_offset_minutes: cursor,
                duration_minutes: duration,
                status: BlockStatus::Pending,
                carried_from: None,
            });
            next_id += 1;
            cursor += duration;
        }

        DaySchedule {
            date: self.date,
            start_time: self.start_time,
            template_id: self.template.id.to_string(),
            target_work_minutes: target,
            carried_minutes: self.carried_minutes,
            anchor_offset_minutes: 0,
            skipped_work_minutes: 0,
            explicit_start: false,
            milestones: Vec::new(),
            blocks,
        }
    }
}

/// Build a schedule in one call.
pub fn build_schedule(
    template: &BlockTemplate,
    date: NaiveDate,
    start_time: NaiveTime,
    target_work_minutes: u32,
    carried_minutes: u32,
) -> DaySchedule {
    ScheduleBuilder::new(template, date)
        .start_time(start_time)
        .target_work_minutes(target_work_minutes)
        .carried_minutes(carried_minutes)
        .build()
}

/// Per-block durations with work blocks scaled to `target`.
///
/// Rounding drift is settled on the last work blocks so the sum is exact
/// whenever every block can stay at or above one minute.
fn scale_work_durations(template: &BlockTemplate, target: u32) -> Vec<u32> {
    let nominal = template.composed_work_minutes();
    let mut durations: Vec<u32> = template.blocks.iter().map(|b| b.duration_minutes.max(1)).collect();
    if nominal == 0 || target == nominal {
        return durations;
    }

    let work_idx: Vec<usize> = template
        .blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.block_type.is_work())
        .map(|(i, _)| i)
        .collect();

    for &i in &work_idx {
        let scaled = (u64::from(template.blocks[i].duration_minutes) * u64::from(target) + u64::from(nominal) / 2)
            / u64::from(nominal);
        durations[i] = (scaled as u32).max(1);
    }

    let sum: i64 = work_idx.iter().map(|&i| i64::from(durations[i])).sum();
    let mut drift = i64::from(target) - sum;
    for &i in work_idx.iter().rev() {
        if drift == 0 {
            break;
        }
        let current = i64::from(durations[i]);
        let adjusted = (current + drift).max(1);
        drift -= adjusted - current;
        durations[i] = adjusted as u32;
    }
    durations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::template::template_by_id;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn eight() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 0, 0).unwrap()
    }

    #[test]
    fn standard_workday_at_target() {
        let s = build_schedule(template_by_id("standard"), date(), eight(), 480, 0);
        assert_eq!(s.blocks.len(), 7);
        assert_eq!(s.blocks[0].start_offset_minutes, 0);
        assert_eq!(s.total_work_minutes(), 480);
        assert_eq!(s.end_offset_minutes(), 540);
        assert!(s.blocks.iter().all(|b| b.status == BlockStatus::Pending));
        for pair in s.blocks.windows(2) {
            assert_eq!(pair[0].end_offset_minutes(), pair[1].start_offset_minutes);
        }
    }

    #[test]
    fn carried_block_leads_and_shifts() {
        let s = ScheduleBuilder::new(template_by_id("standard"), date())
            .target_work_minutes(480)
            .carried_minutes(60)
            .carried_from(CarriedFrom {
                source_date: date().pred_opt().unwrap(),
                source_block_ids: vec![7],
            })
            .build();
        assert_eq!(s.carried_minutes, 60);
        assert_eq!(s.blocks.len(), 8);
        let carried = &s.blocks[0];
        assert_eq!(carried.block_type, BlockType::Work);
        assert_eq!(carried.duration_minutes, 60);
        assert_eq!(carried.label, "Carry-over Work (+60m from yesterday)");
        assert_eq!(carried.carried_from.as_ref().unwrap().source_block_ids, vec![7]);
        assert_eq!(s.blocks[1].start_offset_minutes, 60);
        assert_eq!(s.total_work_minutes(), 540);
    }

    #[test]
    fn scales_work_but_not_breaks() {
        let s = build_schedule(template_by_id("standard"), date(), eight(), 360, 0);
        assert_eq!(s.total_work_minutes(), 360);
        let breaks: u32 = s
            .blocks
            .iter()
            .filter(|b| b.block_type.is_break())
            .map(|b| b.duration_minutes)
            .sum();
        assert_eq!(breaks, 60);
        assert!(s.work_blocks().all(|b| b.duration_minutes == 90));
    }

    #[test]
    fn rounding_drift_lands_on_last_work_block() {
        // 8 x 25 scaled to 201 -> seven 25s and one 26
        let s = build_schedule(template_by_id("pomodoro"), date(), eight(), 201, 0);
        assert_eq!(s.total_work_minutes(), 201);
        let last_work = s.work_blocks().last().unwrap();
        assert_eq!(last_work.duration_minutes, 26);
    }

    #[test]
    fn tiny_target_clamps_to_one_minute() {
        let s = build_schedule(template_by_id("standard"), date(), eight(), 0, 0);
        assert!(s.blocks.iter().all(|b| b.duration_minutes >= 1));
        assert_eq!(s.total_work_minutes(), 4);
    }
}
