//! Today's schedule commands.
//!
//! Every invocation opens the planner for "now", applies at most one
//! transition and prints the resulting day as JSON.

use blockday_core::clock::format_offset;
use blockday_core::schedule::Transition;
use blockday_core::{BlockId, BlockStatus, BlockType, DaySchedule, Event, ScheduleStats};
use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;

use super::{open_planner, print_json, resolve_now, CliResult};

#[derive(Subcommand)]
pub enum DayAction {
    /// Print today's schedule with progress stats
    Show,
    /// Recompute the active block for now
    Now,
    /// Start a block early or late
    Start {
        /// Block ID
        id: BlockId,
    },
    /// Mark a block completed
    Complete {
        /// Block ID
        id: BlockId,
    },
    /// Skip a block
    Skip {
        /// Block ID
        id: BlockId,
    },
    /// Change a pending block's length
    Resize {
        /// Block ID
        id: BlockId,
        /// New duration in minutes
        minutes: u32,
    },
    /// Rebuild today from the configured template
    Reset,
}

#[derive(Serialize)]
struct BlockView {
    id: BlockId,
    label: String,
    block_type: BlockType,
    status: BlockStatus,
    start: String,
    end: String,
    duration_minutes: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    carried: bool,
}

#[derive(Serialize)]
struct DayView {
    date: NaiveDate,
    template_id: String,
    carried_minutes: u32,
    active_block: Option<BlockId>,
    blocks: Vec<BlockView>,
    stats: ScheduleStats,
}

impl DayView {
    fn new(schedule: &DaySchedule, stats: ScheduleStats) -> Self {
        let blocks = schedule
            .blocks
            .iter()
            .map(|b| BlockView {
                id: b.id,
                label: b.label.clone(),
                block_type: b.block_type.clone(),
                status: b.status,
                start: format_offset(schedule.start_time, b.start_offset_minutes),
                end: format_offset(schedule.start_time, b.end_offset_minutes()),
                duration_minutes: b.duration_minutes,
                carried: b.carried_from.is_some(),
            })
            .collect();
        Self {
            date: schedule.date,
            template_id: schedule.template_id.clone(),
            carried_minutes: schedule.carried_minutes,
            active_block: schedule.active_block().map(|b| b.id),
            blocks,
            stats,
        }
    }
}

#[derive(Serialize)]
struct TransitionOutput {
    applied: bool,
    /// Status the block already had when nothing changed
    #[serde(skip_serializing_if = "Option::is_none")]
    already: Option<BlockStatus>,
    events: Vec<Event>,
    day: DayView,
}

pub fn run(action: DayAction, at: Option<&str>) -> CliResult {
    let now = resolve_now(at)?;
    let mut planner = open_planner(now)?;
    planner.tick(now)?;

    let transition = match action {
        DayAction::Show => {
            return print_json(&DayView::new(planner.schedule(), planner.stats(now.time())));
        }
        DayAction::Now => {
            let day = DayView::new(planner.schedule(), planner.stats(now.time()));
            let find = |id: BlockId| day.blocks.iter().find(|b| b.id == id);
            let active = day.active_block.and_then(find);
            let next = planner.schedule().next_block().and_then(|b| find(b.id));
            return print_json(&serde_json::json!({
                "now": now.format("%Y-%m-%d %H:%M").to_string(),
                "active_block": active,
                "next_block": next,
                "stats": &day.stats,
            }));
        }
        DayAction::Start { id } => planner.start_block(id, now)?,
        DayAction::Complete { id } => planner.complete_block(id, now)?,
        DayAction::Skip { id } => planner.skip_block(id, now)?,
        DayAction::Resize { id, minutes } => planner.resize_block(id, minutes, now)?,
        DayAction::Reset => {
            planner.reset_day(now)?;
            Transition::Applied
        }
    };

    let already = match transition {
        Transition::Applied => None,
        Transition::AlreadyTerminal(status) => Some(status),
    };
    print_json(&TransitionOutput {
        applied: transition.is_applied(),
        already,
        events: planner.drain_events(),
        day: DayView::new(planner.schedule(), planner.stats(now.time())),
    })
}
