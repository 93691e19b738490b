//! Carry-over commands: inspect, accept or dismiss yesterday's unfinished work.

use blockday_core::{BlockId, CarryOverState};
use clap::Subcommand;

use super::{open_planner, print_json, resolve_now, CliResult};

#[derive(Subcommand)]
pub enum CarryOverAction {
    /// Show the pending offer or how it was resolved
    Check,
    /// Carry blocks into today (all offered blocks when no IDs are given)
    Accept {
        /// Offered block IDs from yesterday
        ids: Vec<BlockId>,
    },
    /// Decline the offer
    Dismiss,
}

pub fn run(action: CarryOverAction, at: Option<&str>) -> CliResult {
    let now = resolve_now(at)?;
    let mut planner = open_planner(now)?;

    match action {
        CarryOverAction::Check => {
            let state = planner.check_carry_over(now)?.clone();
            print_json(&state)?;
        }
        CarryOverAction::Accept { ids } => {
            let ids = if ids.is_empty() {
                match planner.carry_over_state() {
                    CarryOverState::Offered { offer } => offer.block_ids(),
                    _ => Vec::new(),
                }
            } else {
                ids
            };
            let resolution = planner.accept_carry_over(&ids, now)?;
            print_json(&serde_json::json!({
                "resolution": resolution,
                "carried_minutes": planner.schedule().carried_minutes,
                "events": planner.drain_events(),
            }))?;
        }
        CarryOverAction::Dismiss => {
            planner.dismiss_carry_over(now)?;
            print_json(planner.carry_over_state())?;
        }
    }
    Ok(())
}
