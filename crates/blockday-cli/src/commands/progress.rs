use blockday_core::progression::{LevelProgress, ACHIEVEMENTS};
use clap::Subcommand;

use super::{open_planner, print_json, resolve_now, CliResult};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// XP, level and lifetime counters
    Show,
    /// Current streak and this week's activity
    Streak,
    /// Achievement catalog with unlock state
    Achievements,
}

pub fn run(action: ProgressAction, at: Option<&str>) -> CliResult {
    let now = resolve_now(at)?;
    let planner = open_planner(now)?;

    match action {
        ProgressAction::Show => {
            let state = planner.gamification();
            let level = LevelProgress::from_xp(state.total_xp);
            print_json(&serde_json::json!({
                "state": state,
                "level_percent": level.percent(),
            }))?;
        }
        ProgressAction::Streak => {
            let weekly = planner.store().weekly_hours(now.date())?;
            let summary = planner.streak_summary(&weekly);
            print_json(&serde_json::json!({
                "summary": summary,
                "weekly_hours": weekly,
            }))?;
        }
        ProgressAction::Achievements => {
            let counters = planner.counters();
            let list: Vec<_> = ACHIEVEMENTS
                .iter()
                .map(|def| {
                    let unlocked_at = counters
                        .achievements
                        .iter()
                        .find(|a| a.id == def.id)
                        .map(|a| a.unlocked_at);
                    serde_json::json!({
                        "id": def.id,
                        "name": def.name,
                        "description": def.description,
                        "progress": def.progress(counters).min(def.requirement),
                        "requirement": def.requirement,
                        "xp_reward": def.xp_reward,
                        "unlocked_at": unlocked_at,
                    })
                })
                .collect();
            print_json(&list)?;
        }
    }
    Ok(())
}
