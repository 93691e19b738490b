pub mod carry_over;
pub mod config;
pub mod day;
pub mod progress;
pub mod template;

use blockday_core::clock::parse_time_of_day;
use blockday_core::{Config, Database, DayPlanner, PlannerSettings};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Resolve `--at` against the local wall clock.
pub fn resolve_now(at: Option<&str>) -> CliResult<NaiveDateTime> {
    let local = Local::now().naive_local();
    let Some(raw) = at else {
        return Ok(local);
    };
    if let Some(time) = parse_time_of_day(raw) {
        return Ok(local.date().and_time(time));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    Err(format!("invalid --at value: {raw} (expected HH:MM or YYYY-MM-DDTHH:MM)").into())
}

pub fn open_planner(now: NaiveDateTime) -> CliResult<DayPlanner<Database>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    Ok(DayPlanner::open(db, PlannerSettings::from_config(&config), now)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
