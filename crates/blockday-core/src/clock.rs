//! Wall-clock helpers shared by the schedule, streak and carry-over code.
//!
//! The engine never samples the clock itself: callers pass the current
//! date/time in, and every helper here is a pure function of its inputs.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};

/// Start time used when a configured "HH:MM" string cannot be parsed.
pub const DEFAULT_START_TIME: &str = "08:00";

/// Parse an "HH:MM" (or "H:MM") time of day.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let (h, m) = raw.trim().split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if m.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse an "HH:MM" string, falling back to 08:00 on malformed input.
pub fn time_or_default(raw: &str) -> NaiveTime {
    parse_time_of_day(raw).unwrap_or_else(|| {
        tracing::debug!(input = raw, "malformed start time, using {DEFAULT_START_TIME}");
        NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
    })
}

/// Minutes since midnight.
pub fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

/// Signed minute offset of `now` relative to `start` on the same day.
pub fn offset_from(start: NaiveTime, now: NaiveTime) -> i64 {
    minute_of_day(now) - minute_of_day(start)
}

/// Render a minute offset from `start` back to "HH:MM" (wrapping at midnight).
pub fn format_offset(start: NaiveTime, offset_minutes: u32) -> String {
    let total = (minute_of_day(start) + i64::from(offset_minutes)).rem_euclid(24 * 60);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// The calendar day before `today`.
pub fn yesterday_of(today: NaiveDate) -> Option<NaiveDate> {
    today.pred_opt()
}

/// Whether `date` is exactly the day before `today`.
pub fn is_yesterday(date: NaiveDate, today: NaiveDate) -> bool {
    yesterday_of(today) == Some(date)
}

/// Index into a Monday-first weekly array.
pub fn weekday_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Canonical "did the user work on this day" check.
///
/// A day counts if anything was logged or any hours were recorded.
pub fn worked_on(hours: f64, has_entries: bool) -> bool {
    has_entries || (hours.is_finite() && hours > 0.0)
}
