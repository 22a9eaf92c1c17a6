use chrono::{DateTime, Timelike, TimeZone};

use crate::schedule::dto::{RunState, ScheduleConfig};

/// Decides whether today's scheduled report should fire at `now`.
///
/// `now` is first moved into the schedule's timezone. The gate opens when the local
/// hour is the target hour, the minute sits inside the tick window starting at the
/// target minute, and nothing has fired yet on the local date. When it opens, the
/// returned state already carries today's date so a later tick in the same window
/// stays shut.
///
/// A process that starts after the window has passed does not catch up; the next
/// fire is the following day.
pub fn should_run_now<Tz: TimeZone>(
    now: &DateTime<Tz>,
    schedule: &ScheduleConfig,
    state: RunState,
) -> (bool, RunState) {
    let local = schedule.localize(now);
    let today = local.date_naive();

    if local.hour() != schedule.target_hour() {
        return (false, state);
    }
    let minute = local.minute();
    let start = schedule.target_minute();
    if minute < start || minute >= start + schedule.window_minutes() {
        return (false, state);
    }
    if state.fired_on(today) {
        return (false, state);
    }

    (true, state.mark_fired(today))
}
