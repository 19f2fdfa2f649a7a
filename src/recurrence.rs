//! Next-date arithmetic for recurring series and the per-completion spawn step.

use chrono::{DateTime, Datelike, Days, Duration, Local, Months, NaiveDate, Utc, Weekday};
use tracing::{debug, info};

use crate::models::{EndType, Pattern, RecurrenceSpec, Task, TaskId};

/// Minimum gap, in hours, between two spawns from the same task.
pub const RESPAWN_GUARD_HOURS: i64 = 24;

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn add_days(date: NaiveDate, n: u64) -> NaiveDate {
    date.checked_add_days(Days::new(n)).unwrap_or(date)
}

fn add_months(date: NaiveDate, n: u32) -> NaiveDate {
    // chrono clamps to the last day of a shorter month (Jan 31 -> Feb 29).
    date.checked_add_months(Months::new(n))
        .unwrap_or_else(|| add_days(date, 1))
}

/// First day after `current` accepted by `wanted`. Stops at the last
/// representable date.
fn step_until(current: NaiveDate, wanted: impl Fn(NaiveDate) -> bool) -> NaiveDate {
    let mut next = add_days(current, 1);
    while !wanted(next) {
        let after = add_days(next, 1);
        if after == next {
            break;
        }
        next = after;
    }
    next
}

/// Computes the next due date of a series after `current`.
///
/// Unrecognized patterns advance by one day.
pub fn next_occurrence(current: NaiveDate, pattern: &Pattern) -> NaiveDate {
    match pattern {
        Pattern::Daily | Pattern::Other(_) => add_days(current, 1),
        Pattern::Weekly => add_days(current, 7),
        Pattern::Biweekly => add_days(current, 14),
        Pattern::Monthly => add_months(current, 1),
        Pattern::Quarterly => add_months(current, 3),
        Pattern::Yearly => add_months(current, 12),
        Pattern::Weekdays => step_until(current, |d| !is_weekend(d)),
        Pattern::Weekends => step_until(current, is_weekend),
    }
}

/// Whether a series may produce an instance due on `candidate`.
///
/// A missing end date or occurrence count means the series never ends.
pub fn should_continue(spec: Option<&RecurrenceSpec>, candidate: NaiveDate) -> bool {
    let Some(spec) = spec else {
        return false;
    };
    match spec.end_type {
        EndType::Until => spec.end_date.map_or(true, |end| candidate <= end),
        EndType::Occurrences => spec
            .occurrences
            .map_or(true, |limit| spec.current_occurrence < limit),
    }
}

/// Whether `task` produced a successor less than [`RESPAWN_GUARD_HOURS`] ago.
pub fn recently_recurred(task: &Task, now: DateTime<Utc>) -> bool {
    task.last_recurred
        .is_some_and(|last| now.signed_duration_since(last) < Duration::hours(RESPAWN_GUARD_HOURS))
}

/// Runs the recurrence step for a task that is being completed.
///
/// Returns the successor instance, if the series continues. The original task
/// is stamped with `last_recurred = now` whenever the respawn guard passes,
/// whether or not a successor is produced. A task without a due date
/// recurs from today.
pub fn on_completion(task: &mut Task, now: DateTime<Local>, successor_id: TaskId) -> Option<Task> {
    let spec = task.recurring.as_ref()?;
    let now_utc = now.with_timezone(&Utc);
    if recently_recurred(task, now_utc) {
        debug!(task = %task.id, "recurred within the last day, skipping");
        return None;
    }

    let base = task.due_date.unwrap_or_else(|| now.date_naive());
    let next = next_occurrence(base, &spec.pattern);
    let successor = if should_continue(Some(spec), next) {
        let mut recurring = spec.clone();
        if recurring.end_type == EndType::Occurrences {
            recurring.current_occurrence += 1;
        }
        info!(task = %task.id, successor = %successor_id, due = %next, "spawned next occurrence");
        Some(Task {
            id: successor_id,
            text: task.text.clone(),
            completed: false,
            created_at: Some(now_utc),
            due_date: Some(next),
            priority: task.priority.clone(),
            recurring: Some(recurring),
            notifications: task.notifications,
            last_recurred: Some(now_utc),
        })
    } else {
        info!(task = %task.id, "series ended");
        None
    };

    task.last_recurred = Some(now_utc);
    successor
}
