//! Importance score and due-date helpers.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::models::{Priority, Task};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole calendar days from `today` until `due` (negative when past).
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

/// A due date strictly before today.
pub fn is_overdue(due: NaiveDate, today: NaiveDate) -> bool {
    due < today
}

/// Not overdue, and due within the next two days.
pub fn is_due_soon(due: NaiveDate, today: NaiveDate) -> bool {
    !is_overdue(due, today) && days_until(due, today) <= 2
}

/// Short human label for a due date relative to today.
pub fn format_due_date(due: NaiveDate, today: NaiveDate) -> String {
    match days_until(due, today) {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => due.format("%Y-%m-%d").to_string(),
    }
}

fn base_score(priority: &Priority) -> f64 {
    match priority {
        Priority::Low => 1.0,
        Priority::Normal | Priority::Other(_) => 2.0,
        Priority::High => 3.0,
        Priority::Urgent => 5.0,
    }
}

fn due_bonus(days_left: i64) -> f64 {
    match days_left {
        d if d < 0 => 10.0,
        0 => 8.0,
        1..=2 => 5.0,
        3..=7 => 3.0,
        _ => 1.0,
    }
}

/// Newer tasks get up to one point, fading to zero over two weeks.
fn recency_bonus(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let days_old = now
        .signed_duration_since(created_at)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY);
    (1.0 - days_old as f64 / 14.0).max(0.0)
}

/// Calculates the importance score of a task.
///
/// The score is additive:
/// - **Priority**: low 1, normal 2, high 3, urgent 5.
/// - **Due date**: overdue +10, today +8, within 2 days +5, within a week +3,
///   later +1. Compared on calendar days.
/// - **Recurring** +1, **reminder enabled** +1.
/// - **Recency**: `max(0, 1 - days_old / 14)`.
///
/// Completion is not considered; higher is more important.
pub fn score(task: &Task, now: DateTime<Local>) -> f64 {
    let today = now.date_naive();
    let mut score = base_score(&task.priority);

    if let Some(due) = task.due_date {
        score += due_bonus(days_until(due, today));
    }
    if task.is_recurring() {
        score += 1.0;
    }
    if task.reminder_enabled() {
        score += 1.0;
    }
    if let Some(created_at) = task.created_at {
        score += recency_bonus(created_at, now.with_timezone(&Utc));
    }
    score
}
