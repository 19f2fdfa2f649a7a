//! Display ordering of tasks. Sorting never reorders the stored list.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Priority, Task};
use crate::priority::{is_overdue, score};

/// Criterion for ordering the task list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum SortCriterion {
    /// Highest importance score first.
    #[default]
    Priority,
    /// Overdue first, then earliest due date, undated last.
    DueDate,
    /// Case-insensitive by text.
    Alphabetical,
    /// Newest first.
    DateCreated,
    /// Stored order, unchanged.
    Manual,
}

impl SortCriterion {
    pub fn as_str(self) -> &'static str {
        match self {
            SortCriterion::Priority => "priority",
            SortCriterion::DueDate => "dueDate",
            SortCriterion::Alphabetical => "alphabetical",
            SortCriterion::DateCreated => "dateCreated",
            SortCriterion::Manual => "manual",
        }
    }

    /// The next criterion in display order, wrapping around.
    pub fn cycle(self) -> SortCriterion {
        match self {
            SortCriterion::Priority => SortCriterion::DueDate,
            SortCriterion::DueDate => SortCriterion::Alphabetical,
            SortCriterion::Alphabetical => SortCriterion::DateCreated,
            SortCriterion::DateCreated => SortCriterion::Manual,
            SortCriterion::Manual => SortCriterion::Priority,
        }
    }
}

impl From<&str> for SortCriterion {
    /// Unknown names map to [`SortCriterion::Manual`].
    fn from(s: &str) -> Self {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "priority" => SortCriterion::Priority,
            "duedate" | "due" => SortCriterion::DueDate,
            "alphabetical" | "alpha" => SortCriterion::Alphabetical,
            "datecreated" | "created" => SortCriterion::DateCreated,
            _ => SortCriterion::Manual,
        }
    }
}

impl From<String> for SortCriterion {
    fn from(s: String) -> Self {
        SortCriterion::from(s.as_str())
    }
}

impl From<SortCriterion> for String {
    fn from(c: SortCriterion) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct NonFiniteScore(String);

fn by_due_date(a: &Task, b: &Task, now: DateTime<Local>) -> Ordering {
    let today = now.date_naive();
    match (a.due_date, b.due_date) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(da), Some(db)) => is_overdue(db, today)
            .cmp(&is_overdue(da, today))
            .then(da.cmp(&db)),
    }
}

fn alphabetical(a: &Task, b: &Task) -> Ordering {
    a.text
        .to_lowercase()
        .cmp(&b.text.to_lowercase())
        .then_with(|| a.text.cmp(&b.text))
}

fn newest_first(a: &Task, b: &Task) -> Ordering {
    match (a.created_at, b.created_at) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(ca), Some(cb)) => cb.cmp(&ca),
    }
}

fn try_sort(tasks: &mut Vec<&Task>, criterion: SortCriterion, now: DateTime<Local>) -> Result<(), NonFiniteScore> {
    match criterion {
        SortCriterion::Priority => {
            let mut scored = Vec::with_capacity(tasks.len());
            for t in tasks.iter() {
                let s = score(t, now);
                if !s.is_finite() {
                    return Err(NonFiniteScore(t.id.to_string()));
                }
                scored.push((s, *t));
            }
            scored.sort_by(|(sa, _), (sb, _)| sb.total_cmp(sa));
            *tasks = scored.into_iter().map(|(_, t)| t).collect();
        }
        SortCriterion::DueDate => tasks.sort_by(|a, b| by_due_date(a, b, now)),
        SortCriterion::Alphabetical => tasks.sort_by(|a, b| alphabetical(a, b)),
        SortCriterion::DateCreated => tasks.sort_by(|a, b| newest_first(a, b)),
        SortCriterion::Manual => {}
    }
    Ok(())
}

/// Promotes high-priority tasks, leaving everything else in stored order.
fn fallback_sort(tasks: &mut [&Task]) {
    tasks.sort_by_key(|t| t.priority != Priority::High);
}

/// Returns the tasks ordered by `criterion`.
///
/// The sort is stable, so ties keep their stored order. The input is not
/// modified. If the ordering cannot be computed, high-priority tasks are moved
/// to the front and the rest keep stored order.
pub fn sort_tasks<'a>(tasks: &'a [Task], criterion: SortCriterion, now: DateTime<Local>) -> Vec<&'a Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    if let Err(NonFiniteScore(id)) = try_sort(&mut sorted, criterion, now) {
        warn!(task = %id, criterion = %criterion, "sort failed, falling back to high-priority first");
        sorted = tasks.iter().collect();
        fallback_sort(&mut sorted);
    }
    sorted
}
