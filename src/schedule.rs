//! Rolling seven-day plan of incomplete tasks.

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::models::Task;
use crate::priority::days_until;

/// Number of day buckets, starting today.
pub const WINDOW_DAYS: usize = 7;

/// One day slot of the plan.
#[derive(Debug)]
pub struct ScheduleDay<'a> {
    pub date: NaiveDate,
    pub tasks: Vec<&'a Task>,
}

/// Seven consecutive days of planned tasks, today first.
#[derive(Debug)]
pub struct WeekSchedule<'a> {
    pub days: Vec<ScheduleDay<'a>>,
}

impl<'a> WeekSchedule<'a> {
    fn empty(today: NaiveDate) -> WeekSchedule<'a> {
        let days = (0..WINDOW_DAYS as u64)
            .map(|i| ScheduleDay {
                date: today.checked_add_days(Days::new(i)).unwrap_or(today),
                tasks: Vec::new(),
            })
            .collect();
        WeekSchedule { days }
    }

    /// Total number of tasks placed in the window.
    pub fn len(&self) -> usize {
        self.days.iter().map(|d| d.tasks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn by_tier_desc(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| b.priority.tier().cmp(&a.priority.tier()));
}

/// Spreads all incomplete tasks across the next seven days.
///
/// Dated tasks due within the window go to their own day; dated tasks outside
/// it are left out. Undated tasks, highest tier first, each go to the day with
/// the fewest tasks so far (earliest day on ties). Each day is then ordered by
/// priority tier.
pub fn distribute(tasks: &[Task], today: NaiveDate) -> WeekSchedule<'_> {
    let mut schedule = WeekSchedule::empty(today);
    let pending = tasks.iter().filter(|t| !t.completed);

    let mut undated = Vec::new();
    for task in pending {
        match task.due_date {
            Some(due) => {
                let offset = days_until(due, today);
                if (0..WINDOW_DAYS as i64).contains(&offset) {
                    schedule.days[offset as usize].tasks.push(task);
                }
            }
            None => undated.push(task),
        }
    }

    by_tier_desc(&mut undated);
    for task in undated {
        let slot = schedule
            .days
            .iter()
            .enumerate()
            .min_by_key(|(i, day)| (day.tasks.len(), *i))
            .map(|(i, _)| i)
            .unwrap_or(0);
        schedule.days[slot].tasks.push(task);
    }

    for day in &mut schedule.days {
        by_tier_desc(&mut day.tasks);
    }
    debug!(placed = schedule.len(), "distributed weekly schedule");
    schedule
}

/// Heading for a schedule day: `Today (6/15)`, `Tomorrow (6/16)`, `Monday (6/17)`.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    let name = match days_until(date, today) {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%A").to_string(),
    };
    format!("{} ({}/{})", name, date.month(), date.day())
}
