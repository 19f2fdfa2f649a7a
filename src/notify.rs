//! Reminder timers keyed by task id.
//!
//! Timers are plain entries holding a fire time; the host loop (TUI tick or
//! `watch`) calls [`NotificationScheduler::poll`] and hands whatever fired to
//! a [`Notifier`]. Time comes from a [`Clock`] so tests never wait.

use std::cell::Cell;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use tracing::{debug, info, warn};

use crate::models::{Task, TaskId};
use crate::priority::{format_due_date, is_overdue};

/// Local hour reminders are anchored to on the due date.
pub const DEFAULT_REMINDER_HOUR: u32 = 9;

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> ManualClock {
        ManualClock { now: Cell::new(now) }
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

/// A reminder ready for delivery. `tag` lets the receiver replace an earlier
/// reminder for the same task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: TaskId,
}

impl Notification {
    fn build(id: &TaskId, text: &str, due: Option<NaiveDate>, today: NaiveDate) -> Notification {
        let body = match due {
            Some(d) if is_overdue(d, today) => "This task is overdue!".to_string(),
            Some(d) => format!("Due {}", format_due_date(d, today)),
            None => String::new(),
        };
        Notification {
            title: format!("Todo: {text}"),
            body,
            tag: id.clone(),
        }
    }

    /// The reminder for `task` as it would read on `today`.
    pub fn for_task(task: &Task, today: NaiveDate) -> Notification {
        Notification::build(&task.id, &task.text, task.due_date, today)
    }
}

/// Receives fired reminders.
pub trait Notifier {
    fn deliver(&mut self, notification: &Notification);
}

/// Prints reminders to stdout.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn deliver(&mut self, n: &Notification) {
        if n.body.is_empty() {
            println!("[{}] {}", n.tag, n.title);
        } else {
            println!("[{}] {}: {}", n.tag, n.title, n.body);
        }
    }
}

/// Collects reminders in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub delivered: Vec<Notification>,
}

impl Notifier for RecordingNotifier {
    fn deliver(&mut self, n: &Notification) {
        self.delivered.push(n.clone());
    }
}

/// Computes when a task's reminder should fire.
///
/// The fire time is the due date at `reminder_hour` local time, minus the
/// configured lead. `None` when the task has no due date, reminders are off,
/// or the anchor does not exist in local time.
pub fn fire_time(task: &Task, reminder_hour: u32) -> Option<DateTime<Local>> {
    let due = task.due_date?;
    let settings = task.notifications.filter(|n| n.enabled)?;
    let anchor = NaiveTime::from_hms_opt(reminder_hour, 0, 0)?;
    let Some(at) = Local.from_local_datetime(&due.and_time(anchor)).earliest() else {
        warn!(task = %task.id, %due, "reminder anchor does not exist in local time");
        return None;
    };
    Some(at - Duration::minutes(i64::from(settings.time)))
}

#[derive(Debug, Clone)]
struct PendingReminder {
    fire_at: DateTime<Local>,
    text: String,
    due: Option<NaiveDate>,
}

/// Owns every outstanding reminder timer, at most one per task.
#[derive(Debug)]
pub struct NotificationScheduler {
    reminder_hour: u32,
    pending: HashMap<TaskId, PendingReminder>,
}

impl Default for NotificationScheduler {
    fn default() -> Self {
        NotificationScheduler::new(DEFAULT_REMINDER_HOUR)
    }
}

impl NotificationScheduler {
    pub fn new(reminder_hour: u32) -> NotificationScheduler {
        NotificationScheduler {
            reminder_hour: reminder_hour.min(23),
            pending: HashMap::new(),
        }
    }

    pub fn reminder_hour(&self) -> u32 {
        self.reminder_hour
    }

    /// Arms the reminder for `task`, replacing any earlier timer for it.
    ///
    /// Does nothing unless the task has a due date and reminders enabled.
    /// A fire time already in the past leaves the task unscheduled.
    /// Returns the fire time when a timer was armed.
    pub fn schedule(&mut self, task: &Task, now: DateTime<Local>) -> Option<DateTime<Local>> {
        if task.due_date.is_none() || !task.reminder_enabled() {
            return None;
        }
        self.cancel(&task.id);

        let fire_at = fire_time(task, self.reminder_hour)?;
        if fire_at < now {
            debug!(task = %task.id, %fire_at, "reminder time already passed");
            return None;
        }
        debug!(task = %task.id, %fire_at, "reminder armed");
        self.pending.insert(
            task.id.clone(),
            PendingReminder {
                fire_at,
                text: task.text.clone(),
                due: task.due_date,
            },
        );
        Some(fire_at)
    }

    /// Cancels the pending reminder for `id`, if any.
    pub fn cancel(&mut self, id: &TaskId) -> bool {
        let removed = self.pending.remove(id).is_some();
        if removed {
            debug!(task = %id, "reminder cancelled");
        }
        removed
    }

    /// Drops every pending reminder.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Fires every reminder due at or before `now`, earliest first.
    ///
    /// Fired timers are removed.
    pub fn poll(&mut self, now: DateTime<Local>) -> Vec<Notification> {
        let mut due: Vec<(TaskId, PendingReminder)> = Vec::new();
        self.pending.retain(|id, p| {
            if p.fire_at <= now {
                due.push((id.clone(), p.clone()));
                false
            } else {
                true
            }
        });
        due.sort_by(|(ia, a), (ib, b)| a.fire_at.cmp(&b.fire_at).then_with(|| ia.cmp(ib)));

        let today = now.date_naive();
        due.into_iter()
            .map(|(id, p)| {
                info!(task = %id, "reminder fired");
                Notification::build(&id, &p.text, p.due, today)
            })
            .collect()
    }

    /// Polls and hands each fired reminder to `notifier`. Returns how many fired.
    pub fn fire_due(&mut self, now: DateTime<Local>, notifier: &mut dyn Notifier) -> usize {
        let fired = self.poll(now);
        for n in &fired {
            notifier.deliver(n);
        }
        fired.len()
    }

    /// Earliest pending fire time.
    pub fn next_fire_at(&self) -> Option<DateTime<Local>> {
        self.pending.values().map(|p| p.fire_at).min()
    }

    pub fn scheduled_at(&self, id: &TaskId) -> Option<DateTime<Local>> {
        self.pending.get(id).map(|p| p.fire_at)
    }

    pub fn is_scheduled(&self, id: &TaskId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
