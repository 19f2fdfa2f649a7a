//! The in-memory task list and every mutation applied to it.
//!
//! `TaskBoard` owns the tasks in stored (manual) order together with the
//! reminder scheduler, so completing, editing or deleting a task keeps its
//! timer consistent. Presentation layers subscribe to [`BoardEvent`]s instead
//! of being called from here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{EndType, NotificationSettings, Priority, RecurrenceSpec, Task, TaskId};
use crate::notify::NotificationScheduler;
use crate::recurrence::{next_occurrence, on_completion};

/// Something that happened to the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    TaskAdded(TaskId),
    TaskCompleted(TaskId),
    TaskReopened(TaskId),
    /// A recurring task produced its next occurrence.
    TaskSpawned { from: TaskId, id: TaskId },
    TaskEdited(TaskId),
    TaskMoved { id: TaskId, to: usize },
    TaskDeleted(TaskId),
}

/// Receives board events.
pub trait BoardObserver {
    fn on_event(&mut self, event: &BoardEvent);
}

impl<F: FnMut(&BoardEvent)> BoardObserver for F {
    fn on_event(&mut self, event: &BoardEvent) {
        self(event)
    }
}

/// Completion filter used by listings and bulk actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            _ => Err(Error::InvalidInput(format!(
                "unknown filter '{s}', use all, active or completed"
            ))),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        })
    }
}

/// Fields of a task as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub text: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub recurring: Option<RecurrenceSpec>,
    pub notifications: Option<NotificationSettings>,
}

impl NewTask {
    pub fn new(text: impl Into<String>) -> NewTask {
        NewTask {
            text: text.into(),
            ..NewTask::default()
        }
    }
}

/// Changes to an existing task. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub recurring: Option<Option<RecurrenceSpec>>,
    pub notifications: Option<Option<NotificationSettings>>,
}

fn validate_text(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::InvalidInput("task description cannot be empty".into()));
    }
    Ok(text.to_string())
}

fn validate_recurrence(spec: &RecurrenceSpec) -> Result<()> {
    match spec.end_type {
        EndType::Occurrences if spec.occurrences.map_or(true, |n| n == 0) => Err(Error::InvalidInput(
            "a series ending after N occurrences needs N of at least 1".into(),
        )),
        EndType::Until if spec.end_date.is_none() => Err(Error::InvalidInput(
            "a series ending on a date needs an end date".into(),
        )),
        _ => Ok(()),
    }
}

/// Owned, ordered task list plus its reminder timers.
pub struct TaskBoard {
    tasks: Vec<Task>,
    scheduler: NotificationScheduler,
    observers: Vec<Box<dyn BoardObserver>>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>, scheduler: NotificationScheduler) -> TaskBoard {
        TaskBoard {
            tasks,
            scheduler,
            observers: Vec::new(),
        }
    }

    /// Tasks in stored order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut NotificationScheduler {
        &mut self.scheduler
    }

    pub fn subscribe(&mut self, observer: impl BoardObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: BoardEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }

    fn position(&self, id: &TaskId) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    /// A millisecond-timestamp id not yet used on this board.
    fn fresh_id(&self, now: DateTime<Local>) -> TaskId {
        let mut candidate = now.timestamp_millis().max(0);
        loop {
            let id = TaskId(candidate.to_string());
            if self.get(&id).is_none() {
                return id;
            }
            candidate += 1;
        }
    }

    /// Tasks matching `filter`, in stored order.
    pub fn filtered(&self, filter: StatusFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Number of incomplete tasks.
    pub fn tasks_left(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Adds a task at the front of the list and arms its reminder.
    pub fn add(&mut self, new: NewTask, now: DateTime<Local>) -> Result<TaskId> {
        let text = validate_text(&new.text)?;
        if let Some(spec) = &new.recurring {
            validate_recurrence(spec)?;
        }
        let id = self.fresh_id(now);
        let task = Task {
            due_date: new.due_date,
            priority: new.priority,
            recurring: new.recurring,
            notifications: new.notifications,
            ..Task::new(id.clone(), text, now.with_timezone(&Utc))
        };
        self.scheduler.schedule(&task, now);
        self.tasks.insert(0, task);
        info!(task = %id, "task added");
        self.emit(BoardEvent::TaskAdded(id.clone()));
        Ok(id)
    }

    /// Flips completion of a task. Returns the new state.
    pub fn toggle(&mut self, id: &TaskId, now: DateTime<Local>) -> Result<bool> {
        let idx = self.position(id)?;
        let completed = !self.tasks[idx].completed;
        self.apply_completion(idx, completed, now);
        Ok(completed)
    }

    /// Marks a task complete or active. Returns whether anything changed.
    pub fn set_completed(&mut self, id: &TaskId, completed: bool, now: DateTime<Local>) -> Result<bool> {
        let idx = self.position(id)?;
        if self.tasks[idx].completed == completed {
            return Ok(false);
        }
        self.apply_completion(idx, completed, now);
        Ok(true)
    }

    /// Sets completion of every task matching `filter`. Returns how many changed.
    pub fn set_all_completed(&mut self, filter: StatusFilter, completed: bool, now: DateTime<Local>) -> usize {
        let ids: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| filter.matches(t) && t.completed != completed)
            .map(|t| t.id.clone())
            .collect();
        for id in &ids {
            if let Ok(idx) = self.position(id) {
                self.apply_completion(idx, completed, now);
            }
        }
        ids.len()
    }

    fn apply_completion(&mut self, idx: usize, completed: bool, now: DateTime<Local>) {
        let id = self.tasks[idx].id.clone();
        if !completed {
            self.tasks[idx].completed = false;
            self.scheduler.schedule(&self.tasks[idx], now);
            self.emit(BoardEvent::TaskReopened(id));
            return;
        }

        let successor = self.spawn_successor(idx, now);
        self.scheduler.cancel(&id);
        self.tasks[idx].completed = true;
        self.emit(BoardEvent::TaskCompleted(id.clone()));
        if let Some(next) = successor {
            self.emit(BoardEvent::TaskSpawned { from: id, id: next });
        }
    }

    /// Runs the recurrence step on the task at `idx`, appending any successor.
    fn spawn_successor(&mut self, idx: usize, now: DateTime<Local>) -> Option<TaskId> {
        if !self.tasks[idx].is_recurring() {
            return None;
        }
        let successor_id = self.fresh_id(now);
        let next = on_completion(&mut self.tasks[idx], now, successor_id)?;
        let id = next.id.clone();
        self.scheduler.schedule(&next, now);
        self.tasks.push(next);
        Some(id)
    }

    /// Whether the series of the task at `idx` already holds an instance due
    /// on or after that task's next date.
    fn has_later_occurrence(&self, idx: usize, now: DateTime<Local>) -> bool {
        let task = &self.tasks[idx];
        let Some(spec) = &task.recurring else {
            return false;
        };
        let next = next_occurrence(task.due_date.unwrap_or_else(|| now.date_naive()), &spec.pattern);
        self.tasks.iter().any(|t| {
            t.id != task.id
                && t.text == task.text
                && t.recurring.as_ref().is_some_and(|r| r.pattern == spec.pattern)
                && t.due_date.is_some_and(|d| d >= next)
        })
    }

    /// Runs the recurrence step over every completed recurring task.
    ///
    /// Tasks whose series already moved past them are skipped.
    ///
    /// Returns how many new occurrences were created.
    pub fn check_recurring(&mut self, now: DateTime<Local>) -> usize {
        let ids: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.completed && t.is_recurring())
            .map(|t| t.id.clone())
            .collect();
        let mut spawned = 0;
        for from in ids {
            let Ok(idx) = self.position(&from) else {
                continue;
            };
            if self.has_later_occurrence(idx, now) {
                continue;
            }
            if let Some(id) = self.spawn_successor(idx, now) {
                spawned += 1;
                self.emit(BoardEvent::TaskSpawned { from, id });
            }
        }
        debug!(spawned, "checked recurring tasks");
        spawned
    }

    /// Applies `patch` to a task and re-arms its reminder.
    pub fn edit(&mut self, id: &TaskId, patch: TaskPatch, now: DateTime<Local>) -> Result<()> {
        let idx = self.position(id)?;
        let text = patch.text.as_deref().map(validate_text).transpose()?;
        if let Some(Some(spec)) = &patch.recurring {
            validate_recurrence(spec)?;
        }

        let task = &mut self.tasks[idx];
        if let Some(text) = text {
            task.text = text;
        }
        if let Some(due) = patch.due_date {
            task.due_date = due;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(recurring) = patch.recurring {
            task.recurring = recurring;
        }
        if let Some(notifications) = patch.notifications {
            task.notifications = notifications;
        }

        self.scheduler.cancel(id);
        if !self.tasks[idx].completed {
            self.scheduler.schedule(&self.tasks[idx], now);
        }
        self.emit(BoardEvent::TaskEdited(id.clone()));
        Ok(())
    }

    /// Moves a task to `to` in stored order, clamped to the end of the list.
    pub fn move_task(&mut self, id: &TaskId, to: usize) -> Result<usize> {
        let from = self.position(id)?;
        let task = self.tasks.remove(from);
        let to = to.min(self.tasks.len());
        self.tasks.insert(to, task);
        self.emit(BoardEvent::TaskMoved { id: id.clone(), to });
        Ok(to)
    }

    /// Removes a task and its reminder.
    pub fn delete(&mut self, id: &TaskId) -> Result<Task> {
        let idx = self.position(id)?;
        let task = self.tasks.remove(idx);
        self.scheduler.cancel(id);
        info!(task = %id, "task deleted");
        self.emit(BoardEvent::TaskDeleted(id.clone()));
        Ok(task)
    }

    /// Removes every task matching `filter`. Returns how many were removed.
    pub fn delete_matching(&mut self, filter: StatusFilter) -> usize {
        let (removed, kept): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|t| filter.matches(t));
        self.tasks = kept;
        for task in &removed {
            self.scheduler.cancel(&task.id);
            self.emit(BoardEvent::TaskDeleted(task.id.clone()));
        }
        if !removed.is_empty() {
            info!(count = removed.len(), %filter, "tasks deleted");
        }
        removed.len()
    }

    pub fn clear_completed(&mut self) -> usize {
        self.delete_matching(StatusFilter::Completed)
    }

    pub fn clear_all(&mut self) -> usize {
        self.delete_matching(StatusFilter::All)
    }

    /// Arms reminders for every incomplete task. Returns how many were armed.
    pub fn rearm_all(&mut self, now: DateTime<Local>) -> usize {
        self.scheduler.clear();
        let mut armed = 0;
        for task in self.tasks.iter().filter(|t| !t.completed) {
            if self.scheduler.schedule(task, now).is_some() {
                armed += 1;
            }
        }
        armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pattern;
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32) -> DateTime<Local> {
        Local.from_local_datetime(&d.and_hms_opt(h, 0, 0).unwrap()).earliest().unwrap()
    }

    fn board() -> TaskBoard {
        TaskBoard::new(Vec::new(), NotificationScheduler::default())
    }

    fn recorded(board: &mut TaskBoard) -> Rc<RefCell<Vec<BoardEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        board.subscribe(move |e: &BoardEvent| sink.borrow_mut().push(e.clone()));
        log
    }

    #[test]
    fn add_puts_new_tasks_first() {
        let mut b = board();
        let now = at(date(2024, 6, 15), 6);
        let first = b.add(NewTask::new("first"), now).unwrap();
        let second = b.add(NewTask::new("  second  "), now).unwrap();
        assert_ne!(first, second);
        assert_eq!(b.tasks()[0].id, second);
        assert_eq!(b.tasks()[0].text, "second");
        assert_eq!(b.tasks_left(), 2);
    }

    #[test]
    fn add_rejects_empty_text() {
        let mut b = board();
        let err = b.add(NewTask::new("   "), Local::now()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(b.tasks().is_empty());
    }

    #[test]
    fn add_rejects_zero_occurrences() {
        let mut b = board();
        let new = NewTask {
            recurring: Some(RecurrenceSpec::occurrences(Pattern::Daily, 0)),
            ..NewTask::new("x")
        };
        assert!(b.add(new, Local::now()).is_err());
    }

    #[test]
    fn add_arms_reminder() {
        let mut b = board();
        let now = at(date(2024, 6, 15), 6);
        let new = NewTask {
            due_date: Some(date(2024, 6, 16)),
            notifications: Some(NotificationSettings::minutes_before(1440)),
            ..NewTask::new("call")
        };
        let id = b.add(new, now).unwrap();
        assert_eq!(b.scheduler().scheduled_at(&id), Some(at(date(2024, 6, 15), 9)));
    }

    #[test]
    fn completing_recurring_task_spawns_once() {
        let mut b = board();
        let log = recorded(&mut b);
        let now = at(date(2024, 1, 1), 8);
        let new = NewTask {
            due_date: Some(date(2024, 1, 1)),
            recurring: Some(RecurrenceSpec::occurrences(Pattern::Weekly, 2)),
            notifications: Some(NotificationSettings::minutes_before(0)),
            ..NewTask::new("weekly review")
        };
        let id = b.add(new, now).unwrap();

        assert!(b.toggle(&id, now).unwrap());
        assert_eq!(b.tasks().len(), 2);
        let next = &b.tasks()[1];
        assert_eq!(next.due_date, Some(date(2024, 1, 8)));
        assert_eq!(next.recurring.as_ref().unwrap().current_occurrence, 2);
        assert!(!b.scheduler().is_scheduled(&id));
        assert!(b.scheduler().is_scheduled(&next.id));
        let next_id = next.id.clone();

        // Reopen and complete again within the day: no second spawn.
        assert!(!b.toggle(&id, now).unwrap());
        assert!(b.toggle(&id, now + Duration::hours(1)).unwrap());
        assert_eq!(b.tasks().len(), 2);

        // The successor is the last allowed instance.
        b.toggle(&next_id, at(date(2024, 1, 8), 8)).unwrap();
        assert_eq!(b.tasks().len(), 2);

        let events = log.borrow();
        assert_eq!(events[0], BoardEvent::TaskAdded(id.clone()));
        assert_eq!(events[1], BoardEvent::TaskCompleted(id.clone()));
        assert_eq!(events[2], BoardEvent::TaskSpawned { from: id.clone(), id: next_id });
        assert_eq!(events[3], BoardEvent::TaskReopened(id));
    }

    #[test]
    fn reopening_rearms_reminder() {
        let mut b = board();
        let now = at(date(2024, 6, 15), 6);
        let new = NewTask {
            due_date: Some(date(2024, 6, 20)),
            notifications: Some(NotificationSettings::minutes_before(30)),
            ..NewTask::new("pay rent")
        };
        let id = b.add(new, now).unwrap();
        b.toggle(&id, now).unwrap();
        assert!(!b.scheduler().is_scheduled(&id));
        b.toggle(&id, now).unwrap();
        assert!(b.scheduler().is_scheduled(&id));
    }

    #[test]
    fn bulk_complete_and_clear() {
        let mut b = board();
        let now = Local::now();
        for name in ["a", "b", "c"] {
            b.add(NewTask::new(name), now).unwrap();
        }
        let first = b.tasks()[0].id.clone();
        b.set_completed(&first, true, now).unwrap();
        assert!(!b.set_completed(&first, true, now).unwrap());
        assert_eq!(b.set_all_completed(StatusFilter::Active, true, now), 2);
        assert_eq!(b.tasks_left(), 0);
        assert_eq!(b.set_all_completed(StatusFilter::All, false, now), 3);
        b.set_completed(&first, true, now).unwrap();
        assert_eq!(b.clear_completed(), 1);
        assert_eq!(b.filtered(StatusFilter::Active).len(), 2);
        assert_eq!(b.clear_all(), 2);
        assert!(b.tasks().is_empty());
    }

    #[test]
    fn delete_cancels_reminder() {
        let mut b = board();
        let now = at(date(2024, 6, 15), 6);
        let new = NewTask {
            due_date: Some(date(2024, 6, 18)),
            notifications: Some(NotificationSettings::minutes_before(10)),
            ..NewTask::new("dentist")
        };
        let id = b.add(new, now).unwrap();
        let log = recorded(&mut b);
        let removed = b.delete(&id).unwrap();
        assert_eq!(removed.text, "dentist");
        assert_eq!(b.scheduler().pending_count(), 0);
        assert_eq!(*log.borrow(), vec![BoardEvent::TaskDeleted(id.clone())]);
        assert!(matches!(b.delete(&id), Err(Error::TaskNotFound(_))));
    }

    #[test]
    fn edit_updates_fields_and_timer() {
        let mut b = board();
        let now = at(date(2024, 6, 15), 6);
        let new = NewTask {
            due_date: Some(date(2024, 6, 18)),
            notifications: Some(NotificationSettings::minutes_before(10)),
            ..NewTask::new("draft")
        };
        let id = b.add(new, now).unwrap();
        let patch = TaskPatch {
            text: Some("final".into()),
            priority: Some(Priority::High),
            notifications: Some(None),
            ..TaskPatch::default()
        };
        b.edit(&id, patch, now).unwrap();
        let task = b.get(&id).unwrap();
        assert_eq!(task.text, "final");
        assert_eq!(task.priority, Priority::High);
        assert!(!b.scheduler().is_scheduled(&id));

        let empty = TaskPatch {
            text: Some(" ".into()),
            ..TaskPatch::default()
        };
        assert!(b.edit(&id, empty, now).is_err());
        assert_eq!(b.get(&id).unwrap().text, "final");
    }

    #[test]
    fn move_reorders_stored_list() {
        let mut b = board();
        let now = Local::now();
        for name in ["c", "b", "a"] {
            b.add(NewTask::new(name), now).unwrap();
        }
        let a = b.tasks()[0].id.clone();
        assert_eq!(b.move_task(&a, 99).unwrap(), 2);
        let texts: Vec<&str> = b.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["b", "c", "a"]);
    }

    #[test]
    fn check_recurring_catches_up_once() {
        let now = at(date(2024, 3, 4), 12);
        let mut done = Task::new(TaskId::from("1"), "gym", now.with_timezone(&Utc));
        done.completed = true;
        done.due_date = Some(date(2024, 3, 4));
        done.recurring = Some(RecurrenceSpec::open_ended(Pattern::Weekdays));
        let mut b = TaskBoard::new(vec![done], NotificationScheduler::default());
        assert_eq!(b.check_recurring(now), 1);
        assert_eq!(b.check_recurring(now), 0);
        assert_eq!(b.tasks()[1].due_date, Some(date(2024, 3, 5)));
    }

    #[test]
    fn check_recurring_skips_series_with_successor() {
        let mut b = board();
        let start = at(date(2024, 1, 1), 8);
        let new = NewTask {
            due_date: Some(date(2024, 1, 1)),
            recurring: Some(RecurrenceSpec::occurrences(Pattern::Weekly, 2)),
            ..NewTask::new("weekly review")
        };
        let id = b.add(new, start).unwrap();
        b.toggle(&id, start).unwrap();
        assert_eq!(b.tasks().len(), 2);

        assert_eq!(b.check_recurring(start + Duration::days(2)), 0);
        assert_eq!(b.tasks().len(), 2);
        assert_eq!(b.tasks()[1].recurring.as_ref().unwrap().current_occurrence, 2);
    }

    #[test]
    fn check_recurring_respects_occurrence_limit() {
        let mut b = board();
        let start = at(date(2024, 1, 1), 8);
        let new = NewTask {
            due_date: Some(date(2024, 1, 1)),
            recurring: Some(RecurrenceSpec::occurrences(Pattern::Weekly, 2)),
            ..NewTask::new("weekly review")
        };
        let id = b.add(new, start).unwrap();
        b.toggle(&id, start).unwrap();
        let last = b.tasks()[1].id.clone();
        b.toggle(&last, at(date(2024, 1, 8), 8)).unwrap();

        for days in [3, 10, 30] {
            assert_eq!(b.check_recurring(start + Duration::days(days)), 0);
        }
        assert_eq!(b.tasks().len(), 2);
        assert!(b.tasks().iter().all(|t| t.completed));
    }

    #[test]
    fn add_rejects_until_without_end_date() {
        let mut b = board();
        let new = NewTask {
            recurring: Some(RecurrenceSpec::open_ended(Pattern::Weekly)),
            ..NewTask::new("x")
        };
        assert!(matches!(b.add(new, Local::now()), Err(Error::InvalidInput(_))));
        assert!(b.tasks().is_empty());

        let dated = NewTask {
            recurring: Some(RecurrenceSpec::until(Pattern::Weekly, date(2024, 12, 31))),
            ..NewTask::new("x")
        };
        assert!(b.add(dated, Local::now()).is_ok());
    }

    #[test]
    fn rearm_skips_completed_and_past() {
        let now = at(date(2024, 6, 15), 6);
        let mut future = Task::new(TaskId::from("1"), "f", now.with_timezone(&Utc));
        future.due_date = Some(date(2024, 6, 20));
        future.notifications = Some(NotificationSettings::minutes_before(0));
        let mut done = future.clone();
        done.id = TaskId::from("2");
        done.completed = true;
        let mut past = future.clone();
        past.id = TaskId::from("3");
        past.due_date = Some(date(2024, 6, 1));
        let mut b = TaskBoard::new(vec![future, done, past], NotificationScheduler::default());
        assert_eq!(b.rearm_all(now), 1);
        assert!(b.scheduler().is_scheduled(&TaskId::from("1")));
    }

    #[test]
    fn status_filter_parses() {
        assert_eq!("Active".parse::<StatusFilter>().unwrap(), StatusFilter::Active);
        assert!("bogus".parse::<StatusFilter>().is_err());
    }
}
