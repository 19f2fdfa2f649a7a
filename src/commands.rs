use std::io::{self, Write};
use std::thread;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::{debug, info};

use crate::board::{NewTask, StatusFilter, TaskBoard, TaskPatch};
use crate::config::Config;
use crate::error::{parse_date, Error, Result};
use crate::models::{EndType, NotificationSettings, Pattern, Priority, RecurrenceSpec, Task, TaskId};
use crate::notify::{Clock, NotificationScheduler, Notifier, StdoutNotifier, SystemClock};
use crate::priority::{days_until, format_due_date, is_due_soon, is_overdue, score};
use crate::schedule::{day_label, distribute};
use crate::sort::{sort_tasks, SortCriterion};
use crate::storage::TaskFile;

/// Longest the `watch` loop sleeps before reloading the task file.
const WATCH_RELOAD_SECS: i64 = 60;

/// Recurrence flags as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct RecurArgs {
    pub pattern: Option<String>,
    pub until: Option<String>,
    pub occurrences: Option<u32>,
}

impl RecurArgs {
    /// Builds the series settings; `None` when no pattern was given.
    pub fn to_spec(&self) -> Result<Option<RecurrenceSpec>> {
        let Some(pattern) = &self.pattern else {
            if self.until.is_some() || self.occurrences.is_some() {
                return Err(Error::InvalidInput("--until/--occurrences need --recur".into()));
            }
            return Ok(None);
        };
        let pattern = Pattern::from(pattern.clone());
        let spec = match (&self.until, self.occurrences) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidInput("use either --until or --occurrences".into()))
            }
            (Some(until), None) => RecurrenceSpec::until(pattern, parse_date(until)?),
            (None, Some(n)) => RecurrenceSpec::occurrences(pattern, n),
            (None, None) => {
                return Err(Error::InvalidInput("--recur needs --until or --occurrences".into()))
            }
        };
        Ok(Some(spec))
    }
}

/// Options for `add`.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub due: Option<String>,
    pub priority: Option<String>,
    pub recur: RecurArgs,
    /// `Some(None)` asks for a reminder with the configured default lead.
    pub remind: Option<Option<u32>>,
}

/// Options for `edit`. Unset fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub text: Option<String>,
    /// A date, or `none` to clear it.
    pub due: Option<String>,
    pub priority: Option<String>,
    pub recur: RecurArgs,
    pub no_recur: bool,
    pub remind: Option<u32>,
    pub no_remind: bool,
}

fn parse_priority(s: &str) -> Result<Priority> {
    match Priority::from(s.to_string()) {
        Priority::Other(_) => Err(Error::InvalidInput(format!(
            "unknown priority '{s}', use low, normal or high"
        ))),
        p => Ok(p),
    }
}

fn open_board(config: &Config) -> (TaskFile, TaskBoard) {
    let file = TaskFile::new(config.db_path());
    let tasks = file.load();
    let board = TaskBoard::new(tasks, NotificationScheduler::new(config.reminder_hour));
    (file, board)
}

/// Loads the stored task list from the configured file.
pub fn load_tasks(config: &Config) -> Vec<Task> {
    TaskFile::new(config.db_path()).load()
}

/// Adds a new task and prints its id.
pub fn cmd_add(config: &Config, text: String, opts: AddOptions, silent: bool) -> Result<TaskId> {
    let due_date = opts.due.as_deref().map(parse_date).transpose()?;
    let priority = opts.priority.as_deref().map(parse_priority).transpose()?.unwrap_or_default();
    let recurring = opts.recur.to_spec()?;
    let notifications = opts
        .remind
        .map(|m| NotificationSettings::minutes_before(m.unwrap_or(config.default_reminder_minutes)));
    if notifications.is_some() && due_date.is_none() && !silent {
        eprintln!("Note: reminders only fire for tasks with a due date.");
    }

    let (file, mut board) = open_board(config);
    let new = NewTask {
        text,
        due_date,
        priority,
        recurring,
        notifications,
    };
    let id = board.add(new, Local::now())?;
    file.save(board.tasks())?;
    if !silent {
        println!("Task added (id = {})", id);
    }
    Ok(id)
}

/// Toggles a task between done and active.
///
/// Completing a recurring task creates its next occurrence when the series
/// continues.
pub fn cmd_toggle(config: &Config, id: &str, silent: bool) -> Result<bool> {
    let (file, mut board) = open_board(config);
    let id = TaskId::from(id);
    let before = board.tasks().len();
    let completed = board.toggle(&id, Local::now())?;
    file.save(board.tasks())?;
    if !silent {
        let state = if completed { "complete" } else { "active" };
        println!("Task {} marked as {}.", id, state);
        if let Some(next) = board.tasks().get(before) {
            if let Some(due) = next.due_date {
                println!("Next occurrence created due on {} (id = {})", due, next.id);
            }
        }
    }
    Ok(completed)
}

/// Removes a task by id.
pub fn cmd_remove(config: &Config, id: &str, silent: bool) -> Result<()> {
    let (file, mut board) = open_board(config);
    let task = board.delete(&TaskId::from(id))?;
    file.save(board.tasks())?;
    if !silent {
        println!("Task {} removed.", task.id);
    }
    Ok(())
}

/// Edits an existing task's details.
pub fn cmd_edit(config: &Config, id: &str, opts: EditOptions, silent: bool) -> Result<()> {
    let mut patch = TaskPatch {
        text: opts.text,
        ..TaskPatch::default()
    };
    if let Some(due) = opts.due.as_deref() {
        patch.due_date = Some(if due.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(parse_date(due)?)
        });
    }
    if let Some(p) = opts.priority.as_deref() {
        patch.priority = Some(parse_priority(p)?);
    }
    if opts.no_recur {
        patch.recurring = Some(None);
    } else if let Some(spec) = opts.recur.to_spec()? {
        patch.recurring = Some(Some(spec));
    }
    if opts.no_remind {
        patch.notifications = Some(None);
    } else if let Some(m) = opts.remind {
        patch.notifications = Some(Some(NotificationSettings::minutes_before(m)));
    }

    let (file, mut board) = open_board(config);
    let id = TaskId::from(id);
    board.edit(&id, patch, Local::now())?;
    file.save(board.tasks())?;
    if !silent {
        println!("Task {} updated.", id);
    }
    Ok(())
}

/// Moves a task to a new position in the stored order.
pub fn cmd_move(config: &Config, id: &str, index: usize, silent: bool) -> Result<()> {
    let (file, mut board) = open_board(config);
    let to = board.move_task(&TaskId::from(id), index)?;
    file.save(board.tasks())?;
    if !silent {
        println!("Task {} moved to position {}.", id, to);
    }
    Ok(())
}

/// Marks every task matching `filter` done (or active with `reopen`).
pub fn cmd_complete_all(config: &Config, filter: StatusFilter, reopen: bool, silent: bool) -> Result<usize> {
    let (file, mut board) = open_board(config);
    let changed = board.set_all_completed(filter, !reopen, Local::now());
    file.save(board.tasks())?;
    if !silent {
        let action = if reopen { "marked active" } else { "completed" };
        println!("{} tasks {}.", changed, action);
    }
    Ok(changed)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Deletes tasks matching `filter`, asking first unless `force` is set
/// or only completed tasks are being removed.
pub fn cmd_clear(config: &Config, filter: StatusFilter, force: bool, silent: bool) -> Result<usize> {
    let (file, mut board) = open_board(config);
    let count = board.filtered(filter).len();
    if count == 0 {
        if !silent {
            println!("No {} tasks to clear.", filter);
        }
        return Ok(0);
    }
    if !force && filter != StatusFilter::Completed && !confirm(&format!("Delete {count} tasks?"))? {
        println!("Aborted.");
        return Ok(0);
    }
    let removed = board.delete_matching(filter);
    file.save(board.tasks())?;
    if !silent {
        println!("Cleared {} tasks.", removed);
    }
    Ok(removed)
}

/// Creates any missing next occurrences for completed recurring tasks.
pub fn cmd_check_recurring(config: &Config, silent: bool) -> Result<usize> {
    let (file, mut board) = open_board(config);
    let spawned = board.check_recurring(Local::now());
    file.save(board.tasks())?;
    if !silent {
        println!("{} recurring tasks updated.", spawned);
    }
    Ok(spawned)
}

fn due_cell(task: &Task, now: DateTime<Local>) -> Cell {
    let today = now.date_naive();
    match task.due_date {
        None => Cell::new("-"),
        Some(due) if task.completed => Cell::new(due),
        Some(due) if is_overdue(due, today) => {
            Cell::new(format!("{}d overdue", -days_until(due, today))).fg(Color::Red)
        }
        Some(due) if is_due_soon(due, today) => Cell::new(format_due_date(due, today)).fg(Color::Yellow),
        Some(due) => Cell::new(format_due_date(due, today)),
    }
}

pub(crate) fn repeat_label(task: &Task) -> String {
    match &task.recurring {
        None => String::new(),
        Some(spec) => match (spec.end_date, spec.occurrences) {
            (Some(end), _) if spec.end_type == EndType::Until => {
                format!("{} until {}", spec.pattern, end)
            }
            (_, Some(n)) if spec.end_type == EndType::Occurrences => {
                format!("{} {}/{}", spec.pattern, spec.current_occurrence, n)
            }
            _ => spec.pattern.to_string(),
        },
    }
}

/// Lists tasks in a formatted table.
pub fn cmd_list(config: &Config, filter: StatusFilter, sort: Option<SortCriterion>) -> Result<()> {
    let (_, board) = open_board(config);
    let now = Local::now();
    let visible: Vec<Task> = board.filtered(filter).into_iter().cloned().collect();
    if visible.is_empty() {
        println!("No {} tasks to display.", filter);
        return Ok(());
    }
    let criterion = sort.unwrap_or(config.default_sort);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Repeats").add_attribute(Attribute::Bold),
            Cell::new("Remind").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in sort_tasks(&visible, criterion, now) {
        let priority_color = match t.priority {
            Priority::Urgent | Priority::High => Color::Red,
            Priority::Low => Color::Green,
            _ => Color::Reset,
        };
        let remind = match t.notifications {
            Some(n) if n.enabled => format!("{}m", n.time),
            _ => String::new(),
        };
        let (status, status_color) = if t.completed {
            ("Done", Color::Green)
        } else {
            ("Pending", Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(&t.text),
            Cell::new(&t.priority).fg(priority_color),
            due_cell(t, now),
            Cell::new(repeat_label(t)),
            Cell::new(remind),
            Cell::new(format!("{:.1}", score(t, now))),
            Cell::new(status).fg(status_color),
        ]);
    }

    println!("{table}");
    let left = board.tasks_left();
    println!("{} task{} left", left, if left == 1 { "" } else { "s" });
    Ok(())
}

/// Prints the optimized seven-day plan.
pub fn cmd_schedule(config: &Config) -> Result<()> {
    let (_, board) = open_board(config);
    let today = Local::now().date_naive();
    let week = distribute(board.tasks(), today);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Day").add_attribute(Attribute::Bold),
            Cell::new("Tasks").add_attribute(Attribute::Bold),
        ]);
    for day in &week.days {
        let tasks = if day.tasks.is_empty() {
            "No tasks scheduled".to_string()
        } else {
            day.tasks
                .iter()
                .map(|t| format!("[{}] {}", t.priority, t.text))
                .collect::<Vec<_>>()
                .join("\n")
        };
        table.add_row(vec![Cell::new(day_label(day.date, today)), Cell::new(tasks)]);
    }
    println!("{table}");
    Ok(())
}

/// One pass of the reminder loop.
///
/// Reloads the task file, arms every reminder whose fire time is after
/// `since`, and delivers those due by `now`. Returns when to wake next.
pub fn watch_step(
    config: &Config,
    since: DateTime<Local>,
    now: DateTime<Local>,
    notifier: &mut dyn Notifier,
) -> DateTime<Local> {
    let (_, mut board) = open_board(config);
    let armed = board.rearm_all(since);
    let fired = board.scheduler_mut().fire_due(now, notifier);
    debug!(armed, fired, "watch pass");
    let reload_at = now + Duration::seconds(WATCH_RELOAD_SECS);
    board
        .scheduler()
        .next_fire_at()
        .map_or(reload_at, |next| next.min(reload_at))
}

/// Runs until interrupted, printing reminders as they come due.
pub fn cmd_watch(config: &Config) -> Result<()> {
    let clock = SystemClock;
    let mut notifier = StdoutNotifier;
    let mut since = clock.now();
    info!(file = %config.db_path().display(), "watching for reminders");
    println!("Watching for reminders (Ctrl-C to stop)...");
    loop {
        let now = clock.now();
        let wake = watch_step(config, since, now, &mut notifier);
        since = now + Duration::milliseconds(1);
        let wait = (wake - clock.now()).to_std().unwrap_or(StdDuration::ZERO);
        thread::sleep(wait.max(StdDuration::from_millis(200)));
    }
}
