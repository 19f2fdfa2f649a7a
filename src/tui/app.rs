use chrono::{DateTime, Local};
use ratatui::widgets::TableState;

use crate::board::{NewTask, StatusFilter, TaskBoard, TaskPatch};
use crate::commands::RecurArgs;
use crate::config::Config;
use crate::error::{parse_date, Result};
use crate::models::{EndType, NotificationSettings, Priority, Task, TaskId};
use crate::notify::{NotificationScheduler, RecordingNotifier};
use crate::sort::{sort_tasks, SortCriterion};
use crate::storage::TaskFile;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
}

#[derive(PartialEq)]
pub enum ViewMode {
    Tasks,
    Week,
}

pub enum InputField {
    Text,
    Due,
    Recur,
    Remind,
}

/// State for the two-step "Add Task" prompt.
#[derive(Default)]
pub struct AddState {
    pub text: String,
    pub step: usize, // 0: Text, 1: Due
}

/// Reads `<pattern> <end date | count>` as typed in the repeat prompt.
fn recur_args(value: &str) -> RecurArgs {
    let mut words = value.split_whitespace();
    let pattern = words.next().map(str::to_string);
    let mut args = RecurArgs {
        pattern,
        ..RecurArgs::default()
    };
    if let Some(end) = words.next() {
        match end.parse::<u32>() {
            Ok(n) => args.occurrences = Some(n),
            Err(_) => args.until = Some(end.to_string()),
        }
    }
    args
}

pub struct App {
    pub board: TaskBoard,
    file: TaskFile,
    /// Ids of the visible rows, in display order.
    pub rows: Vec<TaskId>,
    pub state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<TaskId>,
    pub add_state: AddState,
    pub filter: StatusFilter,
    pub sort: SortCriterion,
    /// Last reminders or error, shown under the table.
    pub status: Option<String>,
    /// Every reminder fired this session.
    pub reminders: RecordingNotifier,
    default_reminder_minutes: u32,
}

impl App {
    /// Loads the task file and arms reminders that are still ahead of `now`.
    pub fn new(config: &Config, now: DateTime<Local>) -> App {
        let file = TaskFile::new(config.db_path());
        let mut board = TaskBoard::new(file.load(), NotificationScheduler::new(config.reminder_hour));
        board.rearm_all(now);

        let mut app = App {
            board,
            file,
            rows: Vec::new(),
            state: TableState::default(),
            view_mode: ViewMode::Tasks,
            input_mode: InputMode::Normal,
            input_field: InputField::Text,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            filter: StatusFilter::All,
            sort: config.default_sort,
            status: None,
            reminders: RecordingNotifier::default(),
            default_reminder_minutes: config.default_reminder_minutes,
        };
        app.refresh();
        app
    }

    /// Visible tasks in display order.
    pub fn visible(&self) -> Vec<&Task> {
        self.rows.iter().filter_map(|id| self.board.get(id)).collect()
    }

    fn selected_id(&self) -> Option<TaskId> {
        if self.view_mode != ViewMode::Tasks {
            return None;
        }
        self.state.selected().and_then(|i| self.rows.get(i)).cloned()
    }

    /// Re-sorts and re-filters the visible rows, keeping the selection in range.
    pub fn refresh(&mut self) {
        let visible: Vec<Task> = self.board.filtered(self.filter).into_iter().cloned().collect();
        self.rows = sort_tasks(&visible, self.sort, Local::now())
            .into_iter()
            .map(|t| t.id.clone())
            .collect();

        if self.rows.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.rows.len() {
                self.state.select(Some(self.rows.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Saves the board after a mutation, or reports why it failed.
    fn commit(&mut self, result: Result<()>) {
        let result = result.and_then(|_| self.file.save(self.board.tasks()));
        if let Err(e) = result {
            self.status = Some(format!("Error: {e}"));
        }
        self.refresh();
    }

    /// Delivers every reminder due by `now` to the inbox and lists them in
    /// the status line.
    pub fn tick(&mut self, now: DateTime<Local>) {
        let seen = self.reminders.delivered.len();
        if self.board.scheduler_mut().fire_due(now, &mut self.reminders) == 0 {
            return;
        }
        let fired: Vec<String> = self.reminders.delivered[seen..]
            .iter()
            .map(|n| {
                if n.body.is_empty() {
                    n.title.clone()
                } else {
                    format!("{}: {}", n.title, n.body)
                }
            })
            .collect();
        self.status = Some(fired.join(" | "));
    }

    /// Selects the next row.
    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row.
    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Toggles the selected task between done and active.
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.board.toggle(&id, Local::now()).map(|_| ());
            self.commit(result);
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.board.delete(&id).map(|_| ());
            self.commit(result);
        }
    }

    /// Cycles the selected task's priority through low, normal and high.
    pub fn cycle_priority(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let Some(task) = self.board.get(&id) else { return };
        let priority = match task.priority {
            Priority::Low => Priority::Normal,
            Priority::Normal | Priority::Other(_) => Priority::High,
            Priority::High | Priority::Urgent => Priority::Low,
        };
        let patch = TaskPatch {
            priority: Some(priority),
            ..TaskPatch::default()
        };
        let result = self.board.edit(&id, patch, Local::now());
        self.commit(result);
    }

    /// Moves the selected task `delta` places in the stored order.
    ///
    /// Only meaningful under the manual sort, where display and stored order
    /// coincide.
    pub fn move_selected(&mut self, delta: isize) {
        if self.sort != SortCriterion::Manual {
            self.status = Some("Switch to manual sort (s) to reorder".into());
            return;
        }
        let Some(id) = self.selected_id() else { return };
        let Some(from) = self.board.tasks().iter().position(|t| t.id == id) else {
            return;
        };
        let Some(to) = from.checked_add_signed(delta) else { return };
        let result = self.board.move_task(&id, to).map(|_| ());
        self.commit(result);
        if let Some(row) = self.rows.iter().position(|r| *r == id) {
            self.state.select(Some(row));
        }
    }

    pub fn clear_completed(&mut self) {
        self.board.clear_completed();
        self.commit(Ok(()));
    }

    pub fn cycle_filter(&mut self) {
        self.filter = match self.filter {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        };
        self.refresh();
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.cycle();
        self.refresh();
    }

    /// Switches between the task table and the seven-day plan.
    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Tasks => ViewMode::Week,
            ViewMode::Week => ViewMode::Tasks,
        };
    }

    /// Opens the "Add Task" prompt.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    /// Opens an edit prompt for one field of the selected task.
    pub fn start_edit(&mut self, field: InputField) {
        let Some(id) = self.selected_id() else { return };
        let Some(task) = self.board.get(&id) else { return };
        self.input_buffer = match field {
            InputField::Text => task.text.clone(),
            InputField::Due => task.due_date.map(|d| d.to_string()).unwrap_or_default(),
            InputField::Recur => match &task.recurring {
                None => String::new(),
                Some(r) => match (r.end_type, r.end_date, r.occurrences) {
                    (EndType::Until, Some(end), _) => format!("{} {}", r.pattern, end),
                    (EndType::Occurrences, _, Some(n)) => format!("{} {}", r.pattern, n),
                    _ => r.pattern.to_string(),
                },
            },
            InputField::Remind => task
                .notifications
                .filter(|n| n.enabled)
                .map_or(self.default_reminder_minutes, |n| n.time)
                .to_string(),
        };
        self.target_id = Some(id);
        self.input_field = field;
        self.input_mode = InputMode::Editing;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles Enter in a prompt.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Normal => {}
        }
    }

    fn handle_adding_input(&mut self) {
        match self.add_state.step {
            0 => {
                // Text
                if !self.input_buffer.trim().is_empty() {
                    self.add_state.text = self.input_buffer.clone();
                    self.add_state.step += 1;
                    self.input_buffer.clear();
                }
            }
            _ => {
                // Due (optional)
                let due = self.input_buffer.trim();
                let result = if due.is_empty() { Ok(None) } else { parse_date(due).map(Some) };
                let result = result.and_then(|due_date| {
                    let new = NewTask {
                        due_date,
                        ..NewTask::new(self.add_state.text.clone())
                    };
                    self.board.add(new, Local::now()).map(|_| ())
                });
                self.cancel_input();
                self.commit(result);
            }
        }
    }

    fn handle_editing_input(&mut self) {
        let Some(id) = self.target_id.take() else {
            self.cancel_input();
            return;
        };
        let value = self.input_buffer.trim().to_string();
        let patch = match self.input_field {
            InputField::Text => Ok(TaskPatch {
                text: Some(value),
                ..TaskPatch::default()
            }),
            InputField::Due => {
                let due = if value.is_empty() { Ok(None) } else { parse_date(&value).map(Some) };
                due.map(|d| TaskPatch {
                    due_date: Some(d),
                    ..TaskPatch::default()
                })
            }
            InputField::Recur => {
                recur_args(&value).to_spec().map(|spec| TaskPatch {
                    recurring: Some(spec),
                    ..TaskPatch::default()
                })
            }
            InputField::Remind => {
                let settings = if value.is_empty() {
                    Ok(None)
                } else {
                    value
                        .parse::<u32>()
                        .map(|m| Some(NotificationSettings::minutes_before(m)))
                        .map_err(|_| crate::Error::InvalidInput(format!("not a number of minutes: {value}")))
                };
                settings.map(|n| TaskPatch {
                    notifications: Some(n),
                    ..TaskPatch::default()
                })
            }
        };
        let result = patch.and_then(|p| self.board.edit(&id, p, Local::now()));
        self.cancel_input();
        self.commit(result);
    }
}
