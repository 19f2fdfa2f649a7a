use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Time-derived unique identifier of a task.
///
/// Serialized as the bare string (`"1704067200000"`), matching the stored
/// format of older task files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

/// Importance level chosen for a task.
///
/// `Urgent` is never offered on input but may appear in migrated or hand-edited
/// files. Any other string is kept verbatim and treated as normal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
    Other(String),
}

impl Priority {
    /// Coarse tier used by the weekly schedule (`high=3, normal=2, low=1`).
    ///
    /// Only `high` reaches the top tier. Urgent and unknown values count as normal.
    pub fn tier(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::High => 3,
            Priority::Normal | Priority::Urgent | Priority::Other(_) => 2,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
            Priority::Other(s) => s,
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "low" => Priority::Low,
            "normal" => Priority::Normal,
            "high" => Priority::High,
            "urgent" => Priority::Urgent,
            _ => Priority::Other(s),
        }
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repetition rule of a recurring series.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Pattern {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
    Weekdays,
    Weekends,
    /// Unrecognized pattern name; advances like `Daily`.
    Other(String),
}

impl Pattern {
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Daily => "daily",
            Pattern::Weekly => "weekly",
            Pattern::Biweekly => "biweekly",
            Pattern::Monthly => "monthly",
            Pattern::Quarterly => "quarterly",
            Pattern::Yearly => "yearly",
            Pattern::Weekdays => "weekdays",
            Pattern::Weekends => "weekends",
            Pattern::Other(s) => s,
        }
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "daily" => Pattern::Daily,
            "weekly" => Pattern::Weekly,
            "biweekly" => Pattern::Biweekly,
            "monthly" => Pattern::Monthly,
            "quarterly" => Pattern::Quarterly,
            "yearly" => Pattern::Yearly,
            "weekdays" => Pattern::Weekdays,
            "weekends" => Pattern::Weekends,
            _ => Pattern::Other(s),
        }
    }
}

impl From<Pattern> for String {
    fn from(p: Pattern) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end condition of a series is active.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum EndType {
    /// Series stops after a calendar end date.
    #[default]
    Until,
    /// Series stops after a fixed number of instances.
    Occurrences,
}

impl From<String> for EndType {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("occurrences") {
            EndType::Occurrences
        } else {
            EndType::Until
        }
    }
}

impl From<EndType> for String {
    fn from(e: EndType) -> Self {
        match e {
            EndType::Until => "until".to_string(),
            EndType::Occurrences => "occurrences".to_string(),
        }
    }
}

fn first_occurrence() -> u32 {
    1
}

/// Recurrence settings attached to a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceSpec {
    pub pattern: Pattern,
    #[serde(default)]
    pub end_type: EndType,
    /// Last allowed due date when `end_type` is `Until`.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Total instances allowed when `end_type` is `Occurrences`.
    #[serde(default)]
    pub occurrences: Option<u32>,
    /// 1-based count of instances produced so far, the first included.
    #[serde(default = "first_occurrence")]
    pub current_occurrence: u32,
}

impl RecurrenceSpec {
    /// A series with no end condition.
    pub fn open_ended(pattern: Pattern) -> Self {
        RecurrenceSpec {
            pattern,
            end_type: EndType::Until,
            end_date: None,
            occurrences: None,
            current_occurrence: 1,
        }
    }

    pub fn until(pattern: Pattern, end_date: NaiveDate) -> Self {
        RecurrenceSpec {
            end_date: Some(end_date),
            ..Self::open_ended(pattern)
        }
    }

    pub fn occurrences(pattern: Pattern, occurrences: u32) -> Self {
        RecurrenceSpec {
            end_type: EndType::Occurrences,
            occurrences: Some(occurrences),
            ..Self::open_ended(pattern)
        }
    }
}

/// Reminder settings: fire `time` minutes before the due date anchor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSettings {
    pub enabled: bool,
    /// Minutes before the due-date anchor.
    pub time: u32,
}

impl NotificationSettings {
    pub fn minutes_before(minutes: u32) -> Self {
        NotificationSettings {
            enabled: true,
            time: minutes,
        }
    }
}

/// Represents a single task in the task list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task.
    pub id: TaskId,
    /// The description of the task.
    pub text: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Timestamp when the task was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Calendar day the task is due.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    /// Recurrence settings; `None` for a one-off task.
    #[serde(default, deserialize_with = "crate::storage::legacy_recurring")]
    pub recurring: Option<RecurrenceSpec>,
    #[serde(default)]
    pub notifications: Option<NotificationSettings>,
    /// Last time this task's series produced a successor.
    #[serde(default)]
    pub last_recurred: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates an incomplete one-off task with normal priority.
    pub fn new(id: TaskId, text: impl Into<String>, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            text: text.into(),
            completed: false,
            created_at: Some(created_at),
            due_date: None,
            priority: Priority::Normal,
            recurring: None,
            notifications: None,
            last_recurred: None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring.is_some()
    }

    /// Whether a reminder has been requested for this task.
    pub fn reminder_enabled(&self) -> bool {
        self.notifications.is_some_and(|n| n.enabled)
    }
}
