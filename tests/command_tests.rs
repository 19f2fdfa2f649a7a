use chrono::{Duration, Local, NaiveDate, TimeZone};
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;
use taskloop::board::StatusFilter;
use taskloop::commands::*;
use taskloop::config::{Config, DB_ENV};
use taskloop::models::{Pattern, Priority, RecurrenceSpec, Task, TaskId};
use taskloop::notify::RecordingNotifier;
use taskloop::storage::TaskFile;

// Use a mutex to ensure tests run serially since they modify the environment variable
static TEST_MUTEX: Mutex<()> = Mutex::new(());

fn with_test_db<F>(f: F)
where
    F: FnOnce(&Config, PathBuf),
{
    let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tasks.json");
    env::set_var(DB_ENV, &db_path);

    f(&Config::default(), db_path);

    env::remove_var(DB_ENV);
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn add_plain(config: &Config, text: &str) -> TaskId {
    cmd_add(config, text.into(), AddOptions::default(), true).unwrap()
}

#[test]
fn test_add_and_list() {
    with_test_db(|config, path| {
        let opts = AddOptions {
            due: Some("2025-12-01".into()),
            priority: Some("high".into()),
            recur: RecurArgs {
                pattern: Some("weekly".into()),
                until: None,
                occurrences: Some(3),
            },
            remind: Some(None),
        };
        let id = cmd_add(config, "Test Task".into(), opts, true).unwrap();

        let tasks = load_tasks(config);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].text, "Test Task");
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[0].due_date, Some(date(2025, 12, 1)));
        let spec = tasks[0].recurring.as_ref().unwrap();
        assert_eq!(spec.occurrences, Some(3));
        assert_eq!(spec.current_occurrence, 1);
        assert_eq!(tasks[0].notifications.unwrap().time, config.default_reminder_minutes);
        assert!(path.exists());

        cmd_list(config, StatusFilter::All, None).unwrap();
    });
}

#[test]
fn test_new_tasks_go_first() {
    with_test_db(|config, _| {
        add_plain(config, "first");
        add_plain(config, "second");
        let tasks = load_tasks(config);
        assert_eq!(tasks[0].text, "second");
        assert_eq!(tasks[1].text, "first");
        assert_ne!(tasks[0].id, tasks[1].id);
    });
}

#[test]
fn test_add_rejects_bad_input() {
    with_test_db(|config, _| {
        assert!(cmd_add(config, "   ".into(), AddOptions::default(), true).is_err());

        let bad_date = AddOptions {
            due: Some("12/01/2025".into()),
            ..AddOptions::default()
        };
        assert!(cmd_add(config, "x".into(), bad_date, true).is_err());

        let orphan_until = AddOptions {
            recur: RecurArgs {
                until: Some("2025-12-01".into()),
                ..RecurArgs::default()
            },
            ..AddOptions::default()
        };
        assert!(cmd_add(config, "x".into(), orphan_until, true).is_err());

        let zero = AddOptions {
            recur: RecurArgs {
                pattern: Some("daily".into()),
                occurrences: Some(0),
                ..RecurArgs::default()
            },
            ..AddOptions::default()
        };
        assert!(cmd_add(config, "x".into(), zero, true).is_err());

        let no_end = AddOptions {
            recur: RecurArgs {
                pattern: Some("weekly".into()),
                ..RecurArgs::default()
            },
            ..AddOptions::default()
        };
        assert!(cmd_add(config, "x".into(), no_end, true).is_err());

        assert!(load_tasks(config).is_empty());
    });
}

#[test]
fn test_complete_recurring_task_spawns_next() {
    with_test_db(|config, _| {
        let opts = AddOptions {
            due: Some("2025-06-02".into()),
            recur: RecurArgs {
                pattern: Some("weekly".into()),
                until: None,
                occurrences: Some(2),
            },
            ..AddOptions::default()
        };
        let id = cmd_add(config, "Standup".into(), opts, true).unwrap();

        assert!(cmd_toggle(config, id.as_str(), true).unwrap());

        let tasks = load_tasks(config);
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].completed);
        assert!(tasks[0].last_recurred.is_some());
        let next = &tasks[1];
        assert!(!next.completed);
        assert_eq!(next.due_date, Some(date(2025, 6, 9)));
        assert_eq!(next.recurring.as_ref().unwrap().current_occurrence, 2);
    });
}

#[test]
fn test_last_occurrence_does_not_spawn() {
    with_test_db(|config, path| {
        let mut task = Task::new(TaskId::from("1"), "Standup", Local::now().into());
        task.due_date = Some(date(2025, 6, 9));
        let mut spec = RecurrenceSpec::occurrences(Pattern::Weekly, 2);
        spec.current_occurrence = 2;
        task.recurring = Some(spec);
        TaskFile::new(&path).save(&[task]).unwrap();

        cmd_toggle(config, "1", true).unwrap();

        let tasks = load_tasks(config);
        assert_eq!(tasks.len(), 1);
        assert!(tasks[0].completed);
    });
}

#[test]
fn test_reopen_task() {
    with_test_db(|config, _| {
        let id = add_plain(config, "Laundry");
        assert!(cmd_toggle(config, id.as_str(), true).unwrap());
        assert!(!cmd_toggle(config, id.as_str(), true).unwrap());
        assert!(!load_tasks(config)[0].completed);
    });
}

#[test]
fn test_toggle_unknown_id() {
    with_test_db(|config, _| {
        assert!(cmd_toggle(config, "missing", true).is_err());
    });
}

#[test]
fn test_remove_task() {
    with_test_db(|config, _| {
        let id = add_plain(config, "Task to remove");
        cmd_remove(config, id.as_str(), true).unwrap();
        assert!(load_tasks(config).is_empty());
        assert!(cmd_remove(config, id.as_str(), true).is_err());
    });
}

#[test]
fn test_edit_task() {
    with_test_db(|config, _| {
        let opts = AddOptions {
            due: Some("2025-12-01".into()),
            recur: RecurArgs {
                pattern: Some("daily".into()),
                until: Some("2025-12-31".into()),
                occurrences: None,
            },
            ..AddOptions::default()
        };
        let id = cmd_add(config, "Original".into(), opts, true).unwrap();

        let edit = EditOptions {
            text: Some("Updated".into()),
            due: Some("none".into()),
            priority: Some("low".into()),
            no_recur: true,
            remind: Some(15),
            ..EditOptions::default()
        };
        cmd_edit(config, id.as_str(), edit, true).unwrap();

        let task = &load_tasks(config)[0];
        assert_eq!(task.text, "Updated");
        assert_eq!(task.due_date, None);
        assert_eq!(task.priority, Priority::Low);
        assert!(task.recurring.is_none());
        assert_eq!(task.notifications.unwrap().time, 15);

        let bad = EditOptions {
            priority: Some("critical".into()),
            ..EditOptions::default()
        };
        assert!(cmd_edit(config, id.as_str(), bad, true).is_err());
    });
}

#[test]
fn test_move_task() {
    with_test_db(|config, _| {
        let a = add_plain(config, "a");
        add_plain(config, "b");
        add_plain(config, "c");
        // stored order is c, b, a
        cmd_move(config, a.as_str(), 0, true).unwrap();
        let texts: Vec<String> = load_tasks(config).into_iter().map(|t| t.text).collect();
        assert_eq!(texts, ["a", "c", "b"]);

        cmd_move(config, a.as_str(), 99, true).unwrap();
        assert_eq!(load_tasks(config)[2].id, a);
    });
}

#[test]
fn test_complete_all_and_clear() {
    with_test_db(|config, _| {
        add_plain(config, "one");
        add_plain(config, "two");
        let keep = add_plain(config, "three");
        cmd_toggle(config, keep.as_str(), true).unwrap();
        cmd_toggle(config, keep.as_str(), true).unwrap();

        assert_eq!(cmd_complete_all(config, StatusFilter::Active, false, true).unwrap(), 3);
        assert_eq!(cmd_complete_all(config, StatusFilter::All, true, true).unwrap(), 3);
        cmd_complete_all(config, StatusFilter::All, false, true).unwrap();
        cmd_toggle(config, keep.as_str(), true).unwrap();

        // completed tasks are cleared without a prompt
        assert_eq!(cmd_clear(config, StatusFilter::Completed, false, true).unwrap(), 2);
        let tasks = load_tasks(config);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, keep);

        assert_eq!(cmd_clear(config, StatusFilter::All, true, true).unwrap(), 1);
        assert!(load_tasks(config).is_empty());
    });
}

#[test]
fn test_check_recurring_catches_up() {
    with_test_db(|config, path| {
        let mut done = Task::new(TaskId::from("1"), "Pay rent", Local::now().into());
        done.completed = true;
        done.due_date = Some(date(2025, 1, 31));
        done.recurring = Some(RecurrenceSpec::open_ended(Pattern::Monthly));
        let open = Task::new(TaskId::from("2"), "Other", Local::now().into());
        TaskFile::new(&path).save(&[done, open]).unwrap();

        assert_eq!(cmd_check_recurring(config, true).unwrap(), 1);
        let tasks = load_tasks(config);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[2].due_date, Some(date(2025, 2, 28)));

        // stamped, so a second run within a day adds nothing
        assert_eq!(cmd_check_recurring(config, true).unwrap(), 0);
    });
}

#[test]
fn test_check_recurring_leaves_finished_series_alone() {
    with_test_db(|config, path| {
        let long_ago: chrono::DateTime<chrono::Utc> = (Local::now() - Duration::days(30)).into();
        let mut first = Task::new(TaskId::from("1"), "Standup", long_ago);
        first.completed = true;
        first.due_date = Some(date(2025, 6, 2));
        first.recurring = Some(RecurrenceSpec::occurrences(Pattern::Weekly, 2));
        first.last_recurred = Some(long_ago);
        let mut second = first.clone();
        second.id = TaskId::from("2");
        second.due_date = Some(date(2025, 6, 9));
        second.recurring.as_mut().unwrap().current_occurrence = 2;
        TaskFile::new(&path).save(&[first, second]).unwrap();

        assert_eq!(cmd_check_recurring(config, true).unwrap(), 0);
        assert_eq!(cmd_check_recurring(config, true).unwrap(), 0);
        let tasks = load_tasks(config);
        assert_eq!(tasks.len(), 2);
        assert!(tasks
            .iter()
            .all(|t| t.recurring.as_ref().unwrap().current_occurrence <= 2));
    });
}

#[test]
fn test_watch_step_delivers_due_reminders() {
    with_test_db(|config, _| {
        let tomorrow = Local::now().date_naive() + Duration::days(1);
        let opts = AddOptions {
            due: Some(tomorrow.to_string()),
            remind: Some(Some(30)),
            ..AddOptions::default()
        };
        let id = cmd_add(config, "Call mom".into(), opts, true).unwrap();

        let start = Local::now();
        let mut notifier = RecordingNotifier::default();
        let wake = watch_step(config, start, start, &mut notifier);
        assert!(notifier.delivered.is_empty());
        assert!(wake <= start + Duration::seconds(60));

        let noon = Local
            .from_local_datetime(&tomorrow.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap();
        watch_step(config, start, noon, &mut notifier);
        assert_eq!(notifier.delivered.len(), 1);
        assert_eq!(notifier.delivered[0].tag, id);
        assert_eq!(notifier.delivered[0].title, "Todo: Call mom");
        assert_eq!(notifier.delivered[0].body, "Due Today");

        // a later pass starting after the fire time stays quiet
        watch_step(config, noon, noon + Duration::minutes(1), &mut notifier);
        assert_eq!(notifier.delivered.len(), 1);
    });
}

#[test]
fn test_schedule_runs_on_empty_and_full_lists() {
    with_test_db(|config, _| {
        cmd_schedule(config).unwrap();
        add_plain(config, "Read a book");
        cmd_schedule(config).unwrap();
    });
}
