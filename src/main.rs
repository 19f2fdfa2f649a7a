//! # taskloop
//!
//! A terminal task manager for repeating chores and deadlines. Quick entry
//! from the CLI, an interactive dashboard in the TUI.
//!
//! ## Features
//!
//! *   **Recurring tasks**: daily, weekly, biweekly, monthly, quarterly,
//!     yearly, weekdays or weekends, ending on a date or after N occurrences.
//!     Completing one creates the next.
//! *   **Reminders**: a reminder fires a chosen number of minutes before
//!     9:00 on the due date (`reminder_hour` in the config).
//! *   **Priority scoring**: tasks are ranked by priority, due date,
//!     recurrence, reminders and age.
//! *   **Weekly plan**: open tasks spread over the next seven days.
//!
//! ## Usage
//!
//! ```bash
//! taskloop add "Water plants" --due 2025-06-02 --recur weekly --occurrences 10 --remind 30
//! taskloop list --sort dueDate --filter active
//! taskloop done <ID>
//! taskloop schedule
//! taskloop watch
//! taskloop            # interactive dashboard
//! ```
//!
//! ## Data Storage
//!
//! Tasks live in `<local data dir>/taskloop/tasks.json`; override with
//! `TASKLOOP_DB` or `data_file` in `<config dir>/taskloop/config.toml`.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process::ExitCode;
use taskloop::board::StatusFilter;
use taskloop::commands::*;
use taskloop::config::Config;
use taskloop::sort::SortCriterion;
use taskloop::tui::run_tui;
use tracing_subscriber::EnvFilter;

const PATTERNS: [&str; 8] = [
    "daily", "weekly", "biweekly", "monthly", "quarterly", "yearly", "weekdays", "weekends",
];

#[derive(Parser)]
#[command(name = "taskloop", version)]
#[command(about = "Task manager with recurring tasks and reminders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Default)]
struct RecurFlags {
    /// Repeat pattern; give --until or --occurrences with it
    #[arg(short, long, value_parser = PATTERNS)]
    recur: Option<String>,
    /// Last due date of the series (YYYY-MM-DD)
    #[arg(long, conflicts_with = "occurrences")]
    until: Option<String>,
    /// Total number of occurrences, the first included
    #[arg(long)]
    occurrences: Option<u32>,
}

impl From<RecurFlags> for RecurArgs {
    fn from(f: RecurFlags) -> Self {
        RecurArgs {
            pattern: f.recur,
            until: f.until,
            occurrences: f.occurrences,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task description (quoted if it has spaces)
        text: String,
        /// Due date in YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
        /// Priority
        #[arg(short, long, value_parser = ["low", "normal", "high"])]
        priority: Option<String>,
        #[command(flatten)]
        recur: RecurFlags,
        /// Remind this many minutes before the due date (config default if no value)
        #[arg(short = 'R', long, num_args = 0..=1)]
        remind: Option<Option<u32>>,
    },
    /// List tasks
    List {
        /// Which tasks to show: all, active, completed
        #[arg(short, long, default_value_t = StatusFilter::All)]
        filter: StatusFilter,
        /// Sort by: priority, dueDate, alphabetical, dateCreated, manual
        #[arg(short, long)]
        sort: Option<String>,
    },
    /// Toggle a task between done and active
    Done {
        id: String,
    },
    /// Complete (or reopen) every task matching a filter
    DoneAll {
        #[arg(short, long, default_value_t = StatusFilter::Active)]
        filter: StatusFilter,
        /// Mark as active instead
        #[arg(long)]
        reopen: bool,
    },
    /// Remove a task
    #[command(alias = "rm")]
    Remove {
        id: String,
    },
    /// Edit a task
    Edit {
        id: String,
        /// New description
        #[arg(short, long)]
        text: Option<String>,
        /// New due date, or "none"
        #[arg(short, long)]
        due: Option<String>,
        /// New priority
        #[arg(short, long, value_parser = ["low", "normal", "high"])]
        priority: Option<String>,
        #[command(flatten)]
        recur: RecurFlags,
        /// Stop repeating
        #[arg(long, conflicts_with = "recur")]
        no_recur: bool,
        /// Remind this many minutes before the due date
        #[arg(short = 'R', long)]
        remind: Option<u32>,
        /// Turn the reminder off
        #[arg(long, conflicts_with = "remind")]
        no_remind: bool,
    },
    /// Move a task within the stored order
    Move {
        id: String,
        /// New 0-based position
        index: usize,
    },
    /// Delete completed tasks (or every task with --all)
    Clear {
        #[arg(short, long)]
        all: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show the seven-day plan
    Schedule,
    /// Create missing next occurrences of completed recurring tasks
    CheckRecurring,
    /// Stay running and print reminders as they come due
    Watch,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

fn init_logging(config: &Config, tui: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if tui {
        builder.with_writer(io::sink).init();
    } else {
        builder.with_writer(io::stderr).init();
    }
}

fn run(cli: Cli, config: &Config) -> taskloop::Result<()> {
    match cli.command {
        Some(Commands::Add { text, due, priority, recur, remind }) => {
            let opts = AddOptions { due, priority, recur: recur.into(), remind };
            cmd_add(config, text, opts, false).map(|_| ())
        }
        Some(Commands::List { filter, sort }) => cmd_list(config, filter, sort.as_deref().map(SortCriterion::from)),
        Some(Commands::Done { id }) => cmd_toggle(config, &id, false).map(|_| ()),
        Some(Commands::DoneAll { filter, reopen }) => cmd_complete_all(config, filter, reopen, false).map(|_| ()),
        Some(Commands::Remove { id }) => cmd_remove(config, &id, false),
        Some(Commands::Edit { id, text, due, priority, recur, no_recur, remind, no_remind }) => {
            let opts = EditOptions { text, due, priority, recur: recur.into(), no_recur, remind, no_remind };
            cmd_edit(config, &id, opts, false)
        }
        Some(Commands::Move { id, index }) => cmd_move(config, &id, index, false),
        Some(Commands::Clear { all, force }) => {
            let filter = if all { StatusFilter::All } else { StatusFilter::Completed };
            cmd_clear(config, filter, force, false).map(|_| ())
        }
        Some(Commands::Schedule) => cmd_schedule(config),
        Some(Commands::CheckRecurring) => cmd_check_recurring(config, false).map(|_| ()),
        Some(Commands::Watch) => cmd_watch(config),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "taskloop", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => run_tui(config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config, matches!(cli.command, Some(Commands::Ui) | None));

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
