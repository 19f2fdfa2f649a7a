//! # taskloop
//!
//! A terminal task manager built around recurring tasks and reminders.
//!
//! * [`recurrence`] computes the next date of a series and decides when it ends.
//! * [`priority`] scores tasks; [`sort`] orders them for display.
//! * [`schedule`] spreads open tasks over the coming week.
//! * [`notify`] turns due dates into reminder timers.
//! * [`board`] owns the task list and applies every mutation.
//! * [`storage`] keeps the list in a single JSON file.

pub mod board;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod priority;
pub mod recurrence;
pub mod schedule;
pub mod sort;
pub mod storage;
pub mod tui;

pub use error::{Error, Result};
