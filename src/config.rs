//! User configuration, read from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::notify::DEFAULT_REMINDER_HOUR;
use crate::sort::SortCriterion;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TASKLOOP_CONFIG";
/// Environment variable overriding the task file location.
pub const DB_ENV: &str = "TASKLOOP_DB";

fn default_reminder_hour() -> u32 {
    DEFAULT_REMINDER_HOUR
}

fn default_reminder_minutes() -> u32 {
    60
}

fn default_log_filter() -> String {
    "taskloop=warn".to_string()
}

/// Settings loaded from `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task file location; `TASKLOOP_DB` takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    /// Local hour of the due date that reminders count back from.
    #[serde(default = "default_reminder_hour")]
    pub reminder_hour: u32,
    /// Lead time used when a reminder is requested without one.
    #[serde(default = "default_reminder_minutes")]
    pub default_reminder_minutes: u32,
    /// Ordering used by `list` and the TUI when none is given.
    pub default_sort: SortCriterion,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: None,
            reminder_hour: default_reminder_hour(),
            default_reminder_minutes: default_reminder_minutes(),
            default_sort: SortCriterion::Priority,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or names a
    /// reminder hour outside `0..=23`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        if config.reminder_hour > 23 {
            return Err(Error::Config(format!(
                "reminder_hour must be 0-23, got {}",
                config.reminder_hour
            )));
        }
        Ok(config)
    }

    /// Loads the config at [`Config::default_path`], or defaults if it does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the config file path.
    ///
    /// The path is determined in the following order:
    /// 1. `TASKLOOP_CONFIG` environment variable.
    /// 2. `<config dir>/taskloop/config.toml`.
    /// 3. `./config.toml` (fallback).
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_ENV).map(PathBuf::from).unwrap_or_else(|_| {
            let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("taskloop");
            p.push("config.toml");
            p
        })
    }

    /// Returns the path to the task file.
    ///
    /// The path is determined in the following order:
    /// 1. `TASKLOOP_DB` environment variable.
    /// 2. `data_file` from the config.
    /// 3. `<local data dir>/taskloop/tasks.json`.
    /// 4. `./tasks.json` (fallback).
    pub fn db_path(&self) -> PathBuf {
        if let Ok(p) = std::env::var(DB_ENV) {
            return PathBuf::from(p);
        }
        if let Some(p) = &self.data_file {
            return p.clone();
        }
        match dirs::data_local_dir() {
            Some(mut p) => {
                p.push("taskloop");
                p.push("tasks.json");
                p
            }
            None => PathBuf::from("tasks.json"),
        }
    }
}
