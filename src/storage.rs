use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use tracing::{debug, error};

use crate::error::Result;
use crate::models::{Pattern, RecurrenceSpec, Task};

/// JSON file holding the whole task list in stored order.
#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    pub fn new(path: impl Into<PathBuf>) -> TaskFile {
        TaskFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all tasks from the file.
    ///
    /// A missing file is an empty list. A file that cannot be read or parsed
    /// is reported once and also treated as an empty list.
    pub fn load(&self) -> Vec<Task> {
        let s = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                error!(path = %self.path.display(), "failed to read tasks: {e}");
                return Vec::new();
            }
        };
        if s.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<Task>>(&s) {
            Ok(tasks) => {
                debug!(count = tasks.len(), "loaded tasks");
                tasks
            }
            Err(e) => {
                error!(path = %self.path.display(), "failed to parse tasks, starting empty: {e}");
                Vec::new()
            }
        }
    }

    /// Saves the given list of tasks, overwriting the file.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let s = serde_json::to_string_pretty(tasks)?;
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        f.write_all(s.as_bytes())?;
        Ok(())
    }
}

/// Reads the `recurring` field, upgrading the old plain-pattern form.
///
/// `"weekly"` becomes an open-ended `until` series at its first occurrence.
pub(crate) fn legacy_recurring<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<RecurrenceSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Recurring {
        Legacy(String),
        Spec(RecurrenceSpec),
    }

    Ok(match Option::<Recurring>::deserialize(deserializer)? {
        Some(Recurring::Legacy(p)) if p.trim().is_empty() => None,
        Some(Recurring::Legacy(p)) => Some(RecurrenceSpec::open_ended(Pattern::from(p))),
        Some(Recurring::Spec(spec)) => Some(spec),
        None => None,
    })
}
