//! Quest Store
//!
//! Loads and saves the quest log as a single pretty-printed JSON document.
//!
//! Loading never fails on bad content: malformed fields are repaired, a
//! document that cannot be parsed at all is moved aside to `<file>.bak`
//! and a fresh log is returned. Only real I/O failures are errors.

use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::progression::Character;
use crate::quest_log::QuestLog;

/// File name used when no data location is configured
pub const DATA_FILE_NAME: &str = "data.json";

#[derive(Debug, Clone)]
pub struct QuestStore {
    path: PathBuf,
    /// Character for a log that does not exist yet
    defaults: Character,
}

impl QuestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            defaults: Character::default(),
        }
    }

    /// Use a custom starting character for fresh logs
    pub fn with_defaults(mut self, character: Character) -> Self {
        self.defaults = character;
        self
    }

    /// Platform data dir (`~/.local/share/questlog/data.json`), else `./data.json`
    pub fn default_path() -> PathBuf {
        match dirs::data_dir() {
            Some(dir) => dir.join("questlog").join(DATA_FILE_NAME),
            None => PathBuf::from(DATA_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fresh(&self) -> QuestLog {
        QuestLog::with_character(self.defaults.clone())
    }

    /// Read the quest log, repairing what can be repaired
    pub fn load(&self) -> Result<QuestLog> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No quest log yet, creating one");
                let log = self.fresh();
                if let Err(e) = self.save(&log) {
                    error!(path = %self.path.display(), "Failed to create quest log: {}", e);
                }
                return Ok(log);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<QuestLog>(&contents) {
            Ok(mut log) => {
                let fixes = log.repair();
                if fixes > 0 {
                    info!(fixes, "Repaired inconsistencies in quest log");
                }
                Ok(log)
            }
            Err(e) => {
                let backup = backup_path(&self.path);
                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    "Quest log is unreadable ({}), moving it aside and starting fresh",
                    e
                );
                fs::rename(&self.path, &backup)?;
                let mut log = self.fresh();
                log.character.created_at = None;
                Ok(log)
            }
        }
    }

    /// Write the quest log atomically, creating parent directories
    pub fn save(&self, log: &QuestLog) -> Result<()> {
        let json = serde_json::to_string_pretty(log)?;
        atomic_write(&self.path, &json)
    }

    /// Write a snapshot for the user to keep.
    ///
    /// `target` may be a file, a directory, or nothing (current directory);
    /// directories get the dated default file name. Returns the written path.
    pub fn export(log: &QuestLog, target: Option<&Path>, today: NaiveDate) -> Result<PathBuf> {
        let path = match target {
            Some(t) if t.is_dir() => t.join(export_file_name(today)),
            Some(t) => t.to_path_buf(),
            None => PathBuf::from(export_file_name(today)),
        };
        let json = serde_json::to_string_pretty(log)?;
        atomic_write(&path, &json)?;
        info!(path = %path.display(), "Quest log exported");
        Ok(path)
    }
}

/// `questlog-export-YYYY-MM-DD.json`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("questlog-export-{}.json", today.format("%Y-%m-%d"))
}

/// `<file>.bak` next to the data file
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Write to a temp file first, then rename over the target
fn atomic_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp_path = PathBuf::from(temp);

    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 5).unwrap();
        assert_eq!(export_file_name(date), "questlog-export-2025-04-05.json");
    }

    #[test]
    fn test_backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/tmp/q/data.json")),
            PathBuf::from("/tmp/q/data.json.bak")
        );
    }

    #[test]
    fn test_default_path_file_name() {
        assert!(QuestStore::default_path().ends_with(DATA_FILE_NAME));
    }
}
