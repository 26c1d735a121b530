use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::record::{decode, Record};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read log {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write log {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Provides access to one log file per user under a directory.
///
/// The store carries a keyed lock table so callers can serialize their
/// read-modify-append cycles per user; distinct users never contend.
pub struct LogStore {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LogStore {
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The mutual-exclusion handle for one user's log file.
    ///
    /// Hold the inner guard across a whole load/validate/append sequence;
    /// every caller touching the same user's file must do the same.
    pub fn user_lock(&self, user: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(user.to_string()).or_default().clone()
    }

    fn user_file(&self, user: &str) -> PathBuf {
        self.dir.join(format!("{user}.log"))
    }

    /// Read and decode every record in the user's log.
    ///
    /// A missing file is an empty history, not an error.
    pub fn load_all(&self, user: &str) -> Result<Vec<Record>, StoreError> {
        let path = self.user_file(user);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(decode(&raw))
    }

    /// Append one complete encoded record, creating the file if absent.
    pub fn append_record(&self, user: &str, record: &Record) -> Result<(), StoreError> {
        self.append(user, &record.encode())
    }

    /// Append raw lines to the tail of the log.
    ///
    /// The clock log keeps its current record open at the tail and grows it
    /// line by line; a blank separator line precedes each new entry.
    pub fn append_lines(&self, user: &str, lines: &[String]) -> Result<(), StoreError> {
        let mut text = lines.join("\n");
        text.push('\n');
        self.append(user, &text)
    }

    fn append(&self, user: &str, text: &str) -> Result<(), StoreError> {
        let path = self.user_file(user);
        self.ensure_dir()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        file.write_all(text.as_bytes())
            .map_err(|source| StoreError::Write { path, source })
    }

    /// Replace the whole log with the given records in order.
    ///
    /// Used only for in-place edits such as tag updates; callers hold the
    /// user lock so readers never observe the truncated intermediate state.
    pub fn rewrite_all(&self, user: &str, records: &[Record]) -> Result<(), StoreError> {
        let path = self.user_file(user);
        self.ensure_dir()?;
        let text: String = records.iter().map(Record::encode).collect();
        std::fs::write(&path, text).map_err(|source| StoreError::Write { path, source })
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Write {
            path: self.dir.clone(),
            source,
        })
    }
}
