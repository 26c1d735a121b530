use std::path::PathBuf;
use std::sync::PoisonError;

use chrono::Utc;
use chrono_tz::Tz;

use perch_store::{LogStore, Record};

use crate::analytics;
use crate::error::SprintError;
use crate::types::{BestCategory, ProgressRange, ProgressStats, Sprint};

/// Sprint metadata log plus the per-sprint content files.
///
/// Metadata is the append-only log under the store directory; content lives
/// under `content/<user>/sprint_<id>.txt`, written together with the
/// metadata but never part of it.
pub struct SprintStore {
    log: LogStore,
    content_dir: PathBuf,
}

impl SprintStore {
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            content_dir: dir.join("content"),
            log: LogStore::with_dir(dir),
        }
    }

    /// All sprints for a user in append order.
    pub fn list(&self, user: &str) -> Result<Vec<Sprint>, SprintError> {
        let lock = self.log.user_lock(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load(user)
    }

    /// Record a finished sprint: metadata appended to the log, content
    /// written to its own file, as one unit under the user's lock.
    pub fn create(&self, user: &str, mut sprint: Sprint) -> Result<(), SprintError> {
        let lock = self.log.user_lock(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let content = sprint.content.take().unwrap_or_default();
        self.log.append_record(user, &sprint.to_record())?;
        self.write_content(user, sprint.id, &content)
    }

    /// The full text of one sprint.
    pub fn content(&self, user: &str, id: i64) -> Result<String, SprintError> {
        let lock = self.log.user_lock(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let path = self.content_file(user, id);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SprintError::NotFound(id)),
            Err(source) => Err(SprintError::Content { path, source }),
        }
    }

    /// Replace one sprint's tags via a whole-log rewrite in original order.
    pub fn update_tags(
        &self,
        user: &str,
        id: i64,
        tags: Vec<String>,
    ) -> Result<(), SprintError> {
        let lock = self.log.user_lock(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut sprints = self.load(user)?;
        let sprint = sprints
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SprintError::NotFound(id))?;
        sprint.tags = tags;

        let records: Vec<Record> = sprints.iter().map(Sprint::to_record).collect();
        self.log.rewrite_all(user, &records)?;
        Ok(())
    }

    /// The user's best sprint in a category, or `None` with no history.
    pub fn best(
        &self,
        user: &str,
        category: BestCategory,
    ) -> Result<Option<Sprint>, SprintError> {
        let sprints = self.list(user)?;
        Ok(analytics::best_sprint(&sprints, category).cloned())
    }

    /// Longest consecutive-day streak over the whole history.
    pub fn longest_streak(&self, user: &str, tz: Tz) -> Result<usize, SprintError> {
        let sprints = self.list(user)?;
        Ok(analytics::longest_streak(&sprints, tz))
    }

    /// Windowed progress stats, streak attached from the whole history.
    pub fn progress(
        &self,
        user: &str,
        range: ProgressRange,
        tz: Tz,
    ) -> Result<ProgressStats, SprintError> {
        let sprints = self.list(user)?;
        Ok(analytics::progress(&sprints, range, tz, Utc::now()))
    }

    fn load(&self, user: &str) -> Result<Vec<Sprint>, SprintError> {
        let records = self.log.load_all(user)?;
        Ok(records.iter().filter_map(Sprint::from_record).collect())
    }

    fn content_file(&self, user: &str, id: i64) -> PathBuf {
        self.content_dir.join(user).join(format!("sprint_{id}.txt"))
    }

    fn write_content(&self, user: &str, id: i64, content: &str) -> Result<(), SprintError> {
        let path = self.content_file(user, id);
        let parent = self.content_dir.join(user);
        std::fs::create_dir_all(&parent).map_err(|source| SprintError::Content {
            path: parent,
            source,
        })?;
        std::fs::write(&path, content).map_err(|source| SprintError::Content { path, source })
    }
}
