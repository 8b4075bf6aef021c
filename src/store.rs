// Task store: ordered task collection mirrored to a persistence collaborator

use crate::error::TaskError;
use crate::filter::{Stats, TaskFilter};
use crate::persist::Persistence;
use crate::task::{Task, next_id};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// In-memory task collection plus the current view filter
///
/// The task sequence is loaded once at construction and fully re-serialized
/// to the persistence collaborator after every mutation. The filter only
/// affects reads and is never persisted.
pub struct TaskStore<P: Persistence> {
    tasks: Vec<Task>,
    filter: TaskFilter,
    last_id: i64,
    persistence: P,
}

impl<P: Persistence> TaskStore<P> {
    /// Load the task sequence from `persistence`
    ///
    /// Absent, unreadable or malformed data yields an empty store.
    pub fn open(persistence: P) -> Self {
        let tasks = match persistence.load() {
            Ok(Some(data)) => Self::parse_tasks(&data),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = ?e, "Failed to load tasks, starting empty");
                Vec::new()
            }
        };

        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        info!(count = tasks.len(), "Loaded tasks");

        Self {
            tasks,
            filter: TaskFilter::default(),
            last_id,
            persistence,
        }
    }

    /// Parse a persisted blob, dropping records that would break the invariants
    fn parse_tasks(data: &str) -> Vec<Task> {
        let parsed: Vec<Task> = match serde_json::from_str(data) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = ?e, "Failed to parse persisted tasks, starting empty");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        parsed
            .into_iter()
            .filter(|task| {
                if task.text.trim().is_empty() {
                    warn!(id = task.id, "Skipping task with empty text");
                    return false;
                }
                if !seen.insert(task.id) {
                    warn!(id = task.id, "Skipping task with duplicate id");
                    return false;
                }
                true
            })
            .collect()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new pending task
    pub fn add(&mut self, text: &str) -> Result<Task, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyInput);
        }

        let id = match next_id(self.last_id) {
            Some(id) => {
                self.last_id = id;
                id
            }
            None => {
                warn!(last_id = self.last_id, "Id space exhausted, reusing a free id");
                self.lowest_free_id()
            }
        };

        let task = Task::new(id, text);
        self.tasks.push(task.clone());
        debug!(id, "Added task");

        self.persist();
        Ok(task)
    }

    /// Flip the completion state of the task with this id
    pub fn toggle_completed(&mut self, id: i64) -> Result<Task, TaskError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;

        task.completed = !task.completed;
        let updated = task.clone();
        debug!(id, completed = updated.completed, "Toggled task");

        self.persist();
        Ok(updated)
    }

    /// Remove the task with this id; returns whether one was removed
    ///
    /// Persists even when nothing matched.
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        debug!(id, removed, "Deleted task");

        self.persist();
        removed
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    /// Tasks visible under the current filter, in insertion order
    pub fn list_filtered(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.filter.matches(t)).collect()
    }

    pub fn stats(&self) -> Stats {
        Stats::from_tasks(&self.tasks)
    }

    /// Full task sequence, ignoring the filter
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn into_persistence(self) -> P {
        self.persistence
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Smallest positive id not held by any task
    fn lowest_free_id(&self) -> i64 {
        let used: HashSet<i64> = self.tasks.iter().map(|t| t.id).collect();
        (1..).find(|id| !used.contains(id)).unwrap_or(0)
    }

    /// Write the whole sequence; a failure is retried by the next mutation's write
    fn persist(&mut self) {
        let data = match serde_json::to_string(&self.tasks) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = ?e, "Failed to serialize tasks");
                return;
            }
        };

        if let Err(e) = self.persistence.save(&data) {
            warn!(error = ?e, count = self.tasks.len(), "Failed to persist tasks");
        }
    }
}
