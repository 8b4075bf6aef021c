// View filtering over the task collection

use crate::error::TaskError;
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// View selector for listing tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl TaskFilter {
    /// Whether `task` belongs in this view
    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Completed => task.completed,
            TaskFilter::Pending => !task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Completed => "completed",
            TaskFilter::Pending => "pending",
        }
    }
}

impl std::fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "completed" => Ok(TaskFilter::Completed),
            "pending" => Ok(TaskFilter::Pending),
            other => Err(TaskError::InvalidArgument(format!(
                "unknown filter '{}' (expected all, completed or pending)",
                other
            ))),
        }
    }
}

/// Counts derived from the task collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl Stats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, completed: bool) -> Task {
        Task {
            id,
            text: format!("task {}", id),
            completed,
            created_at: "2024-05-01T12:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_filter_matches() {
        let done = task(1, true);
        let open = task(2, false);

        assert!(TaskFilter::All.matches(&done));
        assert!(TaskFilter::All.matches(&open));
        assert!(TaskFilter::Completed.matches(&done));
        assert!(!TaskFilter::Completed.matches(&open));
        assert!(TaskFilter::Pending.matches(&open));
        assert!(!TaskFilter::Pending.matches(&done));
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("all".parse::<TaskFilter>().unwrap(), TaskFilter::All);
        assert_eq!("Completed".parse::<TaskFilter>().unwrap(), TaskFilter::Completed);
        assert_eq!(" pending ".parse::<TaskFilter>().unwrap(), TaskFilter::Pending);

        let err = "active".parse::<TaskFilter>().unwrap_err();
        assert!(matches!(err, TaskError::InvalidArgument(_)));
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(TaskFilter::All.to_string(), "all");
        assert_eq!(TaskFilter::Completed.to_string(), "completed");
        assert_eq!(TaskFilter::Pending.to_string(), "pending");
        assert_eq!(TaskFilter::default(), TaskFilter::All);
    }

    #[test]
    fn test_stats_from_tasks() {
        let tasks = vec![task(1, false), task(2, true), task(3, false)];
        let stats = Stats::from_tasks(&tasks);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);

        assert_eq!(Stats::from_tasks(&[]), Stats::default());
    }
}
