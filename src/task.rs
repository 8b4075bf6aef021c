// Task record and timestamp helpers

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A single to-do item
///
/// Serialized with exactly the fields `id`, `text`, `completed` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    /// ISO-8601, informational only
    pub created_at: String,
}

impl Task {
    /// Build a pending task created now
    pub(crate) fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at: now_iso(),
        }
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Next id after `last`: the wall clock, bumped past `last` when the clock hasn't moved
///
/// `None` when `last` is already `i64::MAX`.
pub(crate) fn next_id(last: i64) -> Option<i64> {
    last.checked_add(1).map(|next| now_ms().max(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_now_iso_format() {
        let ts = now_iso();
        assert_eq!(ts.len(), "2024-05-01T12:00:00.000Z".len());
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_next_id_is_monotonic() {
        let far_future = now_ms() + 1_000_000;
        assert_eq!(next_id(far_future), Some(far_future + 1));

        let id = next_id(0).unwrap();
        assert!(id >= 1_600_000_000_000);

        assert_eq!(next_id(i64::MAX), None);
    }

    #[test]
    fn test_task_serialization_field_names() {
        let task = Task {
            id: 1714564800000,
            text: "buy milk".to_string(),
            completed: false,
            created_at: "2024-05-01T12:00:00.000Z".to_string(),
        };

        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"id":1714564800000,"text":"buy milk","completed":false,"createdAt":"2024-05-01T12:00:00.000Z"}"#
        );
    }

    #[test]
    fn test_task_deserialization() {
        let json = r#"{"id":42,"text":"walk dog","completed":true,"createdAt":"2024-05-01T12:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 42);
        assert_eq!(task.text, "walk dog");
        assert!(task.completed);
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new(7, "water plants");
        assert_eq!(task.id, 7);
        assert!(!task.completed);
        assert!(task.created_at.ends_with('Z'));
    }
}
