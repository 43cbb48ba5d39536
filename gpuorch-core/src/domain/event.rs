//! Job event domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::job::JobStatus;

/// A recorded status transition of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    pub at: DateTime<Utc>,
    /// Absent for the initial transition into the first status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_status: Option<JobStatus>,
    pub to_status: JobStatus,
    #[serde(default)]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_without_from_status() {
        let event: JobEvent = serde_json::from_str(
            r#"{"at":"2024-05-01T10:00:00Z","to_status":"pending","reason":"submitted"}"#,
        )
        .unwrap();
        assert!(event.from_status.is_none());
        assert_eq!(event.to_status, JobStatus::Pending);
        assert_eq!(event.reason, "submitted");
    }

    #[test]
    fn test_event_with_from_status() {
        let event: JobEvent = serde_json::from_str(
            r#"{"at":"2024-05-01T10:00:00Z","from_status":"running","to_status":"cancelled","reason":"user_cancelled"}"#,
        )
        .unwrap();
        assert_eq!(event.from_status, Some(JobStatus::Running));
        assert!(event.to_status.is_terminal());
    }
}
