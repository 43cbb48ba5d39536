//! Job domain types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job snapshot as reported by the orchestration service
///
/// Entirely owned by the service. Every fetch returns a new snapshot that
/// replaces the previous one wholesale; fields the service omits stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<JobCost>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<JobTimestamps>,
    /// Present on submission and list responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Whether the job has reached a status it will never leave
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Accrued cost in USD, zero when the service has not reported any
    pub fn running_cost_usd(&self) -> f64 {
        self.cost.as_ref().map(|c| c.running_usd).unwrap_or(0.0)
    }
}

/// Job lifecycle status
///
/// The member set is defined by the service. Statuses this client does not
/// know are kept verbatim in [`JobStatus::Other`] so a newer server never
/// breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Submitted,
    Scheduled,
    Provisioning,
    Running,
    Checkpointing,
    Completed,
    Failed,
    Cancelled,
    Other(String),
}

impl JobStatus {
    /// Wire representation of the status
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Submitted => "submitted",
            JobStatus::Scheduled => "scheduled",
            JobStatus::Provisioning => "provisioning",
            JobStatus::Running => "running",
            JobStatus::Checkpointing => "checkpointing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Other(s) => s,
        }
    }

    /// Terminal statuses: completed, failed, cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => JobStatus::Pending,
            "submitted" => JobStatus::Submitted,
            "scheduled" => JobStatus::Scheduled,
            "provisioning" => JobStatus::Provisioning,
            "running" => JobStatus::Running,
            "checkpointing" => JobStatus::Checkpointing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "cancelled" => JobStatus::Cancelled,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JobStatus::from(s.to_string()))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cost accounting reported for a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCost {
    #[serde(default)]
    pub running_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_usd: Option<f64>,
}

/// Provider placement chosen by the service for a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// Lifecycle timestamps of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTimestamps {
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_job_deserializes() {
        let job: Job = serde_json::from_str(r#"{"id":"j-1","status":"submitted"}"#).unwrap();
        assert_eq!(job.id, "j-1");
        assert_eq!(job.status, JobStatus::Submitted);
        assert!(job.cost.is_none());
        assert!(job.selected.is_none());
        assert_eq!(job.running_cost_usd(), 0.0);
    }

    #[test]
    fn test_full_job_deserializes() {
        let body = r#"{
            "id": "j-1",
            "name": "resnet50-imagenet",
            "status": "completed",
            "job_type": "training",
            "framework": "pytorch_ddp",
            "execution_mode": "single_cluster",
            "allocations": [],
            "cost": {"running_usd": 12.5, "estimated_usd": null},
            "selected": {
                "provider": "aws",
                "region": "us-east-1",
                "backend": "vm",
                "instance_type": "p4d.24xlarge",
                "spot": true,
                "count": 1
            },
            "timestamps": {
                "created_at": "2024-05-01T10:00:00Z",
                "started_at": "2024-05-01T10:05:00Z",
                "finished_at": null
            }
        }"#;

        let job: Job = serde_json::from_str(body).unwrap();
        assert!(job.is_terminal());
        assert_eq!(job.running_cost_usd(), 12.5);

        let selected = job.selected.unwrap();
        assert_eq!(selected.provider.as_deref(), Some("aws"));
        assert_eq!(selected.instance_type.as_deref(), Some("p4d.24xlarge"));
        assert_eq!(selected.spot, Some(true));

        let timestamps = job.timestamps.unwrap();
        assert!(timestamps.started_at.is_some());
        assert!(timestamps.finished_at.is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Submitted.is_terminal());
        assert!(!JobStatus::Other("archived".to_string()).is_terminal());
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let job: Job = serde_json::from_str(r#"{"id":"j-2","status":"preempted"}"#).unwrap();
        assert_eq!(job.status, JobStatus::Other("preempted".to_string()));

        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "preempted");
    }

    #[test]
    fn test_status_parse_and_display() {
        let status: JobStatus = "checkpointing".parse().unwrap();
        assert_eq!(status, JobStatus::Checkpointing);
        assert_eq!(status.to_string(), "checkpointing");
    }
}
