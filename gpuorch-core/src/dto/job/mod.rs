//! Job DTOs for the orchestration API

use serde::{Deserialize, Serialize};

use crate::domain::artifact::ArtifactKind;
use crate::domain::job::{Job, JobStatus};

/// Body of `POST /v1/jobs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitJobRequest {
    pub name: String,
    /// Rendered YAML job specification
    pub spec_yaml: String,
}

/// Query string of `GET /v1/jobs`
///
/// Unset fields are left out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl ListJobsQuery {
    /// Query filtered on a single status
    pub fn with_status(status: impl Into<JobStatus>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }
}

/// Query string of `GET /v1/jobs/{id}/artifacts`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactsQuery {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ArtifactKind>,
}

/// One page of jobs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPage {
    pub items: Vec<Job>,
    /// Cursor for the following page; absent or empty on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl JobPage {
    /// Cursor to request the next page, if there is one
    pub fn next(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

/// Response of `GET /v1/jobs`
///
/// Older deployments answer with a bare array, current ones with a paged
/// envelope. Both are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum JobListResponse {
    Bare(Vec<Job>),
    Paged(JobPage),
}

impl From<JobListResponse> for JobPage {
    fn from(resp: JobListResponse) -> Self {
        match resp {
            JobListResponse::Bare(items) => JobPage {
                items,
                next_cursor: None,
            },
            JobListResponse::Paged(page) => page,
        }
    }
}

/// `{ "items": [...] }` envelope used by the event and artifact endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}
