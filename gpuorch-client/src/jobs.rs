//! Job-related API endpoints

use gpuorch_core::domain::artifact::{ArtifactKind, JobArtifact};
use gpuorch_core::domain::event::JobEvent;
use gpuorch_core::domain::job::{Job, JobStatus};
use gpuorch_core::dto::job::{
    ArtifactsQuery, Items, JobListResponse, JobPage, ListJobsQuery, SubmitJobRequest,
};
use gpuorch_core::spec::{JobSpec, SubmitJob};
use reqwest::Url;

use crate::error::{ClientError, Result};
use crate::{Operation, OrchestratorClient};

impl OrchestratorClient {
    // =============================================================================
    // Submission
    // =============================================================================

    /// Submit a training job
    ///
    /// The parameters are validated, turned into a job specification with the
    /// platform defaults and sent to the service.
    ///
    /// # Returns
    /// The created job, including its server-assigned ID
    ///
    /// # Errors
    /// [`ClientError::InvalidRequest`] for invalid parameters (nothing is sent),
    /// [`ClientError::Submission`] when the service does not answer 201.
    ///
    /// # Example
    /// ```no_run
    /// # use gpuorch_client::OrchestratorClient;
    /// # use gpuorch_core::spec::SubmitJob;
    /// # async fn example() -> gpuorch_client::Result<()> {
    /// let client = OrchestratorClient::new("http://localhost:8080");
    /// let job = client
    ///     .submit_job(
    ///         &SubmitJob::new("job1", "pytorch_ddp", "s3://b/t.py", "s3://d/im", 8, 100.0)
    ///             .allow_spot(false),
    ///     )
    ///     .await?;
    /// println!("submitted {}", job.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_job(&self, req: &SubmitJob) -> Result<Job> {
        req.validate()?;
        tracing::debug!(
            name = %req.name,
            estimated_hours = req.estimated_hours,
            "submitting job"
        );

        self.submit_spec(&req.name, &req.to_spec()).await
    }

    /// Submit a job from a caller-built specification
    ///
    /// # Arguments
    /// * `name` - Display name of the job
    /// * `spec` - The job specification document
    pub async fn submit_spec(&self, name: &str, spec: &JobSpec) -> Result<Job> {
        if name.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "job name must not be empty".to_string(),
            ));
        }
        spec.validate()?;

        let body = SubmitJobRequest {
            name: name.to_string(),
            spec_yaml: spec.to_yaml()?,
        };

        let url = format!("{}/jobs", self.base_url);
        tracing::debug!(%url, "POST");
        let response = self.client.post(&url).json(&body).send().await?;

        self.handle_response(Operation::Submit, response).await
    }

    // =============================================================================
    // Query
    // =============================================================================

    /// Get the current snapshot of a job
    ///
    /// # Arguments
    /// * `job_id` - The job ID
    ///
    /// # Errors
    /// [`ClientError::Fetch`] on any status other than 200, including 404.
    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        let url = self.job_url(job_id, None)?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;

        self.handle_response(Operation::Fetch, response).await
    }

    /// List jobs, optionally filtered on a status
    ///
    /// The `status` query parameter is only sent when a filter is given.
    ///
    /// # Errors
    /// [`ClientError::List`] on any status other than 200.
    pub async fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<Job>> {
        let query = ListJobsQuery {
            status,
            ..ListJobsQuery::default()
        };

        Ok(self.list_jobs_page(&query).await?.items)
    }

    /// List one page of jobs
    ///
    /// Each of `status`, `limit` and `cursor` is sent only when set. Pass the
    /// returned page's [`JobPage::next`] cursor to fetch the following page.
    pub async fn list_jobs_page(&self, query: &ListJobsQuery) -> Result<JobPage> {
        let url = format!("{}/jobs", self.base_url);
        tracing::debug!(%url, ?query, "GET");
        let response = self.client.get(&url).query(query).send().await?;

        let list: JobListResponse = self.handle_response(Operation::List, response).await?;
        Ok(list.into())
    }

    /// Status transitions recorded for a job
    pub async fn job_events(&self, job_id: &str) -> Result<Vec<JobEvent>> {
        let url = self.job_url(job_id, Some("events"))?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;

        let events: Items<JobEvent> = self.handle_response(Operation::Fetch, response).await?;
        Ok(events.items)
    }

    /// Artifacts produced by a job, optionally restricted to one kind
    pub async fn job_artifacts(
        &self,
        job_id: &str,
        kind: Option<ArtifactKind>,
    ) -> Result<Vec<JobArtifact>> {
        let url = self.job_url(job_id, Some("artifacts"))?;
        tracing::debug!(%url, ?kind, "GET");
        let response = self
            .client
            .get(url)
            .query(&ArtifactsQuery { kind })
            .send()
            .await?;

        let artifacts: Items<JobArtifact> =
            self.handle_response(Operation::Fetch, response).await?;
        Ok(artifacts.items)
    }

    // =============================================================================
    // Control
    // =============================================================================

    /// Ask the service to cancel a job
    ///
    /// # Returns
    /// The service's acknowledgement, normally carrying status `cancelled`
    ///
    /// # Errors
    /// [`ClientError::Cancel`] on any status other than 200.
    pub async fn cancel_job(&self, job_id: &str) -> Result<Job> {
        let url = self.job_url(job_id, Some("cancel"))?;
        tracing::debug!(%url, "POST");
        let response = self.client.post(url).send().await?;

        self.handle_response(Operation::Cancel, response).await
    }

    /// URL of a job resource, with the id escaped as a single path segment
    fn job_url(&self, job_id: &str, action: Option<&str>) -> Result<Url> {
        if job_id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "job id must not be empty".to_string(),
            ));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid API URL: {}", e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ClientError::InvalidRequest(format!("API URL {} cannot be a base", self.base_url))
            })?;
            segments.pop_if_empty().push("jobs").push(job_id);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }
}
