//! GPU Orchestrator HTTP Client
//!
//! A typed HTTP client for the GPU orchestration service's job API.
//!
//! The client submits training jobs described by a [`JobSpec`](gpuorch_core::spec::JobSpec),
//! fetches and lists job snapshots, and can poll a job until it reaches a
//! terminal status.
//!
//! # Example
//!
//! ```no_run
//! use gpuorch_client::OrchestratorClient;
//! use gpuorch_core::spec::SubmitJob;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OrchestratorClient::new("http://localhost:8080");
//!
//!     let job = client
//!         .submit_job(&SubmitJob::new(
//!             "resnet50-imagenet",
//!             "pytorch_ddp",
//!             "s3://my-bucket/train.py",
//!             "s3://datasets/imagenet",
//!             8,
//!             100.0,
//!         ))
//!         .await?;
//!
//!     let done = client.wait_until_terminal(&job.id, Duration::from_secs(5)).await?;
//!     println!("{} finished as {}", done.id, done.status);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod wait;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use gpuorch_core::domain::job::{Job, JobStatus};
pub use wait::WaitOptions;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// Default origin of the orchestration service
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Version prefix of every API path
const API_PREFIX: &str = "/v1";

/// HTTP client for the orchestration service
///
/// Holds only the immutable base URL and a pooled HTTP client, so it is cheap
/// to clone and share.
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// Origin of the service (e.g., "http://localhost:8080")
    api_url: String,
    /// Origin plus API version prefix
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl Default for OrchestratorClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl OrchestratorClient {
    /// Create a new orchestrator client
    ///
    /// # Arguments
    /// * `api_url` - Origin of the service; a trailing slash is ignored
    ///
    /// # Example
    /// ```
    /// use gpuorch_client::OrchestratorClient;
    ///
    /// let client = OrchestratorClient::new("http://localhost:8080/");
    /// assert_eq!(client.base_url(), "http://localhost:8080/v1");
    /// ```
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(api_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use gpuorch_client::OrchestratorClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = OrchestratorClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(api_url: impl Into<String>, client: Client) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let base_url = format!("{}{}", api_url, API_PREFIX);
        Self {
            api_url,
            base_url,
            client,
        }
    }

    /// Origin of the service, without trailing slash
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Versioned base URL every request is built on
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status against what `op` expects and deserialize the body
    ///
    /// Any other status, including other 2xx codes, is reported as the
    /// operation's own error variant with the raw body attached.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        op: Operation,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status != op.expected_status() {
            let body = response.text().await?;
            tracing::warn!(operation = op.name(), status = status.as_u16(), "request rejected");
            return Err(op.rejected(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// API operations, each with its own success status and error variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Submit,
    Fetch,
    List,
    Cancel,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Submit => "submit",
            Operation::Fetch => "fetch",
            Operation::List => "list",
            Operation::Cancel => "cancel",
        }
    }

    fn expected_status(self) -> StatusCode {
        match self {
            Operation::Submit => StatusCode::CREATED,
            Operation::Fetch | Operation::List | Operation::Cancel => StatusCode::OK,
        }
    }

    fn rejected(self, status: u16, body: String) -> ClientError {
        match self {
            Operation::Submit => ClientError::Submission { status, body },
            Operation::Fetch => ClientError::Fetch { status, body },
            Operation::List => ClientError::List { status, body },
            Operation::Cancel => ClientError::Cancel { status, body },
        }
    }
}
