//! Error types for the orchestrator client

use std::time::Duration;

use gpuorch_core::spec::SpecError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the orchestrator client
///
/// Each API operation has its own variant carrying the HTTP status and the
/// raw response body, so callers can tell which call was rejected.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Job submission was not answered with `201 Created`
    #[error("failed to submit job (status {status}): {body}")]
    Submission {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Fetching a job (or its events/artifacts) was not answered with `200 OK`
    #[error("failed to get job (status {status}): {body}")]
    Fetch {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Listing jobs was not answered with `200 OK`
    #[error("failed to list jobs (status {status}): {body}")]
    List {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Cancelling a job was not answered with `200 OK`
    #[error("failed to cancel job (status {status}): {body}")]
    Cancel {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// HTTP request failed, or the response body could not be read
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Success response carried a body that could not be decoded
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request rejected locally before being sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The job did not reach a terminal status within the wait timeout
    #[error("job {job_id} still {last_status} after {waited:?}")]
    WaitTimeout {
        job_id: String,
        last_status: String,
        waited: Duration,
    },
}

impl ClientError {
    /// HTTP status of a rejected API call
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Submission { status, .. }
            | Self::Fetch { status, .. }
            | Self::List { status, .. }
            | Self::Cancel { status, .. } => Some(*status),
            Self::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body of a rejected API call
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Submission { body, .. }
            | Self::Fetch { body, .. }
            | Self::List { body, .. }
            | Self::Cancel { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Check if the service answered 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }
}

impl From<SpecError> for ClientError {
    fn from(err: SpecError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_errors_expose_status_and_body() {
        let err = ClientError::Fetch {
            status: 404,
            body: "Job not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("Job not found"));
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert_eq!(err.to_string(), "failed to get job (status 404): Job not found");
    }

    #[test]
    fn test_server_error_classification() {
        let err = ClientError::Submission {
            status: 500,
            body: "boom".to_string(),
        };
        assert!(err.is_server_error());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_local_errors_have_no_status() {
        let err = ClientError::InvalidRequest("job id must not be empty".to_string());
        assert_eq!(err.status(), None);
        assert_eq!(err.body(), None);
    }
}
