//! Polling a job until it reaches a terminal status

use std::time::Duration;

use gpuorch_core::domain::job::Job;
use tokio::time::Instant;

use crate::OrchestratorClient;
use crate::error::{ClientError, Result};

/// How to poll while waiting for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Delay between two consecutive polls
    pub poll_interval: Duration,
    /// Give up after this long; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            timeout: None,
        }
    }
}

impl WaitOptions {
    /// Poll at the given interval with no timeout
    pub fn every(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            timeout: None,
        }
    }

    /// Fail with [`ClientError::WaitTimeout`] once `timeout` has elapsed
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl OrchestratorClient {
    /// Poll a job until its status is completed, failed or cancelled
    ///
    /// The first poll happens immediately; later polls are spaced by
    /// `poll_interval`. There is no upper bound on the wait: use
    /// [`wait_with`](Self::wait_with) with a timeout to bound it.
    ///
    /// # Errors
    /// Any error from [`get_job`](Self::get_job) aborts the wait at once.
    pub async fn wait_until_terminal(&self, job_id: &str, poll_interval: Duration) -> Result<Job> {
        self.wait_with(job_id, WaitOptions::every(poll_interval), |_| {})
            .await
    }

    /// Poll a job until it is terminal, calling `on_poll` with every snapshot
    ///
    /// Only a terminal snapshot is ever returned. When `options.timeout` is set
    /// and elapses before a terminal status is seen, the wait fails with
    /// [`ClientError::WaitTimeout`]; the last poll happens at the deadline.
    pub async fn wait_with<F>(
        &self,
        job_id: &str,
        options: WaitOptions,
        mut on_poll: F,
    ) -> Result<Job>
    where
        F: FnMut(&Job),
    {
        if options.poll_interval.is_zero() {
            return Err(ClientError::InvalidRequest(
                "poll interval must be positive".to_string(),
            ));
        }

        let started = Instant::now();
        let mut polls: u64 = 0;

        loop {
            let job = self.get_job(job_id).await?;
            polls += 1;

            tracing::info!(job_id, status = %job.status, polls, "polled job");
            on_poll(&job);

            if job.is_terminal() {
                return Ok(job);
            }

            let mut delay = options.poll_interval;
            if let Some(timeout) = options.timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(ClientError::WaitTimeout {
                        job_id: job_id.to_string(),
                        last_status: job.status.to_string(),
                        waited,
                    });
                }
                delay = delay.min(timeout - waited);
            }

            tokio::time::sleep(delay).await;
        }
    }
}
