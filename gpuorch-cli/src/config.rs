//! Configuration module
//!
//! Handles CLI configuration: the service URL and a client built from it.

use gpuorch_client::OrchestratorClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the orchestration service
    pub api_url: String,
}

impl Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    /// Client for the configured service
    pub fn client(&self) -> OrchestratorClient {
        OrchestratorClient::new(&self.api_url)
    }
}
