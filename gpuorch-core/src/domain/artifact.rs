//! Job artifact domain types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file produced by a job (checkpoint, log, output, metrics)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobArtifact {
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub uri: String,
    pub created_at: DateTime<Utc>,
}

/// Artifact category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArtifactKind {
    Checkpoint,
    Log,
    Output,
    Metrics,
    Other(String),
}

impl ArtifactKind {
    pub fn as_str(&self) -> &str {
        match self {
            ArtifactKind::Checkpoint => "checkpoint",
            ArtifactKind::Log => "log",
            ArtifactKind::Output => "output",
            ArtifactKind::Metrics => "metrics",
            ArtifactKind::Other(s) => s,
        }
    }
}

impl From<String> for ArtifactKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "checkpoint" => ArtifactKind::Checkpoint,
            "log" => ArtifactKind::Log,
            "output" => ArtifactKind::Output,
            "metrics" => ArtifactKind::Metrics,
            _ => ArtifactKind::Other(s),
        }
    }
}

impl From<ArtifactKind> for String {
    fn from(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
