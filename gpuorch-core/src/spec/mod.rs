//! Job specification document
//!
//! The service accepts jobs as a YAML document rooted at `job:`. This module
//! models that document as plain structs and renders it through `serde_yaml`,
//! so values such as URIs are always escaped correctly.
//!
//! # Example
//!
//! ```
//! use gpuorch_core::spec::JobSpec;
//!
//! let spec = JobSpec::training("pytorch_ddp", "s3://bucket/train.py", "s3://datasets/imagenet")
//!     .gpus(8)
//!     .budget(100.0)
//!     .allow_spot(true);
//!
//! spec.validate().unwrap();
//! let yaml = spec.to_yaml().unwrap();
//! assert!(yaml.contains("pytorch_ddp"));
//! ```

mod memory;
mod submit;

pub use memory::MemorySize;
pub use submit::SubmitJob;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating or rendering a job specification
#[derive(Debug, Error)]
pub enum SpecError {
    /// A field holds a value the service would reject
    #[error("invalid job spec: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    /// The document could not be rendered
    #[error("failed to render job spec: {0}")]
    Render(#[from] serde_yaml::Error),
}

impl SpecError {
    fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

/// Root of the job specification document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub job: JobDefinition,
}

/// The `job:` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDefinition {
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub framework: String,
    pub entrypoint: String,
    pub resources: Resources,
    pub data: DataConfig,
    pub constraints: Constraints,
    pub execution: Execution,
}

/// Kind of workload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    Training,
    Hpo,
    Inference,
    Eval,
}

/// `job.resources`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub gpus: u32,
    pub max_gpus_per_node: u32,
    pub requires_multi_node: bool,
    pub gpu_memory: MemorySize,
    pub cpu_memory: MemorySize,
    /// Share of a single GPU, in (0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_mig: Option<bool>,
    /// MIG partition profile, e.g. `1g.10gb`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mig_profile: Option<String>,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            gpus: 1,
            max_gpus_per_node: 8,
            requires_multi_node: false,
            gpu_memory: MemorySize::gb(80),
            cpu_memory: MemorySize::gb(512),
            gpu_fraction: None,
            use_mig: None,
            mig_profile: None,
        }
    }
}

/// `job.data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub dataset: String,
    pub locality: DataLocality,
    pub replication_policy: ReplicationPolicy,
}

/// How strongly placement should follow the dataset's location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLocality {
    #[default]
    Prefer,
    Required,
    Ignore,
}

/// How datasets are moved next to the compute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplicationPolicy {
    #[default]
    None,
    PreStage,
    OnDemandCache,
}

/// `job.constraints`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Maximum spend in USD
    pub budget: f64,
    pub allow_spot: bool,
    pub min_reliability: f64,
    /// 0.0 optimizes for cost only, 1.0 for performance only
    pub performance_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            budget: 0.0,
            allow_spot: true,
            min_reliability: 0.9,
            performance_weight: 0.0,
            deadline: None,
        }
    }
}

/// `job.execution`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub mode: ExecutionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    SingleCluster,
    MultiTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    K8s,
    Vm,
    Slurm,
    Ray,
}

impl JobSpec {
    /// Training job with the platform defaults
    ///
    /// Defaults: 1 GPU, at most 8 GPUs per node, single node, 80GB GPU
    /// memory, 512GB CPU memory, locality `prefer`, no replication, spot
    /// allowed, minimum reliability 0.9, zero performance weight and
    /// single-cluster execution. The budget starts at zero and must be set.
    pub fn training(
        framework: impl Into<String>,
        entrypoint: impl Into<String>,
        dataset: impl Into<String>,
    ) -> Self {
        Self {
            job: JobDefinition {
                job_type: JobType::Training,
                framework: framework.into(),
                entrypoint: entrypoint.into(),
                resources: Resources::default(),
                data: DataConfig {
                    dataset: dataset.into(),
                    locality: DataLocality::default(),
                    replication_policy: ReplicationPolicy::default(),
                },
                constraints: Constraints::default(),
                execution: Execution::default(),
            },
        }
    }

    pub fn job_type(mut self, job_type: JobType) -> Self {
        self.job.job_type = job_type;
        self
    }

    pub fn gpus(mut self, gpus: u32) -> Self {
        self.job.resources.gpus = gpus;
        self
    }

    pub fn budget(mut self, budget_usd: f64) -> Self {
        self.job.constraints.budget = budget_usd;
        self
    }

    pub fn allow_spot(mut self, allow: bool) -> Self {
        self.job.constraints.allow_spot = allow;
        self
    }

    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.job.constraints.deadline = Some(deadline);
        self
    }

    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.job.execution.mode = mode;
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.job.execution.backend = Some(backend);
        self
    }

    /// Request a fraction of a single GPU
    pub fn gpu_fraction(mut self, fraction: f64) -> Self {
        self.job.resources.gpu_fraction = Some(fraction);
        self
    }

    /// Request a MIG partition of the given profile
    pub fn mig(mut self, profile: impl Into<String>) -> Self {
        self.job.resources.use_mig = Some(true);
        self.job.resources.mig_profile = Some(profile.into());
        self
    }

    /// Check the values the service would otherwise reject or misread
    pub fn validate(&self) -> Result<(), SpecError> {
        let job = &self.job;

        if job.framework.trim().is_empty() {
            return Err(SpecError::invalid("framework", "must not be empty"));
        }
        if job.entrypoint.trim().is_empty() {
            return Err(SpecError::invalid("entrypoint", "must not be empty"));
        }
        if job.data.dataset.trim().is_empty() {
            return Err(SpecError::invalid("dataset", "must not be empty"));
        }
        if job.resources.gpus == 0 {
            return Err(SpecError::invalid("gpus", "must be positive"));
        }
        if job.resources.max_gpus_per_node == 0 {
            return Err(SpecError::invalid("max_gpus_per_node", "must be positive"));
        }
        if !(job.constraints.budget.is_finite() && job.constraints.budget > 0.0) {
            return Err(SpecError::invalid("budget", "must be a positive amount"));
        }
        if !(0.0..=1.0).contains(&job.constraints.min_reliability) {
            return Err(SpecError::invalid("min_reliability", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&job.constraints.performance_weight) {
            return Err(SpecError::invalid(
                "performance_weight",
                "must be within [0, 1]",
            ));
        }
        if let Some(fraction) = job.resources.gpu_fraction {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(SpecError::invalid("gpu_fraction", "must be within (0, 1]"));
            }
        }

        Ok(())
    }

    /// Render the document as YAML
    pub fn to_yaml(&self) -> Result<String, SpecError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
