use super::{JobSpec, SpecError};

/// High-level parameters of a training job submission
///
/// Turned into a [`JobSpec`] carrying the platform defaults. Spot capacity is
/// allowed and the runtime estimate is ten hours unless overridden.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitJob {
    pub name: String,
    pub framework: String,
    /// Location of the training script (e.g. `s3://bucket/train.py`)
    pub entrypoint: String,
    /// Location of the dataset (e.g. `s3://datasets/imagenet`)
    pub dataset: String,
    pub gpus: u32,
    /// Maximum spend in USD
    pub budget: f64,
    pub allow_spot: bool,
    /// Informational only; the service derives its own estimate
    pub estimated_hours: f64,
}

impl SubmitJob {
    pub fn new(
        name: impl Into<String>,
        framework: impl Into<String>,
        entrypoint: impl Into<String>,
        dataset: impl Into<String>,
        gpus: u32,
        budget: f64,
    ) -> Self {
        Self {
            name: name.into(),
            framework: framework.into(),
            entrypoint: entrypoint.into(),
            dataset: dataset.into(),
            gpus,
            budget,
            allow_spot: true,
            estimated_hours: 10.0,
        }
    }

    pub fn allow_spot(mut self, allow: bool) -> Self {
        self.allow_spot = allow;
        self
    }

    pub fn estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    /// Build the specification document for this submission
    pub fn to_spec(&self) -> JobSpec {
        JobSpec::training(&self.framework, &self.entrypoint, &self.dataset)
            .gpus(self.gpus)
            .budget(self.budget)
            .allow_spot(self.allow_spot)
    }

    /// Validate the submission and its derived specification
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.name.trim().is_empty() {
            return Err(SpecError::invalid("name", "must not be empty"));
        }
        if !(self.estimated_hours.is_finite() && self.estimated_hours > 0.0) {
            return Err(SpecError::invalid("estimated_hours", "must be positive"));
        }
        self.to_spec().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{DataLocality, ExecutionMode, JobType};

    fn sample() -> SubmitJob {
        SubmitJob::new(
            "job1",
            "pytorch_ddp",
            "s3://b/t.py",
            "s3://d/im",
            8,
            100.0,
        )
    }

    #[test]
    fn test_defaults() {
        let req = sample();
        assert!(req.allow_spot);
        assert_eq!(req.estimated_hours, 10.0);
    }

    #[test]
    fn test_to_spec_copies_inputs() {
        let spec = sample().allow_spot(false).to_spec();
        let job = &spec.job;

        assert_eq!(job.job_type, JobType::Training);
        assert_eq!(job.framework, "pytorch_ddp");
        assert_eq!(job.entrypoint, "s3://b/t.py");
        assert_eq!(job.data.dataset, "s3://d/im");
        assert_eq!(job.data.locality, DataLocality::Prefer);
        assert_eq!(job.resources.gpus, 8);
        assert_eq!(job.constraints.budget, 100.0);
        assert!(!job.constraints.allow_spot);
        assert_eq!(job.execution.mode, ExecutionMode::SingleCluster);
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());
        assert!(sample().estimated_hours(0.0).validate().is_err());

        let mut unnamed = sample();
        unnamed.name = String::new();
        assert!(matches!(
            unnamed.validate(),
            Err(SpecError::Invalid { field: "name", .. })
        ));
    }
}
