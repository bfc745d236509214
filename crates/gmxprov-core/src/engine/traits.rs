use super::code::Computer;
use super::error::EngineError;
use super::progress::ProgressReporter;
use super::store::JobStatus;
use crate::core::artifact::Artifact;
use crate::core::job::{CodeRef, JobDescription};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// What a caller gets back after handing a job to an [`Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: Uuid,
    pub status: JobStatus,
    /// Label to artifact, empty until the job has finished.
    pub outputs: BTreeMap<String, Artifact>,
}

/// Executes job descriptions and keeps their provenance.
pub trait Engine {
    /// Queues the job and returns without executing it.
    fn submit(
        &self,
        job: JobDescription,
        reporter: &ProgressReporter,
    ) -> Result<JobHandle, EngineError>;

    /// Executes the job to completion, reconciling its outputs.
    fn run(&self, job: JobDescription, reporter: &ProgressReporter)
    -> Result<JobHandle, EngineError>;

    /// Blocks until no job is queued or running.
    fn wait_for_pending(&self, _reporter: &ProgressReporter) -> Result<(), EngineError> {
        Ok(())
    }
}

pub trait CodeResolver {
    fn get_computer(&self) -> Result<Computer, EngineError>;
    fn get_code(&self, entry_point: &str, computer: &Computer) -> Result<CodeRef, EngineError>;
}

/// A finished job as seen by the previous-job query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    pub id: Uuid,
    pub job_type: String,
    pub completed_at: DateTime<Utc>,
    pub outputs: BTreeMap<String, Artifact>,
}

/// Completed jobs, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviousJobs {
    jobs: Vec<CompletedJob>,
}

impl PreviousJobs {
    /// Orders `jobs` by completion time, newest first, breaking ties on id.
    pub fn new(mut jobs: Vec<CompletedJob>) -> Self {
        jobs.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { jobs }
    }

    pub fn count(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompletedJob> {
        self.jobs.iter()
    }

    /// The newest output artifact named `filename`, with the job that made it.
    pub fn find_output(&self, filename: &str) -> Option<(&CompletedJob, &Artifact)> {
        self.jobs.iter().find_map(|job| {
            job.outputs
                .values()
                .find(|a| a.filename == filename)
                .map(|a| (job, a))
        })
    }
}

/// Read-only view of the job history.
pub trait JobHistory {
    fn previous_jobs(&self, job_type: Option<&str>) -> Result<PreviousJobs, EngineError>;
}
