use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::store::{FileStore, JobRecord, JobStatus};
use super::traits::{Engine, JobHandle};
use crate::core::artifact::Artifact;
use crate::core::job::{JobDescription, LocalCopy};
use crate::core::outputs::{RetrievedFolder, reconcile};
use crate::core::staging::FileSource;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub const SCHEDULER_STDERR: &str = "_scheduler-stderr.txt";

/// Executes jobs as child processes on this machine and records them in a
/// [`FileStore`].
#[derive(Debug, Clone)]
pub struct LocalEngine {
    store: FileStore,
    work_root: PathBuf,
}

impl LocalEngine {
    /// Working directories default to `<store>/work/<id>`.
    pub fn new(store: FileStore) -> Self {
        let work_root = store.root().join("work");
        Self { store, work_root }
    }

    /// Runs jobs in `<work_root>/<id>`, typically the computer's `work_dir`.
    pub fn with_work_root(mut self, work_root: impl Into<PathBuf>) -> Self {
        self.work_root = work_root.into();
        self
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn work_dir(&self, id: Uuid) -> PathBuf {
        self.work_root.join(id.to_string())
    }

    /// Runs every queued job, oldest first.
    ///
    /// Each job is claimed in the store before it runs, so a job queued once
    /// is executed once even when several processes drain the queue. A job
    /// whose outputs fail to reconcile is recorded as failed and the
    /// remaining jobs still run.
    #[instrument(skip_all, name = "process_pending")]
    pub fn process_pending(&self, reporter: &ProgressReporter) -> Result<Vec<JobHandle>, EngineError> {
        let queued: Vec<JobRecord> = self
            .store
            .unfinished()?
            .into_iter()
            .filter(|r| r.status == JobStatus::Queued)
            .collect();
        info!("Processing {} queued job(s)", queued.len());

        let mut handles = Vec::with_capacity(queued.len());
        for queued_record in queued {
            let id = queued_record.id;
            if !self.store.claim_job(id)? {
                debug!("Job {} is held by another process", id);
                continue;
            }
            let outcome = self.store.load_job(id).map_err(EngineError::from).and_then(|record| {
                if record.status == JobStatus::Queued {
                    self.execute(record, reporter).map(Some)
                } else {
                    Ok(None)
                }
            });
            self.store.release_job(id)?;

            match outcome {
                Ok(Some(handle)) => handles.push(handle),
                Ok(None) => debug!("Job {} was already processed", id),
                Err(EngineError::JobFailed { id, source }) => {
                    warn!("Job {} failed: {}", id, source);
                    handles.push(JobHandle {
                        id,
                        status: JobStatus::Failed,
                        outputs: Default::default(),
                    });
                }
                Err(e) => {
                    warn!("Job {} could not be executed: {}", id, e);
                    return Err(e);
                }
            }
        }
        Ok(handles)
    }

    fn execute(&self, mut record: JobRecord, reporter: &ProgressReporter) -> Result<JobHandle, EngineError> {
        record.status = JobStatus::Running;
        self.store.save_job(&record)?;

        match self.execute_inner(&mut record, reporter) {
            Ok(()) => {
                record.finish(JobStatus::Finished);
                self.store.save_job(&record)?;
                info!("Job {} finished with {} output(s)", record.id, record.outputs.len());
                Ok(JobHandle {
                    id: record.id,
                    status: record.status,
                    outputs: record.outputs,
                })
            }
            Err(e) => {
                record.exit_code = e.exit_code();
                record.error = Some(e.to_string());
                record.finish(JobStatus::Failed);
                self.store.save_job(&record)?;
                Err(e)
            }
        }
    }

    fn execute_inner(&self, record: &mut JobRecord, reporter: &ProgressReporter) -> Result<(), EngineError> {
        let job = record.job.clone();
        let work_dir = self.work_dir(record.id);
        fs::create_dir_all(&work_dir).map_err(|e| EngineError::io(&work_dir, e))?;

        reporter.report(Progress::PhaseStart { name: "Staging" });
        for copy in &job.local_copy_list {
            let artifact = self.stage_copy(copy, &work_dir)?;
            record.inputs.insert(copy.role.clone(), artifact);
            reporter.report(Progress::FileStaged {
                name: copy.dest_name.clone(),
            });
        }
        reporter.report(Progress::PhaseFinish);

        reporter.report(Progress::PhaseStart { name: "Executing" });
        record.exit_status = self.spawn(&job, &work_dir)?;
        reporter.report(Progress::PhaseFinish);

        reporter.report(Progress::PhaseStart { name: "Retrieving" });
        let retrieved_dir = self.store.retrieved_dir(record.id);
        fs::create_dir_all(&retrieved_dir).map_err(|e| EngineError::io(&retrieved_dir, e))?;
        for name in job
            .retrieve_list
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(SCHEDULER_STDERR))
        {
            let src = work_dir.join(name);
            if !src.is_file() {
                debug!("'{}' was not produced", name);
                continue;
            }
            let dest = retrieved_dir.join(name);
            fs::copy(&src, &dest).map_err(|e| EngineError::io(&dest, e))?;
            reporter.report(Progress::FileRetrieved {
                name: name.to_string(),
            });
        }
        reporter.report(Progress::PhaseFinish);

        reporter.report(Progress::PhaseStart { name: "Parsing" });
        let reconciled = reconcile(
            &job.outputs,
            &RetrievedFolder::new(&retrieved_dir),
            Some(&job.metadata.options.output_dir),
        )
        .map_err(|source| EngineError::JobFailed {
            id: record.id,
            source,
        })?;
        for output in reconciled {
            let artifact = self.store.put_artifact(&output.filename, &output.content)?;
            record.outputs.insert(output.label, artifact);
        }
        reporter.report(Progress::PhaseFinish);
        Ok(())
    }

    fn stage_copy(&self, copy: &LocalCopy, work_dir: &Path) -> Result<Artifact, EngineError> {
        let dest = work_dir.join(&copy.dest_name);
        match &copy.source {
            FileSource::Local { path } => {
                fs::copy(path, &dest).map_err(|e| EngineError::io(path, e))?;
                Ok(self.store.import_file(&dest, &copy.dest_name)?)
            }
            FileSource::Artifact { artifact, job } => {
                debug!(
                    "Reusing artifact {} from job {:?} as '{}'",
                    artifact.short_digest(),
                    job,
                    copy.dest_name
                );
                self.store.copy_artifact_to(artifact, &dest)?;
                Ok(artifact.clone())
            }
        }
    }

    /// Runs the code in `work_dir`, returning the exit status of the child.
    fn spawn(&self, job: &JobDescription, work_dir: &Path) -> Result<Option<i32>, EngineError> {
        let options = &job.metadata.options;
        let mut command = if options.withmpi {
            let mut c = Command::new("mpirun");
            c.arg("-np")
                .arg(options.resources.total_procs().to_string())
                .arg(&job.code.executable);
            c
        } else {
            Command::new(&job.code.executable)
        };

        let stdout_path = work_dir.join(&options.output_filename);
        let stdout = File::create(&stdout_path).map_err(|e| EngineError::io(&stdout_path, e))?;
        let stderr_path = work_dir.join(SCHEDULER_STDERR);
        let stderr = File::create(&stderr_path).map_err(|e| EngineError::io(&stderr_path, e))?;

        info!("Running {} {}", job.code.executable.display(), job.cmdline);
        let status = command
            .args(job.cmdline.tokens())
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .map_err(|source| EngineError::Spawn {
                program: job.code.executable.clone(),
                source,
            })?;

        if !status.success() {
            warn!("'{}' exited with {}", job.code.label, status);
        }
        Ok(status.code())
    }
}

impl Engine for LocalEngine {
    #[instrument(skip_all, fields(job_type = %job.job_type))]
    fn submit(&self, job: JobDescription, _reporter: &ProgressReporter) -> Result<JobHandle, EngineError> {
        let record = JobRecord::new(job, JobStatus::Queued);
        self.store.save_job(&record)?;
        info!("Queued job {}", record.id);
        Ok(JobHandle {
            id: record.id,
            status: record.status,
            outputs: Default::default(),
        })
    }

    #[instrument(skip_all, fields(job_type = %job.job_type))]
    fn run(&self, job: JobDescription, reporter: &ProgressReporter) -> Result<JobHandle, EngineError> {
        let record = JobRecord::new(job, JobStatus::Running);
        info!("Running job {}", record.id);
        self.execute(record, reporter)
    }

    fn wait_for_pending(&self, reporter: &ProgressReporter) -> Result<(), EngineError> {
        if self.store.unfinished()?.is_empty() {
            return Ok(());
        }
        info!("Waiting for previous jobs to finish before continuing");
        self.process_pending(reporter).map(|_| ())
    }
}
