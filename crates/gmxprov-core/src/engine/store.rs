use super::error::EngineError;
use super::traits::{CompletedJob, JobHistory, PreviousJobs};
use crate::core::artifact::Artifact;
use crate::core::job::JobDescription;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt job record '{path}': {source}", path = path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No job matches '{0}'")]
    JobNotFound(String),

    #[error("Job id prefix '{0}' is ambiguous")]
    AmbiguousJob(String),

    #[error("Artifact {0} is not in the store")]
    MissingArtifact(String),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed,
}

impl JobStatus {
    pub fn is_pending(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Finished => "finished",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Everything recorded about one job, persisted as `jobs/<id>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub job_type: String,
    pub description: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Exit status of the wrapped executable. Recorded, never interpreted.
    pub exit_status: Option<i32>,
    /// Exit code assigned by output reconciliation on failure.
    pub exit_code: Option<u32>,
    pub job: JobDescription,
    pub inputs: BTreeMap<String, Artifact>,
    pub outputs: BTreeMap<String, Artifact>,
    pub error: Option<String>,
}

impl JobRecord {
    pub fn new(job: JobDescription, status: JobStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: job.job_type.clone(),
            description: job.metadata.description.clone(),
            status,
            created_at: Utc::now(),
            completed_at: None,
            exit_status: None,
            exit_code: None,
            job,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            error: None,
        }
    }

    pub fn finish(&mut self, status: JobStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
    }
}

/// A provenance store on the local filesystem.
///
/// ```text
/// <root>/artifacts/<sha256>
/// <root>/jobs/<uuid>.json
/// <root>/jobs/<uuid>.lock      while a process executes a queued job
/// <root>/work/<uuid>/
/// <root>/retrieved/<uuid>/
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for sub in ["artifacts", "jobs", "work", "retrieved"] {
            let dir = root.join(sub);
            fs::create_dir_all(&dir).map_err(io_err(&dir))?;
        }
        debug!("Opened provenance store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn retrieved_dir(&self, id: Uuid) -> PathBuf {
        self.root.join("retrieved").join(id.to_string())
    }

    fn artifact_path(&self, digest: &str) -> PathBuf {
        self.root.join("artifacts").join(digest)
    }

    fn job_path(&self, id: Uuid) -> PathBuf {
        self.root.join("jobs").join(format!("{}.json", id))
    }

    fn lock_path(&self, id: Uuid) -> PathBuf {
        self.root.join("jobs").join(format!("{}.lock", id))
    }

    /// Takes exclusive hold of job `id` by creating `jobs/<id>.lock`.
    /// Returns `false` when another process already holds it.
    pub fn claim_job(&self, id: Uuid) -> Result<bool, StoreError> {
        let path = self.lock_path(id);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    pub fn release_job(&self, id: Uuid) -> Result<(), StoreError> {
        let path = self.lock_path(id);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(StoreError::Io { path, source: e }),
            _ => Ok(()),
        }
    }

    /// Stores `bytes` under their digest. Storing the same bytes twice is a no-op.
    pub fn put_artifact(&self, filename: &str, bytes: &[u8]) -> Result<Artifact, StoreError> {
        let artifact = Artifact::from_bytes(filename, bytes);
        let path = self.artifact_path(&artifact.digest);
        if !path.exists() {
            fs::write(&path, bytes).map_err(io_err(&path))?;
        }
        Ok(artifact)
    }

    /// Copies a local file into the store, keeping its basename as the artifact name.
    pub fn import_file(&self, path: &Path, filename: &str) -> Result<Artifact, StoreError> {
        let bytes = fs::read(path).map_err(io_err(path))?;
        self.put_artifact(filename, &bytes)
    }

    pub fn read_artifact(&self, artifact: &Artifact) -> Result<Vec<u8>, StoreError> {
        let path = self.artifact_path(&artifact.digest);
        if !path.is_file() {
            return Err(StoreError::MissingArtifact(artifact.digest.clone()));
        }
        fs::read(&path).map_err(io_err(&path))
    }

    pub fn copy_artifact_to(&self, artifact: &Artifact, dest: &Path) -> Result<(), StoreError> {
        let src = self.artifact_path(&artifact.digest);
        if !src.is_file() {
            return Err(StoreError::MissingArtifact(artifact.digest.clone()));
        }
        fs::copy(&src, dest).map_err(io_err(dest))?;
        Ok(())
    }

    pub fn save_job(&self, record: &JobRecord) -> Result<(), StoreError> {
        let path = self.job_path(record.id);
        let json = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_err(&path))
    }

    pub fn load_job(&self, id: Uuid) -> Result<JobRecord, StoreError> {
        let path = self.job_path(id);
        if !path.is_file() {
            return Err(StoreError::JobNotFound(id.to_string()));
        }
        read_record(&path)
    }

    /// Looks a job up by full id or unique id prefix.
    pub fn find_job(&self, prefix: &str) -> Result<JobRecord, StoreError> {
        if let Ok(id) = Uuid::parse_str(prefix) {
            return self.load_job(id);
        }
        let mut matches = self
            .jobs()?
            .into_iter()
            .filter(|r| r.id.to_string().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record),
            (Some(_), Some(_)) => Err(StoreError::AmbiguousJob(prefix.to_string())),
            (None, _) => Err(StoreError::JobNotFound(prefix.to_string())),
        }
    }

    /// Every recorded job, oldest first.
    pub fn jobs(&self) -> Result<Vec<JobRecord>, StoreError> {
        let dir = self.root.join("jobs");
        let mut records = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_err(&dir))? {
            let path = entry.map_err(io_err(&dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable job record: {}", e),
            }
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Queued and running jobs, oldest first.
    pub fn unfinished(&self) -> Result<Vec<JobRecord>, StoreError> {
        Ok(self
            .jobs()?
            .into_iter()
            .filter(|r| r.status.is_pending())
            .collect())
    }
}

fn read_record(path: &Path) -> Result<JobRecord, StoreError> {
    let bytes = fs::read(path).map_err(io_err(path))?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

impl JobHistory for FileStore {
    fn previous_jobs(&self, job_type: Option<&str>) -> Result<PreviousJobs, EngineError> {
        let completed = self
            .jobs()?
            .into_iter()
            .filter(|r| r.status == JobStatus::Finished)
            .filter(|r| job_type.is_none_or(|t| r.job_type == t))
            .filter_map(|r| {
                r.completed_at.map(|completed_at| CompletedJob {
                    id: r.id,
                    job_type: r.job_type,
                    completed_at,
                    outputs: r.outputs,
                })
            })
            .collect();
        Ok(PreviousJobs::new(completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::fixtures::description;
    use chrono::Duration;
    use tempfile::tempdir;

    fn finished(store: &FileStore, job_type: &str, offset_secs: i64, gro: &[u8]) -> JobRecord {
        let mut record = JobRecord::new(description(job_type), JobStatus::Running);
        record.status = JobStatus::Finished;
        record.completed_at = Some(record.created_at + Duration::seconds(offset_secs));
        let artifact = store.put_artifact("conf.gro", gro).unwrap();
        record.outputs.insert("grofile".to_string(), artifact);
        store.save_job(&record).unwrap();
        record
    }

    #[test]
    fn artifacts_are_content_addressed() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let a = store.put_artifact("a.gro", b"same").unwrap();
        let b = store.put_artifact("b.gro", b"same").unwrap();
        assert_eq!(a.digest, b.digest);
        assert_eq!(store.read_artifact(&b).unwrap(), b"same");
        assert_eq!(fs::read_dir(dir.path().join("artifacts")).unwrap().count(), 1);
    }

    #[test]
    fn job_records_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let record = JobRecord::new(description("gromacs.editconf"), JobStatus::Queued);
        store.save_job(&record).unwrap();
        assert_eq!(store.load_job(record.id).unwrap(), record);
        let prefix = &record.id.to_string()[..8];
        assert_eq!(store.find_job(prefix).unwrap().id, record.id);
    }

    #[test]
    fn previous_jobs_lists_only_finished_jobs_newest_first() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let older = finished(&store, "gromacs.editconf", 1, b"old");
        let newer = finished(&store, "gromacs.editconf", 60, b"new");
        store
            .save_job(&JobRecord::new(description("gromacs.editconf"), JobStatus::Queued))
            .unwrap();

        let history = store.previous_jobs(None).unwrap();
        assert_eq!(history.count(), 2);
        let ids: Vec<_> = history.iter().map(|j| j.id).collect();
        assert_eq!(ids, [newer.id, older.id]);
        assert_eq!(store.unfinished().unwrap().len(), 1);
    }

    #[test]
    fn previous_jobs_can_be_filtered_by_type() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        finished(&store, "gromacs.editconf", 1, b"a");
        let grompp = finished(&store, "gromacs.grompp", 2, b"b");
        let history = store.previous_jobs(Some("gromacs.grompp")).unwrap();
        assert_eq!(history.iter().map(|j| j.id).collect::<Vec<_>>(), [grompp.id]);
    }

    #[test]
    fn a_job_can_only_be_claimed_once_until_released() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let record = JobRecord::new(description("gromacs.mdrun"), JobStatus::Queued);
        store.save_job(&record).unwrap();

        assert!(store.claim_job(record.id).unwrap());
        assert!(!store.claim_job(record.id).unwrap());
        assert_eq!(store.jobs().unwrap().len(), 1);

        store.release_job(record.id).unwrap();
        store.release_job(record.id).unwrap();
        assert!(store.claim_job(record.id).unwrap());
    }

    #[test]
    fn missing_artifact_is_reported() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let ghost = Artifact::from_bytes("ghost.gro", b"never stored");
        assert!(matches!(
            store.read_artifact(&ghost),
            Err(StoreError::MissingArtifact(_))
        ));
    }

    #[test]
    fn unknown_job_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.find_job("deadbeef"),
            Err(StoreError::JobNotFound(_))
        ));
    }
}
