use crate::core::artifact::digest_file;
use crate::core::params::ChainRoles;
use crate::core::staging::{FileSource, StagedInput};
use crate::engine::error::EngineError;
use crate::engine::traits::PreviousJobs;
use tracing::{info, warn};

/// Replaces staged local files with outputs of earlier jobs that carry the
/// same filename, for every role `roles` allows.
///
/// The newest completed job producing the name wins. A local file that
/// exists with different content is kept instead of the artifact, so an
/// input edited since the earlier job ran is never silently overridden.
/// Returns how many inputs were substituted.
pub fn apply_previous_outputs(
    staged: &mut [StagedInput],
    roles: ChainRoles,
    history: &PreviousJobs,
) -> Result<usize, EngineError> {
    let mut substituted = 0;
    for input in staged.iter_mut() {
        if !roles.allows(&input.role) {
            continue;
        }
        let FileSource::Local { path } = &input.source else {
            continue;
        };
        let Some((job, artifact)) = history.find_output(&input.filename) else {
            continue;
        };

        if path.is_file() {
            let local_digest = digest_file(path).map_err(|e| EngineError::io(path, e))?;
            if local_digest != artifact.digest {
                warn!(
                    "Local '{}' differs from the output of job {}; using the local file",
                    path.display(),
                    job.id
                );
                continue;
            }
        }

        info!(
            "Using '{}' from previous job {} as input '{}'",
            input.filename, job.id, input.role
        );
        input.source = FileSource::Artifact {
            artifact: artifact.clone(),
            job: Some(job.id),
        };
        substituted += 1;
    }
    Ok(substituted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::Artifact;
    use crate::core::job::fixtures::description;
    use crate::engine::store::{FileStore, JobRecord, JobStatus};
    use crate::engine::traits::{CompletedJob, JobHistory};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn completed(id: u128, minute: u32, outputs: &[(&str, &str, &str)]) -> CompletedJob {
        CompletedJob {
            id: Uuid::from_u128(id),
            job_type: "gromacs.editconf".to_string(),
            completed_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap(),
            outputs: outputs
                .iter()
                .map(|(label, name, content)| (label.to_string(), Artifact::from_bytes(*name, content.as_bytes())))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn absent_local_file_is_replaced_by_newest_output() {
        let dir = tempdir().unwrap();
        let mut staged = vec![StagedInput::local("grofile", dir.path().join("boxed.gro")).unwrap()];
        let history = PreviousJobs::new(vec![
            completed(1, 0, &[("grofile", "boxed.gro", "old")]),
            completed(2, 10, &[("grofile", "boxed.gro", "new")]),
        ]);

        let n = apply_previous_outputs(&mut staged, ChainRoles::All, &history).unwrap();
        assert_eq!(n, 1);
        match &staged[0].source {
            FileSource::Artifact { artifact, job } => {
                assert_eq!(*job, Some(Uuid::from_u128(2)));
                assert_eq!(artifact.digest, Artifact::from_bytes("x", b"new").digest);
            }
            other => panic!("expected artifact source, got {other:?}"),
        }
        assert_eq!(staged[0].filename, "boxed.gro");
    }

    #[test]
    fn identical_local_file_is_linked_to_the_artifact() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("topol.top");
        fs::write(&local, "same").unwrap();
        let mut staged = vec![StagedInput::local("topfile", &local).unwrap()];
        let history = PreviousJobs::new(vec![completed(1, 0, &[("topfile", "topol.top", "same")])]);
        assert_eq!(apply_previous_outputs(&mut staged, ChainRoles::All, &history).unwrap(), 1);
    }

    #[test]
    fn edited_local_file_wins_over_stale_artifact() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("topol.top");
        fs::write(&local, "edited").unwrap();
        let mut staged = vec![StagedInput::local("topfile", &local).unwrap()];
        let history = PreviousJobs::new(vec![completed(1, 0, &[("topfile", "topol.top", "original")])]);

        assert_eq!(apply_previous_outputs(&mut staged, ChainRoles::All, &history).unwrap(), 0);
        assert_eq!(staged[0].local_path(), Some(local.as_path()));
    }

    #[test]
    fn roles_outside_the_allowed_set_are_left_alone() {
        let dir = tempdir().unwrap();
        let mut staged = vec![StagedInput::local("n_file", dir.path().join("index.ndx")).unwrap()];
        let history = PreviousJobs::new(vec![completed(1, 0, &[("n_file", "index.ndx", "x")])]);
        let roles = ChainRoles::Only(&["grofile", "topfile", "mdpfile"]);
        assert_eq!(apply_previous_outputs(&mut staged, roles, &history).unwrap(), 0);
        assert!(staged[0].local_path().is_some());
    }

    #[test]
    fn repeated_queries_without_new_jobs_pick_the_same_candidate() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store")).unwrap();
        for content in [b"a".as_slice(), b"b".as_slice()] {
            let mut record = JobRecord::new(description("gromacs.editconf"), JobStatus::Running);
            record.outputs.insert(
                "grofile".to_string(),
                store.put_artifact("conf.gro", content).unwrap(),
            );
            record.finish(JobStatus::Finished);
            store.save_job(&record).unwrap();
        }

        let pick = || {
            let mut staged = vec![StagedInput::local("grofile", dir.path().join("conf.gro")).unwrap()];
            let history = store.previous_jobs(None).unwrap();
            apply_previous_outputs(&mut staged, ChainRoles::All, &history).unwrap();
            staged.remove(0).source
        };
        assert_eq!(pick(), pick());
    }
}
