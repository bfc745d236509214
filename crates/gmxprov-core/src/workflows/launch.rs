use super::calculation::PreparedJob;
use super::chaining::apply_previous_outputs;
use crate::core::job::{JobDescription, JobMetadata, JobOptions, Resources};
use crate::core::params::ChainRoles;
use crate::core::staging::{ensure_unique_roles, verify_sources};
use crate::engine::code::{code_ref, resolve_executable};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::traits::{CodeResolver, Engine, JobHandle, JobHistory};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// Execute now and wait for the outputs.
    #[default]
    Run,
    /// Queue for later execution.
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub description: String,
    pub mode: LaunchMode,
    pub chaining: bool,
    /// Executable to use instead of the one resolved for the entry point.
    pub code_override: Option<PathBuf>,
    pub resources: Resources,
    pub withmpi: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            description: String::new(),
            mode: LaunchMode::default(),
            chaining: true,
            code_override: None,
            resources: Resources::default(),
            withmpi: false,
        }
    }
}

/// Binds a prepared job to a code, chains earlier outputs into its inputs
/// and hands it to the engine.
#[instrument(skip_all, name = "launch", fields(job_type = %prepared.job_type))]
pub fn launch<E, R, H>(
    mut prepared: PreparedJob,
    options: &LaunchOptions,
    engine: &E,
    resolver: &R,
    history: &H,
    reporter: &ProgressReporter,
) -> Result<JobHandle, EngineError>
where
    E: Engine + ?Sized,
    R: CodeResolver + ?Sized,
    H: JobHistory + ?Sized,
{
    let computer = resolver.get_computer()?;
    let code = match &options.code_override {
        Some(program) => resolve_executable(program)
            .map(|exe| code_ref(prepared.entry_point, &computer, exe))
            .ok_or_else(|| EngineError::CodeNotFound {
                entry_point: program.display().to_string(),
                computer: computer.label.clone(),
            })?,
        None => resolver.get_code(prepared.entry_point, &computer)?,
    };

    engine.wait_for_pending(reporter)?;

    if options.chaining && !matches!(prepared.chain_roles, ChainRoles::None) {
        let previous = history.previous_jobs(None)?;
        if !previous.is_empty() {
            let n = apply_previous_outputs(&mut prepared.staged, prepared.chain_roles, &previous)?;
            if n > 0 {
                reporter.report(Progress::Message(format!(
                    "Reusing {} output(s) of earlier jobs",
                    n
                )));
            }
        }
    }

    ensure_unique_roles(&prepared.staged)?;
    verify_sources(&prepared.staged)?;

    let cmdline = prepared.command_line();
    let output_filename = prepared.stdout_name().to_string();
    let description = if options.description.is_empty() {
        format!("{} {}", code.label, cmdline)
    } else {
        options.description.clone()
    };
    let job = JobDescription::build(
        prepared.job_type,
        code,
        cmdline,
        prepared.staged,
        prepared.outputs,
        JobMetadata {
            label: prepared.label,
            description,
            options: JobOptions {
                resources: options.resources,
                withmpi: options.withmpi,
                output_filename,
                parser_name: prepared.parser_name,
                output_dir: prepared.output_dir,
            },
        },
    );

    info!("Launching {} ({:?})", job.job_type, options.mode);
    match options.mode {
        LaunchMode::Run => engine.run(job, reporter),
        LaunchMode::Submit => engine.submit(job, reporter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::Artifact;
    use crate::core::job::CodeRef;
    use crate::core::params::ParamValue;
    use crate::core::params::Parameters;
    use crate::core::params::tools::{EDITCONF, GROMPP};
    use crate::core::staging::{FileSource, StagingError};
    use crate::engine::code::Computer;
    use crate::engine::store::JobStatus;
    use crate::engine::traits::{CompletedJob, PreviousJobs};
    use crate::workflows::calculation;
    use chrono::Utc;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeEngine {
        calls: RefCell<Vec<(LaunchMode, JobDescription)>>,
        waited: RefCell<bool>,
    }

    impl FakeEngine {
        fn record(&self, mode: LaunchMode, job: JobDescription) -> Result<JobHandle, EngineError> {
            self.calls.borrow_mut().push((mode, job));
            Ok(JobHandle {
                id: Uuid::nil(),
                status: match mode {
                    LaunchMode::Run => JobStatus::Finished,
                    LaunchMode::Submit => JobStatus::Queued,
                },
                outputs: BTreeMap::new(),
            })
        }
    }

    impl Engine for FakeEngine {
        fn submit(&self, job: JobDescription, _: &ProgressReporter) -> Result<JobHandle, EngineError> {
            self.record(LaunchMode::Submit, job)
        }
        fn run(&self, job: JobDescription, _: &ProgressReporter) -> Result<JobHandle, EngineError> {
            self.record(LaunchMode::Run, job)
        }
        fn wait_for_pending(&self, _: &ProgressReporter) -> Result<(), EngineError> {
            *self.waited.borrow_mut() = true;
            Ok(())
        }
    }

    struct FakeResolver;

    impl CodeResolver for FakeResolver {
        fn get_computer(&self) -> Result<Computer, EngineError> {
            Ok(Computer::localhost("/tmp"))
        }
        fn get_code(&self, entry_point: &str, computer: &Computer) -> Result<CodeRef, EngineError> {
            if entry_point == "gromacs" {
                Ok(code_ref(entry_point, computer, PathBuf::from("/opt/gmx/bin/gmx")))
            } else {
                Err(EngineError::CodeNotFound {
                    entry_point: entry_point.to_string(),
                    computer: computer.label.clone(),
                })
            }
        }
    }

    struct FakeHistory(Vec<CompletedJob>);

    impl JobHistory for FakeHistory {
        fn previous_jobs(&self, _: Option<&str>) -> Result<PreviousJobs, EngineError> {
            Ok(PreviousJobs::new(self.0.clone()))
        }
    }

    fn editconf(dir: &Path) -> PreparedJob {
        fs::write(dir.join("1AKI.gro"), "conf").unwrap();
        let params = Parameters::new(
            &EDITCONF,
            [
                ("f", ParamValue::from("1AKI.gro")),
                ("o", ParamValue::from("boxed.gro")),
                ("c", ParamValue::from(true)),
            ],
        )
        .unwrap();
        calculation::prepare(params, dir, dir).unwrap()
    }

    #[test]
    fn run_mode_builds_a_complete_job_description() {
        let dir = tempdir().unwrap();
        let engine = FakeEngine::default();
        let options = LaunchOptions {
            description: "box the protein".to_string(),
            ..Default::default()
        };

        let handle = launch(
            editconf(dir.path()),
            &options,
            &engine,
            &FakeResolver,
            &FakeHistory(vec![]),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(handle.status, JobStatus::Finished);
        assert!(*engine.waited.borrow());
        let calls = engine.calls.borrow();
        let (mode, job) = &calls[0];
        assert_eq!(*mode, LaunchMode::Run);
        assert_eq!(job.code.label, "gromacs@localhost");
        assert_eq!(job.cmdline.tokens()[0], "editconf");
        assert_eq!(job.local_copy_list[0].dest_name, "1AKI.gro");
        assert_eq!(job.retrieve_list, ["editconf.out", "boxed.gro"]);
        assert_eq!(job.metadata.description, "box the protein");
        assert_eq!(job.metadata.options.parser_name, "gromacs.editconf");
        assert_eq!(job.metadata.options.output_filename, "editconf.out");
    }

    #[test]
    fn submit_mode_queues_instead_of_running() {
        let dir = tempdir().unwrap();
        let engine = FakeEngine::default();
        let options = LaunchOptions {
            mode: LaunchMode::Submit,
            ..Default::default()
        };
        let handle = launch(
            editconf(dir.path()),
            &options,
            &engine,
            &FakeResolver,
            &FakeHistory(vec![]),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(handle.status, JobStatus::Queued);
        assert_eq!(engine.calls.borrow()[0].0, LaunchMode::Submit);
    }

    #[test]
    fn unresolvable_code_stops_before_the_engine_is_called() {
        let dir = tempdir().unwrap();
        let engine = FakeEngine::default();
        let mut prepared = editconf(dir.path());
        prepared.entry_point = "bash";
        let err = launch(
            prepared,
            &LaunchOptions::default(),
            &engine,
            &FakeResolver,
            &FakeHistory(vec![]),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::CodeNotFound { .. }));
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn missing_input_is_reported_before_submission() {
        let dir = tempdir().unwrap();
        let engine = FakeEngine::default();
        let params = Parameters::new(&GROMPP, [("c", ParamValue::from("absent.gro"))]).unwrap();
        let prepared = calculation::prepare(params, dir.path(), dir.path()).unwrap();
        let err = launch(
            prepared,
            &LaunchOptions::default(),
            &engine,
            &FakeResolver,
            &FakeHistory(vec![]),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Staging(StagingError::MissingSource { .. })));
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn earlier_outputs_are_chained_into_inputs() {
        let dir = tempdir().unwrap();
        let engine = FakeEngine::default();
        let prepared = editconf(dir.path());
        let previous = CompletedJob {
            id: Uuid::from_u128(7),
            job_type: "gromacs.pdb2gmx".to_string(),
            completed_at: Utc::now(),
            outputs: BTreeMap::from([("grofile".to_string(), Artifact::from_bytes("1AKI.gro", b"conf"))]),
        };

        launch(
            prepared,
            &LaunchOptions::default(),
            &engine,
            &FakeResolver,
            &FakeHistory(vec![previous]),
            &ProgressReporter::new(),
        )
        .unwrap();

        let calls = engine.calls.borrow();
        let copy = &calls[0].1.local_copy_list[0];
        assert!(matches!(copy.source, FileSource::Artifact { job: Some(id), .. } if id == Uuid::from_u128(7)));
        assert_eq!(copy.dest_name, "1AKI.gro");
    }

    #[test]
    fn chaining_can_be_disabled() {
        let dir = tempdir().unwrap();
        let engine = FakeEngine::default();
        let previous = CompletedJob {
            id: Uuid::from_u128(7),
            job_type: "gromacs.pdb2gmx".to_string(),
            completed_at: Utc::now(),
            outputs: BTreeMap::from([("grofile".to_string(), Artifact::from_bytes("1AKI.gro", b"conf"))]),
        };
        let options = LaunchOptions {
            chaining: false,
            ..Default::default()
        };
        launch(
            editconf(dir.path()),
            &options,
            &engine,
            &FakeResolver,
            &FakeHistory(vec![previous]),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(matches!(
            engine.calls.borrow()[0].1.local_copy_list[0].source,
            FileSource::Local { .. }
        ));
    }
}
