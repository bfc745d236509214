use super::command::CommandLine;
use super::outputs::OutputDeclaration;
use super::staging::{FileSource, StagedInput};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A resolved executable on a named computer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRef {
    /// `entry_point@computer`, e.g. `gromacs@localhost`.
    pub label: String,
    pub entry_point: String,
    pub executable: PathBuf,
    pub computer: String,
}

/// "Copy this file into the working directory under `dest_name`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCopy {
    pub role: String,
    pub source: FileSource,
    pub source_name: String,
    pub dest_name: String,
}

impl From<StagedInput> for LocalCopy {
    fn from(input: StagedInput) -> Self {
        let source_name = match &input.source {
            FileSource::Local { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.filename.clone()),
            FileSource::Artifact { artifact, .. } => artifact.filename.clone(),
        };
        Self {
            role: input.role,
            source: input.source,
            source_name,
            dest_name: input.filename,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub num_machines: u32,
    pub num_mpiprocs_per_machine: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            num_machines: 1,
            num_mpiprocs_per_machine: 1,
        }
    }
}

impl Resources {
    pub fn total_procs(&self) -> u32 {
        self.num_machines.max(1) * self.num_mpiprocs_per_machine.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    pub resources: Resources,
    pub withmpi: bool,
    /// Name of the file standard output is captured into.
    pub output_filename: String,
    pub parser_name: String,
    /// Where reconciled outputs are written back for the user.
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub label: Option<String>,
    pub description: String,
    pub options: JobOptions,
}

/// Everything an engine needs to execute one job and bring its outputs back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescription {
    pub job_type: String,
    pub code: CodeRef,
    pub cmdline: CommandLine,
    pub local_copy_list: Vec<LocalCopy>,
    pub retrieve_list: Vec<String>,
    pub outputs: OutputDeclaration,
    pub metadata: JobMetadata,
}

impl JobDescription {
    pub fn build(
        job_type: impl Into<String>,
        code: CodeRef,
        cmdline: CommandLine,
        staged: Vec<StagedInput>,
        outputs: OutputDeclaration,
        metadata: JobMetadata,
    ) -> Self {
        Self {
            job_type: job_type.into(),
            code,
            cmdline,
            local_copy_list: staged.into_iter().map(LocalCopy::from).collect(),
            retrieve_list: outputs.retrieve_list(),
            outputs,
            metadata,
        }
    }
}
