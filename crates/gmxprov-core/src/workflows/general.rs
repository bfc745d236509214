use super::calculation::{CommandSource, PreparedJob};
use crate::core::labels::format_link_label;
use crate::core::outputs::{OutputDeclaration, STDOUT_LABEL};
use crate::core::params::ChainRoles;
use crate::core::staging::StagedInput;
use crate::engine::code::BASH_ENTRY_POINT;
use crate::engine::error::EngineError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const GENERAL_JOB_TYPE: &str = "general-MD";
pub const GENERAL_STDOUT: &str = "file.out";
pub const GENERAL_LABEL: &str = "general-execute";

/// An arbitrary shell command with explicitly named input and output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralCommand {
    pub command: String,
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<String>,
    pub output_dir: PathBuf,
}

impl GeneralCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            output_dir: PathBuf::from("outputs"),
        }
    }
}

/// Prepares `bash -c <command>`, labelling every input and output by its
/// formatted filename.
pub fn prepare(general: &GeneralCommand, base_dir: &Path) -> Result<PreparedJob, EngineError> {
    let mut roles = HashSet::new();
    let staged = general
        .inputs
        .iter()
        .map(|input| {
            let path = base_dir.join(input);
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            StagedInput::local(unique_label(&name, &mut roles), path)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut labels = HashSet::from([STDOUT_LABEL.to_string()]);
    let mut outputs = OutputDeclaration::new(GENERAL_STDOUT);
    for filename in &general.outputs {
        outputs.push(unique_label(filename, &mut labels), filename.as_str());
    }

    Ok(PreparedJob {
        job_type: GENERAL_JOB_TYPE.to_string(),
        entry_point: BASH_ENTRY_POINT,
        staged,
        chain_roles: ChainRoles::All,
        command: CommandSource::Fixed(vec!["-c".to_string(), general.command.clone()]),
        outputs,
        parser_name: GENERAL_JOB_TYPE.to_string(),
        label: Some(GENERAL_LABEL.to_string()),
        output_dir: base_dir.join(&general.output_dir),
    })
}

/// Formats `filename` as a link label, suffixing `_1`, `_2`, ... when the
/// label is already in `taken`.
fn unique_label(filename: &str, taken: &mut HashSet<String>) -> String {
    let base = format_link_label(filename);
    let mut label = base.clone();
    let mut n = 1;
    while !taken.insert(label.clone()) {
        label = format!("{}_{}", base, n);
        n += 1;
    }
    if label != base {
        warn!("Link label '{}' is taken; '{}' is bound as '{}'", base, filename, label);
    }
    label
}
