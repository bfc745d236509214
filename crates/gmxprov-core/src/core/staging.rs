use super::artifact::Artifact;
use super::params::Parameters;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StagingError {
    #[error("Input '{role}' has no usable file name: {path}", path = path.display())]
    InvalidPath { role: String, path: PathBuf },

    #[error("Input role '{0}' is staged more than once")]
    DuplicateRole(String),

    #[error("Input '{role}' not found: {path}", path = path.display())]
    MissingSource { role: String, path: PathBuf },
}

/// Where the bytes of a staged input come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FileSource {
    /// A file on the launching machine.
    Local { path: PathBuf },
    /// An output of an earlier job, reused without re-staging.
    Artifact {
        artifact: Artifact,
        job: Option<Uuid>,
    },
}

/// One file to be placed in the job's working directory under `filename`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedInput {
    pub role: String,
    pub filename: String,
    pub source: FileSource,
}

impl StagedInput {
    /// Stages a local file under its own basename.
    pub fn local(role: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, StagingError> {
        let role = role.into();
        let path = path.into();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| StagingError::InvalidPath {
                role: role.clone(),
                path: path.clone(),
            })?;
        Ok(Self {
            role,
            filename,
            source: FileSource::Local { path },
        })
    }

    pub fn local_path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Local { path } => Some(path),
            FileSource::Artifact { .. } => None,
        }
    }
}

/// Stages every input-file flag present in `params`, in schema order.
/// Relative source paths are resolved against `base_dir`.
pub fn stage(params: &Parameters, base_dir: &Path) -> Result<Vec<StagedInput>, StagingError> {
    params
        .input_files()
        .map(|(spec, value)| {
            let role = spec.input_role().unwrap_or(spec.name);
            StagedInput::local(role, base_dir.join(value))
        })
        .collect()
}

/// Role to staged filename, the override map consumed by rendering.
pub fn staged_names(inputs: &[StagedInput]) -> HashMap<String, String> {
    inputs
        .iter()
        .map(|i| (i.role.clone(), i.filename.clone()))
        .collect()
}

pub fn ensure_unique_roles(inputs: &[StagedInput]) -> Result<(), StagingError> {
    let mut seen = HashSet::new();
    for input in inputs {
        if !seen.insert(input.role.as_str()) {
            return Err(StagingError::DuplicateRole(input.role.clone()));
        }
    }
    Ok(())
}

/// Fails on the first local source that does not exist on disk.
pub fn verify_sources(inputs: &[StagedInput]) -> Result<(), StagingError> {
    for input in inputs {
        if let Some(path) = input.local_path() {
            if !path.is_file() {
                return Err(StagingError::MissingSource {
                    role: input.role.clone(),
                    path: path.to_path_buf(),
                });
            }
        }
    }
    Ok(())
}
