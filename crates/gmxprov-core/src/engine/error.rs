use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use super::store::StoreError;
use crate::core::outputs::ReconcileError;
use crate::core::params::ParamError;
use crate::core::staging::StagingError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ParamError),

    #[error("Input staging failed: {0}")]
    Staging(#[from] StagingError),

    #[error("No code found for entry point '{entry_point}' on computer '{computer}'")]
    CodeNotFound {
        entry_point: String,
        computer: String,
    },

    #[error("Provenance store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to launch '{program}': {source}", program = program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error at '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Job {id} failed: {source}")]
    JobFailed {
        id: Uuid,
        #[source]
        source: ReconcileError,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The job exit code this error corresponds to, if it has one.
    pub fn exit_code(&self) -> Option<u32> {
        match self {
            EngineError::JobFailed { source, .. } => source.exit_code(),
            _ => None,
        }
    }
}
