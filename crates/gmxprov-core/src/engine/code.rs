use super::error::EngineError;
use super::traits::CodeResolver;
use crate::core::job::CodeRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const GROMACS_ENTRY_POINT: &str = "gromacs";
pub const BASH_ENTRY_POINT: &str = "bash";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Computer {
    pub label: String,
    pub work_dir: PathBuf,
}

impl Computer {
    pub fn localhost(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            label: "localhost".to_string(),
            work_dir: work_dir.into(),
        }
    }
}

/// Resolves entry points to executables on the local machine.
#[derive(Debug, Clone)]
pub struct LocalCodeResolver {
    computer: Computer,
    executables: BTreeMap<String, PathBuf>,
}

impl LocalCodeResolver {
    /// A resolver knowing `gmx` for `gromacs` and `bash` for `bash`.
    pub fn new(computer: Computer) -> Self {
        let mut executables = BTreeMap::new();
        executables.insert(GROMACS_ENTRY_POINT.to_string(), PathBuf::from("gmx"));
        executables.insert(BASH_ENTRY_POINT.to_string(), PathBuf::from("bash"));
        Self {
            computer,
            executables,
        }
    }

    pub fn with_executable(mut self, entry_point: impl Into<String>, exe: impl Into<PathBuf>) -> Self {
        self.executables.insert(entry_point.into(), exe.into());
        self
    }
}

impl CodeResolver for LocalCodeResolver {
    fn get_computer(&self) -> Result<Computer, EngineError> {
        Ok(self.computer.clone())
    }

    fn get_code(&self, entry_point: &str, computer: &Computer) -> Result<CodeRef, EngineError> {
        let not_found = || EngineError::CodeNotFound {
            entry_point: entry_point.to_string(),
            computer: computer.label.clone(),
        };
        let configured = self.executables.get(entry_point).ok_or_else(not_found)?;
        let executable = resolve_executable(configured).ok_or_else(not_found)?;
        debug!(
            "Resolved entry point '{}' to {}",
            entry_point,
            executable.display()
        );
        Ok(code_ref(entry_point, computer, executable))
    }
}

pub fn code_ref(entry_point: &str, computer: &Computer, executable: PathBuf) -> CodeRef {
    CodeRef {
        label: format!("{}@{}", entry_point, computer.label),
        entry_point: entry_point.to_string(),
        executable,
        computer: computer.label.clone(),
    }
}

/// Finds `program` on disk. Bare names are looked up on `PATH`; anything
/// with a directory component must point at an existing file.
pub fn resolve_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file().then(|| program.to_path_buf());
    }
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
