use super::params::Parameters;
use phf::{Set, phf_set};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

pub const STDOUT_LABEL: &str = "stdout";

/// Exit code reported when a job did not produce every declared output.
pub const ERROR_MISSING_OUTPUT_FILES: u32 = 300;

/// Files the engine writes into every retrieved folder for its own use.
pub static BOOKKEEPING_FILES: Set<&'static str> = phf_set! {
    "_scheduler-stdout.txt",
    "_scheduler-stderr.txt",
};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Calculation did not produce all expected output files: missing {missing:?} (found {found:?})")]
    MissingOutputs {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("Failed to read retrieved file '{filename}': {source}")]
    Read {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReconcileError {
    pub fn exit_code(&self) -> Option<u32> {
        match self {
            ReconcileError::MissingOutputs { .. } => Some(ERROR_MISSING_OUTPUT_FILES),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredOutput {
    pub label: String,
    pub filename: String,
}

/// The files a job is expected to produce, fixed when the job is defined.
///
/// Captured standard output is always expected and always bound to
/// [`STDOUT_LABEL`]; `outputs` holds the flag-driven files in the order
/// their labels were assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDeclaration {
    pub stdout: String,
    pub outputs: Vec<DeclaredOutput>,
}

impl OutputDeclaration {
    pub fn new(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            outputs: Vec::new(),
        }
    }

    /// Declares one output per output-file flag present in `params`.
    pub fn for_parameters(params: &Parameters, stdout: impl Into<String>) -> Self {
        let mut declaration = Self::new(stdout);
        for (spec, filename) in params.output_files() {
            if let Some(label) = spec.output_label() {
                declaration.push(label, filename);
            }
        }
        declaration
    }

    pub fn push(&mut self, label: impl Into<String>, filename: impl Into<String>) {
        self.outputs.push(DeclaredOutput {
            label: label.into(),
            filename: filename.into(),
        });
    }

    /// Filenames to copy back after execution: stdout first, then each
    /// declared output once, in declaration order.
    pub fn retrieve_list(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        std::iter::once(&self.stdout)
            .chain(self.outputs.iter().map(|o| &o.filename))
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect()
    }

    /// Every (label, filename) pair to bind, stdout first.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((STDOUT_LABEL, self.stdout.as_str())).chain(
            self.outputs
                .iter()
                .map(|o| (o.label.as_str(), o.filename.as_str())),
        )
    }
}

/// Read access to the files an engine brought back from a finished job.
pub trait RetrievedFiles {
    fn list_object_names(&self) -> io::Result<BTreeSet<String>>;
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// A retrieved-file store backed by a directory.
#[derive(Debug, Clone)]
pub struct RetrievedFolder {
    root: PathBuf,
}

impl RetrievedFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl RetrievedFiles for RetrievedFolder {
    fn list_object_names(&self) -> io::Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn open(&self, name: &str) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(fs::File::open(self.root.join(name))?))
    }
}

/// One declared file bound to its label, with the bytes that were retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledOutput {
    pub label: String,
    pub filename: String,
    pub content: Vec<u8>,
}

/// Checks the declared outputs against what was retrieved and binds each
/// declared file to its label.
///
/// Either every declared file is bound or none is: a missing file, or one
/// that cannot be read, fails the whole reconciliation. On success the bound
/// files are also written into `output_dir`, when given, so later jobs can
/// find them by name.
pub fn reconcile<R>(
    declaration: &OutputDeclaration,
    retrieved: &R,
    output_dir: Option<&Path>,
) -> Result<Vec<ReconciledOutput>, ReconcileError>
where
    R: RetrievedFiles + ?Sized,
{
    let found = retrieved
        .list_object_names()
        .map_err(|source| ReconcileError::Read {
            filename: ".".to_string(),
            source,
        })?;
    let expected: Vec<String> = declaration
        .retrieve_list()
        .into_iter()
        .filter(|name| !BOOKKEEPING_FILES.contains(name.as_str()))
        .collect();

    let missing: Vec<String> = expected
        .iter()
        .filter(|name| !found.contains(*name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        error!(
            "Found files '{:?}', expected to find '{:?}'",
            found, expected
        );
        return Err(ReconcileError::MissingOutputs {
            missing,
            found: found.into_iter().collect(),
        });
    }

    let mut outputs = Vec::with_capacity(declaration.outputs.len() + 1);
    for (label, filename) in declaration.bindings() {
        info!("Parsing '{}'", filename);
        let mut content = Vec::new();
        retrieved
            .open(filename)
            .and_then(|mut reader| reader.read_to_end(&mut content))
            .map_err(|source| ReconcileError::Read {
                filename: filename.to_string(),
                source,
            })?;
        outputs.push(ReconciledOutput {
            label: label.to_string(),
            filename: filename.to_string(),
            content,
        });
    }

    if let Some(dir) = output_dir {
        write_local_copies(&outputs, dir)?;
    }

    Ok(outputs)
}

/// Writes every output to a temporary name first and renames them into
/// place once all writes succeeded. On failure nothing from this call is
/// left in `dir`.
fn write_local_copies(outputs: &[ReconciledOutput], dir: &Path) -> Result<(), ReconcileError> {
    fs::create_dir_all(dir).map_err(|source| ReconcileError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut seen = BTreeSet::new();
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
    for output in outputs {
        if !seen.insert(output.filename.as_str()) {
            continue;
        }
        let tmp = dir.join(format!(".{}.partial", output.filename));
        if let Err(source) = fs::write(&tmp, &output.content) {
            discard(staged.iter().map(|(t, _)| t).chain(std::iter::once(&tmp)));
            return Err(ReconcileError::Write { path: tmp, source });
        }
        staged.push((tmp, dir.join(&output.filename)));
    }

    for (i, (tmp, dest)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(tmp, dest) {
            discard(staged[..i].iter().map(|(_, d)| d));
            discard(staged[i..].iter().map(|(t, _)| t));
            return Err(ReconcileError::Write {
                path: dest.clone(),
                source,
            });
        }
    }
    Ok(())
}

fn discard<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}
