use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// An immutable stored file, identified by the SHA-256 digest of its bytes.
///
/// The filename travels with the digest because chaining matches outputs to
/// inputs by name, while the digest is what makes two files "the same".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    pub digest: String,
    pub filename: String,
    pub size: u64,
}

impl Artifact {
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            digest: digest_bytes(bytes),
            filename: filename.into(),
            size: bytes.len() as u64,
        }
    }

    /// Short form of the digest for log lines and tables.
    pub fn short_digest(&self) -> &str {
        &self.digest[..self.digest.len().min(12)]
    }
}

pub fn digest_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn digest_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn digest_of_known_input_matches_reference_value() {
        assert_eq!(
            digest_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn file_digest_equals_in_memory_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("topol.top");
        fs::write(&path, "[ system ]\nLysozyme\n").unwrap();
        assert_eq!(
            digest_file(&path).unwrap(),
            digest_bytes(b"[ system ]\nLysozyme\n")
        );
    }

    #[test]
    fn artifact_records_size_and_name() {
        let artifact = Artifact::from_bytes("conf.gro", b"12345");
        assert_eq!(artifact.size, 5);
        assert_eq!(artifact.filename, "conf.gro");
        assert_eq!(artifact.short_digest().len(), 12);
    }

    #[test]
    fn digest_file_fails_for_missing_path() {
        let dir = tempdir().unwrap();
        assert!(digest_file(&dir.path().join("absent.gro")).is_err());
    }
}
