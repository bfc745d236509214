use crate::error::{CliError, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "gmxprov.toml";

/// Locates the per-user configuration file and provenance store.
#[derive(Debug, Clone)]
pub struct DataManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl DataManager {
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("org", "gmxprov", "gmxprov").ok_or_else(|| {
            CliError::Data("Could not determine the user's home directory.".to_string())
        })?;
        let manager = Self {
            config_dir: dirs.config_dir().to_path_buf(),
            data_dir: dirs.data_dir().to_path_buf(),
        };
        debug!("DataManager initialized: {:?}", &manager);
        Ok(manager)
    }

    /// Roots both directories under `base`.
    pub fn with_custom_path(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            config_dir: base.join("config"),
            data_dir: base.join("data"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// The configuration file read when `--config` is not given.
    pub fn default_config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Where the provenance store lives unless `engine.store-path` says otherwise.
    pub fn default_store_path(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn custom_base_lays_out_config_and_store() {
        let temp_dir = tempdir().unwrap();
        let manager = DataManager::with_custom_path(temp_dir.path());
        assert_eq!(
            manager.default_config_file(),
            temp_dir.path().join("config").join("gmxprov.toml")
        );
        assert_eq!(
            manager.default_store_path(),
            temp_dir.path().join("data").join("store")
        );
        assert_eq!(manager.config_dir(), temp_dir.path().join("config"));
    }
}
