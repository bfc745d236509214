use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, ChainingSettings, EngineSettings, ResourceSettings};
use crate::data::DataManager;
use crate::error::{CliError, Result};
use crate::utils::parser;
use gmxprov::engine::code::Computer;
use gmxprov::workflows::launch::LaunchMode;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Merges defaults, the configuration file and `--set` values.
///
/// An explicit `config_path` must exist. Without one, the default file in
/// the user's configuration directory is read if present.
pub fn build_config(
    config_path: Option<&Path>,
    set_values: &[String],
    data_manager: &DataManager,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => {
            let default_path = data_manager.default_config_file();
            if default_path.is_file() {
                FileConfig::from_file(&default_path)?
            } else {
                debug!("No configuration file at {:?}, using defaults.", default_path);
                FileConfig::default()
            }
        }
    };

    let mut file_config = apply_set_values(file_config, set_values)?;

    let engine_file = file_config.engine.take().unwrap_or_default();
    let store_path = engine_file
        .store_path
        .unwrap_or_else(|| data_manager.default_store_path());
    let engine = EngineSettings {
        mode: engine_file.mode.unwrap_or(defaults.mode),
        store_path: store_path.clone(),
    };

    let computer_file = file_config.computer.take().unwrap_or_default();
    let computer = Computer {
        label: computer_file.label.unwrap_or(defaults.computer_label),
        work_dir: computer_file
            .work_dir
            .unwrap_or_else(|| store_path.join("work")),
    };

    let mut codes = defaults
        .executables
        .iter()
        .map(|(entry, exe)| (entry.to_string(), PathBuf::from(exe)))
        .collect::<std::collections::BTreeMap<_, _>>();
    codes.extend(file_config.codes.take().unwrap_or_default());

    let resources_file = file_config.resources.take().unwrap_or_default();
    let resources = ResourceSettings {
        num_machines: resources_file.num_machines.unwrap_or(defaults.num_machines),
        num_mpiprocs_per_machine: resources_file
            .num_mpiprocs_per_machine
            .unwrap_or(defaults.num_mpiprocs_per_machine),
        withmpi: resources_file.withmpi.unwrap_or(defaults.withmpi),
    };
    if resources.num_machines == 0 || resources.num_mpiprocs_per_machine == 0 {
        return Err(CliError::Config(
            "`resources.num-machines` and `resources.num-mpiprocs-per-machine` must be at least 1"
                .to_string(),
        ));
    }

    let chaining = ChainingSettings {
        enabled: file_config
            .chaining
            .take()
            .and_then(|c| c.enabled)
            .unwrap_or(defaults.chaining),
    };

    Ok(AppConfig {
        engine,
        computer,
        codes,
        resources,
        chaining,
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value_str) =
            parser::parse_key_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        let invalid = |kind: &str| {
            CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
        };

        match key {
            "engine.mode" => {
                let mode = match value_str {
                    "run" => LaunchMode::Run,
                    "submit" => LaunchMode::Submit,
                    _ => return Err(invalid("mode ('run' or 'submit')")),
                };
                config.engine.get_or_insert_with(Default::default).mode = Some(mode);
            }
            "engine.store-path" => {
                config.engine.get_or_insert_with(Default::default).store_path =
                    Some(PathBuf::from(value_str));
            }
            "computer.label" => {
                config.computer.get_or_insert_with(Default::default).label =
                    Some(value_str.to_string());
            }
            "computer.work-dir" => {
                config.computer.get_or_insert_with(Default::default).work_dir =
                    Some(PathBuf::from(value_str));
            }
            "resources.num-machines" => {
                config
                    .resources
                    .get_or_insert_with(Default::default)
                    .num_machines = Some(value_str.parse().map_err(|_| invalid("integer"))?);
            }
            "resources.num-mpiprocs-per-machine" => {
                config
                    .resources
                    .get_or_insert_with(Default::default)
                    .num_mpiprocs_per_machine =
                    Some(value_str.parse().map_err(|_| invalid("integer"))?);
            }
            "resources.withmpi" => {
                config.resources.get_or_insert_with(Default::default).withmpi =
                    Some(value_str.parse().map_err(|_| invalid("boolean"))?);
            }
            "chaining.enabled" => {
                config.chaining.get_or_insert_with(Default::default).enabled =
                    Some(value_str.parse().map_err(|_| invalid("boolean"))?);
            }
            _ => {
                if let Some(entry_point) = key.strip_prefix("codes.").filter(|e| !e.is_empty()) {
                    config
                        .codes
                        .get_or_insert_with(Default::default)
                        .insert(entry_point.to_string(), PathBuf::from(value_str));
                } else {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let base = tempdir().unwrap();
        let manager = DataManager::with_custom_path(base.path());

        let cfg = build_config(None, &[], &manager).unwrap();

        assert_eq!(cfg.engine.mode, LaunchMode::Run);
        assert_eq!(cfg.engine.store_path, manager.default_store_path());
        assert_eq!(cfg.computer.label, "localhost");
        assert_eq!(cfg.codes["gromacs"], PathBuf::from("gmx"));
        assert_eq!(cfg.codes["bash"], PathBuf::from("bash"));
        assert_eq!(cfg.resources.num_machines, 1);
        assert!(!cfg.resources.withmpi);
        assert!(cfg.chaining.enabled);
    }

    #[test]
    fn default_config_file_is_picked_up() {
        let base = tempdir().unwrap();
        let manager = DataManager::with_custom_path(base.path());
        fs::create_dir_all(manager.config_dir()).unwrap();
        fs::write(
            manager.default_config_file(),
            "[engine]\nmode = \"submit\"\n",
        )
        .unwrap();

        let cfg = build_config(None, &[], &manager).unwrap();
        assert_eq!(cfg.engine.mode, LaunchMode::Submit);
    }

    #[test]
    fn explicit_file_is_read_and_merged() {
        let base = tempdir().unwrap();
        let manager = DataManager::with_custom_path(base.path());
        let cfg_path = base.path().join("custom.toml");
        fs::write(
            &cfg_path,
            r#"
            [engine]
            store-path = "/scratch/provenance"

            [computer]
            label = "workstation"

            [codes]
            gromacs = "/opt/gromacs/bin/gmx_mpi"

            [resources]
            num-mpiprocs-per-machine = 8
            withmpi = true

            [chaining]
            enabled = false
            "#,
        )
        .unwrap();

        let cfg = build_config(Some(&cfg_path), &[], &manager).unwrap();

        assert_eq!(cfg.engine.store_path, PathBuf::from("/scratch/provenance"));
        assert_eq!(cfg.computer.work_dir, PathBuf::from("/scratch/provenance/work"));
        assert_eq!(cfg.computer.label, "workstation");
        assert_eq!(cfg.codes["gromacs"], PathBuf::from("/opt/gromacs/bin/gmx_mpi"));
        assert_eq!(cfg.codes["bash"], PathBuf::from("bash"));
        assert_eq!(cfg.resources.num_mpiprocs_per_machine, 8);
        assert!(cfg.resources.withmpi);
        assert!(!cfg.chaining.enabled);
    }

    #[test]
    fn set_values_override_the_file() {
        let base = tempdir().unwrap();
        let manager = DataManager::with_custom_path(base.path());
        let cfg_path = base.path().join("custom.toml");
        fs::write(&cfg_path, "[chaining]\nenabled = false\n").unwrap();

        let set = [
            "chaining.enabled=true".to_string(),
            "engine.mode=submit".to_string(),
            "codes.gromacs=/usr/local/bin/gmx".to_string(),
            "resources.num-machines=2".to_string(),
        ];
        let cfg = build_config(Some(&cfg_path), &set, &manager).unwrap();

        assert!(cfg.chaining.enabled);
        assert_eq!(cfg.engine.mode, LaunchMode::Submit);
        assert_eq!(cfg.codes["gromacs"], PathBuf::from("/usr/local/bin/gmx"));
        assert_eq!(cfg.resources.num_machines, 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let base = tempdir().unwrap();
        let manager = DataManager::with_custom_path(base.path());

        let set = ["engine.speed=fast".to_string()];
        assert!(matches!(
            build_config(None, &set, &manager),
            Err(CliError::Config(_))
        ));

        let cfg_path = base.path().join("bad.toml");
        fs::write(&cfg_path, "[engine]\nturbo = true\n").unwrap();
        assert!(matches!(
            build_config(Some(&cfg_path), &[], &manager),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        let base = tempdir().unwrap();
        let manager = DataManager::with_custom_path(base.path());
        for bad in ["resources.withmpi=maybe", "engine.mode=later", "no-equals-sign"] {
            assert!(
                matches!(build_config(None, &[bad.to_string()], &manager), Err(CliError::Config(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let base = tempdir().unwrap();
        let manager = DataManager::with_custom_path(base.path());
        let missing = base.path().join("nope.toml");
        assert!(matches!(
            build_config(Some(&missing), &[], &manager),
            Err(CliError::Io(_))
        ));
    }
}
