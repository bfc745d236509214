use gmxprov::core::job::Resources;
use gmxprov::engine::code::Computer;
use gmxprov::workflows::launch::LaunchMode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineSettings {
    pub mode: LaunchMode,
    pub store_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceSettings {
    pub num_machines: u32,
    pub num_mpiprocs_per_machine: u32,
    pub withmpi: bool,
}

impl ResourceSettings {
    pub fn resources(&self) -> Resources {
        Resources {
            num_machines: self.num_machines,
            num_mpiprocs_per_machine: self.num_mpiprocs_per_machine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainingSettings {
    pub enabled: bool,
}

/// The effective configuration after defaults, file and `--set` are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub engine: EngineSettings,
    pub computer: Computer,
    pub codes: BTreeMap<String, PathBuf>,
    pub resources: ResourceSettings,
    pub chaining: ChainingSettings,
}
