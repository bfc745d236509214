use gmxprov::engine::code::{BASH_ENTRY_POINT, GROMACS_ENTRY_POINT};
use gmxprov::workflows::launch::LaunchMode;

pub struct DefaultsConfig {
    pub mode: LaunchMode,
    pub computer_label: String,
    pub executables: Vec<(&'static str, &'static str)>,
    pub num_machines: u32,
    pub num_mpiprocs_per_machine: u32,
    pub withmpi: bool,
    pub chaining: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            mode: LaunchMode::Run,
            computer_label: "localhost".to_string(),
            executables: vec![(GROMACS_ENTRY_POINT, "gmx"), (BASH_ENTRY_POINT, "bash")],
            num_machines: 1,
            num_mpiprocs_per_machine: 1,
            withmpi: false,
            chaining: true,
        }
    }
}
