use crate::core::command::CommandLine;
use crate::core::includes::find_itp_includes;
use crate::core::outputs::OutputDeclaration;
use crate::core::params::schema::ToolSchema;
use crate::core::params::{ChainRoles, Parameters};
use crate::core::staging::{StagedInput, stage};
use crate::engine::code::GROMACS_ENTRY_POINT;
use crate::engine::error::EngineError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the argument vector of a prepared job comes from.
#[derive(Debug, Clone)]
pub enum CommandSource {
    /// Rendered from validated tool parameters against the staged names.
    Tool(Parameters),
    /// Passed to the executable verbatim.
    Fixed(Vec<String>),
}

/// A job whose inputs, command and outputs are known but which has not yet
/// been bound to a code or handed to an engine.
#[derive(Debug, Clone)]
pub struct PreparedJob {
    pub job_type: String,
    pub entry_point: &'static str,
    pub staged: Vec<StagedInput>,
    pub chain_roles: ChainRoles,
    pub command: CommandSource,
    pub outputs: OutputDeclaration,
    pub parser_name: String,
    pub label: Option<String>,
    pub output_dir: PathBuf,
}

impl PreparedJob {
    pub fn command_line(&self) -> CommandLine {
        match &self.command {
            CommandSource::Tool(params) => CommandLine::assemble(params, &self.staged),
            CommandSource::Fixed(tokens) => CommandLine::from_tokens(tokens.iter().cloned()),
        }
    }

    pub fn stdout_name(&self) -> &str {
        &self.outputs.stdout
    }
}

/// Prepares one wrapped GROMACS subcommand.
///
/// Input paths are resolved against `base_dir`. For tools that read a
/// topology, the `.itp` files it includes from its own directory are staged
/// as `itpfile0`, `itpfile1`, ... alongside the flagged inputs.
pub fn prepare(params: Parameters, base_dir: &Path, output_dir: &Path) -> Result<PreparedJob, EngineError> {
    let schema: &'static ToolSchema = params.schema();
    let mut staged = stage(&params, base_dir)?;

    if let Some(role) = schema.include_role {
        let topology = staged
            .iter()
            .find(|s| s.role == role)
            .and_then(|s| s.local_path())
            .map(Path::to_path_buf);
        if let Some(topology) = topology.filter(|p| p.is_file()) {
            let includes =
                find_itp_includes(&topology).map_err(|e| EngineError::io(&topology, e))?;
            if !includes.is_empty() {
                info!("Found {} local include file(s) in '{}'", includes.len(), topology.display());
            }
            for (i, path) in includes.into_iter().enumerate() {
                staged.push(StagedInput::local(format!("itpfile{}", i), path)?);
            }
        }
    }

    let outputs = OutputDeclaration::for_parameters(&params, schema.stdout_name());
    debug!(
        "Prepared {} with {} input(s) and {} declared output(s)",
        schema.name,
        staged.len(),
        outputs.outputs.len()
    );

    Ok(PreparedJob {
        job_type: schema.job_type(),
        entry_point: GROMACS_ENTRY_POINT,
        staged,
        chain_roles: schema.chain_roles,
        command: CommandSource::Tool(params),
        outputs,
        parser_name: schema.parser_name(),
        label: None,
        output_dir: output_dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::ParamValue;
    use crate::core::params::tools::{GROMPP, MDRUN, PDB2GMX};
    use std::fs;
    use tempfile::tempdir;

    fn params(schema: &'static ToolSchema, pairs: &[(&str, &str)]) -> Parameters {
        Parameters::new(schema, pairs.iter().map(|(k, v)| (*k, ParamValue::from(*v)))).unwrap()
    }

    #[test]
    fn pdb2gmx_job_matches_the_reference_command() {
        let p = params(&PDB2GMX, &[("f", "1AKI_clean.pdb"), ("ff", "oplsaa"), ("water", "spce")]);
        let job = prepare(p, Path::new("/home/u"), Path::new("/home/u")).unwrap();
        assert_eq!(job.job_type, "gromacs.pdb2gmx");
        assert_eq!(job.stdout_name(), "pdb2gmx.out");
        assert_eq!(
            job.command_line().to_string(),
            "pdb2gmx -f 1AKI_clean.pdb -ff oplsaa -water spce -o out.gro -p out.gro -i out.gro -n out.gro -q out.gro"
        );
        assert_eq!(job.outputs.retrieve_list(), ["pdb2gmx.out", "out.gro"]);
        assert_eq!(job.outputs.outputs.len(), 5);
    }

    #[test]
    fn grompp_stages_local_topology_includes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("topol.top"), "#include \"oplsaa.ff/forcefield.itp\"\n#include \"posre.itp\"\n").unwrap();
        fs::write(dir.path().join("posre.itp"), "").unwrap();

        let p = params(&GROMPP, &[("f", "ions.mdp"), ("c", "solv.gro"), ("p", "topol.top"), ("o", "ions.tpr")]);
        let job = prepare(p, dir.path(), dir.path()).unwrap();
        let roles: Vec<_> = job.staged.iter().map(|s| s.role.as_str()).collect();
        assert_eq!(roles, ["mdpfile", "grofile", "topfile", "itpfile0"]);
        assert!(!job.command_line().tokens().iter().any(|t| t == "posre.itp"));
    }

    #[test]
    fn grompp_without_optional_inputs_stages_none_of_them() {
        let dir = tempdir().unwrap();
        let p = params(&GROMPP, &[("c", "solv.gro")]);
        let job = prepare(p, dir.path(), dir.path()).unwrap();
        for role in ["r_file", "n_file", "t_file"] {
            assert!(!job.staged.iter().any(|s| s.role == role));
        }
    }

    #[test]
    fn mdrun_trajectory_is_declared_only_when_requested() {
        let without = prepare(params(&MDRUN, &[("s", "md.tpr")]), Path::new("."), Path::new(".")).unwrap();
        assert!(!without.outputs.outputs.iter().any(|o| o.label == "trrfile"));

        let with = prepare(
            params(&MDRUN, &[("s", "md.tpr"), ("o", "md.trr")]),
            Path::new("."),
            Path::new("."),
        )
        .unwrap();
        assert!(with.outputs.outputs.iter().any(|o| o.label == "trrfile" && o.filename == "md.trr"));
    }
}
