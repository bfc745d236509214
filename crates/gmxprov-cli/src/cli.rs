use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "gmxprov contributors",
    version,
    about = "gmxprov - Run GROMACS tools and shell commands as provenance-tracked jobs.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    /// Defaults to `gmxprov.toml` in the platform configuration directory.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S resources.withmpi=true
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a topology from a coordinate file with `gmx pdb2gmx`.
    Pdb2gmx(ToolArgs),
    /// Preprocess a run input file with `gmx grompp`.
    Grompp(ToolArgs),
    /// Run a simulation with `gmx mdrun`.
    Mdrun(ToolArgs),
    /// Edit a structure file with `gmx editconf`.
    Editconf(ToolArgs),
    /// Run an arbitrary shell command as a tracked job.
    Run(RunArgs),
    /// Inspect recorded jobs and execute queued ones.
    Jobs(JobsArgs),
    /// Inspect the effective configuration.
    Config(ConfigArgs),
}

/// Options shared by every command that launches a job.
#[derive(Args, Debug, Clone)]
pub struct LaunchArgs {
    /// Executable to run instead of the configured code (path or name on PATH).
    #[arg(long, value_name = "CODE")]
    pub code: Option<String>,

    /// Free-text description recorded with the job.
    #[arg(short, long, value_name = "TEXT")]
    pub description: Option<String>,

    #[command(flatten)]
    pub mode: ModeFlags,

    /// Do not reuse outputs of earlier jobs as inputs.
    #[arg(long)]
    pub no_chain: bool,
}

/// Overrides `engine.mode` from the config file.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct ModeFlags {
    /// Queue the job; run it later with `gmxprov jobs process`.
    #[arg(long)]
    pub submit: bool,
    /// Execute the job now and wait for its outputs.
    #[arg(long)]
    pub run: bool,
}

/// Arguments for the GROMACS tool subcommands.
#[derive(Args, Debug)]
pub struct ToolArgs {
    #[command(flatten)]
    pub launch: LaunchArgs,

    /// GROMACS flags, given after `--` exactly as to gmx.
    /// Example: -- -f 1AKI_clean.pdb -ff oplsaa -water spce
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "GMX_FLAGS")]
    pub flags: Vec<String>,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub launch: LaunchArgs,

    /// The full command to run, enclosed in quotes.
    #[arg(long, required = true, value_name = "CMD")]
    pub command: String,

    /// Input file used by the command, with its local path. Repeatable.
    #[arg(long = "inputs", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Output file produced by the command. Repeatable.
    #[arg(long = "outputs", value_name = "NAME")]
    pub outputs: Vec<String>,

    /// Directory the outputs are saved to.
    #[arg(long, value_name = "DIR", default_value = "outputs")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub command: JobsCommands,
}

#[derive(Subcommand, Debug)]
pub enum JobsCommands {
    /// List recorded jobs, oldest first.
    List {
        /// Only show jobs of this type (e.g. gromacs.grompp).
        #[arg(long = "type", value_name = "TYPE")]
        job_type: Option<String>,
    },
    /// Show one job in full.
    Show {
        /// Job id or a unique prefix of it.
        #[arg(required = true)]
        id: String,
    },
    /// Execute every queued job.
    Process,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the configuration after merging defaults, file and --set values.
    Show,
}
