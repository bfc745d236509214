mod cli;
mod commands;
mod config;
mod data;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::data::DataManager;
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        if let Some(code) = e.job_exit_code() {
            eprintln!("   Job exit code: {}", code);
        }
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("gmxprov v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let data_manager = DataManager::new()?;
    let config = config::build_config(cli.config.as_deref(), &cli.set_values, &data_manager)?;
    debug!("Effective configuration: {:?}", config);

    let command_result = match cli.command {
        Commands::Pdb2gmx(args) => commands::tool::run("pdb2gmx", args, &config),
        Commands::Grompp(args) => commands::tool::run("grompp", args, &config),
        Commands::Mdrun(args) => commands::tool::run("mdrun", args, &config),
        Commands::Editconf(args) => commands::tool::run("editconf", args, &config),
        Commands::Run(args) => {
            info!("Dispatching to 'run' command.");
            commands::general::run(args, &config)
        }
        Commands::Jobs(args) => commands::jobs::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}
