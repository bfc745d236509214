use super::tool::launch_prepared;
use crate::cli::RunArgs;
use crate::config::AppConfig;
use crate::error::Result;
use gmxprov::workflows::general::{self, GeneralCommand};
use std::fs;
use tracing::info;

pub fn run(args: RunArgs, config: &AppConfig) -> Result<()> {
    info!("command: {}", args.command);
    let cwd = std::env::current_dir()?;
    let command = GeneralCommand {
        command: args.command,
        inputs: args.inputs,
        outputs: args.outputs,
        output_dir: args.output_dir,
    };
    let prepared = general::prepare(&command, &cwd)?;
    fs::create_dir_all(&prepared.output_dir)?;
    launch_prepared(prepared, &args.launch, config)
}
