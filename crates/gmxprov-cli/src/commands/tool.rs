use crate::cli::{LaunchArgs, ToolArgs};
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::parser;
use crate::utils::progress::CliProgressHandler;
use gmxprov::core::params::Parameters;
use gmxprov::core::params::schema::ToolSchema;
use gmxprov::core::params::tools;
use gmxprov::engine::code::LocalCodeResolver;
use gmxprov::engine::error::EngineError;
use gmxprov::engine::local::LocalEngine;
use gmxprov::engine::progress::ProgressReporter;
use gmxprov::engine::store::{FileStore, JobStatus};
use gmxprov::engine::traits::JobHandle;
use gmxprov::workflows::calculation::{self, PreparedJob};
use gmxprov::workflows::launch::{LaunchMode, LaunchOptions, launch};
use std::path::PathBuf;
use tracing::{debug, info};

pub fn run(tool: &str, args: ToolArgs, config: &AppConfig) -> Result<()> {
    let schema = schema_for(tool)?;
    let flags = parser::parse_gromacs_flags(schema, &args.flags)
        .map_err(|e| CliError::Argument(e.to_string()))?;
    debug!("Parsed gmx {} flags: {:?}", schema.name, flags);
    let params = Parameters::new(schema, flags).map_err(EngineError::from)?;

    let cwd = std::env::current_dir()?;
    let prepared = calculation::prepare(params, &cwd, &cwd)?;
    launch_prepared(prepared, &args.launch, config)
}

fn schema_for(tool: &str) -> Result<&'static ToolSchema> {
    tools::lookup(tool).ok_or_else(|| CliError::Argument(format!("'{}' is not a wrapped gmx tool", tool)))
}

pub fn launch_options(args: &LaunchArgs, config: &AppConfig) -> LaunchOptions {
    let mode = if args.mode.submit {
        LaunchMode::Submit
    } else if args.mode.run {
        LaunchMode::Run
    } else {
        config.engine.mode
    };
    LaunchOptions {
        description: args.description.clone().unwrap_or_default(),
        mode,
        chaining: config.chaining.enabled && !args.no_chain,
        code_override: args.code.as_ref().map(PathBuf::from),
        resources: config.resources.resources(),
        withmpi: config.resources.withmpi,
    }
}

pub fn open_engine(config: &AppConfig) -> Result<LocalEngine> {
    let store = FileStore::open(&config.engine.store_path)?;
    Ok(LocalEngine::new(store).with_work_root(&config.computer.work_dir))
}

pub fn code_resolver(config: &AppConfig) -> LocalCodeResolver {
    config
        .codes
        .iter()
        .fold(LocalCodeResolver::new(config.computer.clone()), |r, (entry, exe)| {
            r.with_executable(entry.as_str(), exe)
        })
}

/// Launches a prepared job with the local engine and reports the outcome.
pub fn launch_prepared(prepared: PreparedJob, args: &LaunchArgs, config: &AppConfig) -> Result<()> {
    let options = launch_options(args, config);
    let engine = open_engine(config)?;
    let resolver = code_resolver(config);

    let progress = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let result = launch(prepared, &options, &engine, &resolver, engine.store(), &reporter);
    progress.finish();

    let handle = result?;
    info!("Job {} is {}", handle.id, handle.status);
    print_handle(&handle);
    Ok(())
}

pub fn print_handle(handle: &JobHandle) {
    match handle.status {
        JobStatus::Queued => println!(
            "Submitted job {} (run `gmxprov jobs process` to execute it)",
            handle.id
        ),
        status => {
            println!("Job {} {}", handle.id, status);
            for (label, artifact) in &handle.outputs {
                println!(
                    "  {:<12} {:<24} {}",
                    label,
                    artifact.filename,
                    artifact.short_digest()
                );
            }
        }
    }
}
