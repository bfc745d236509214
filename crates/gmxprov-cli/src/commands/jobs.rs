use super::tool::{open_engine, print_handle};
use crate::cli::{JobsArgs, JobsCommands};
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use gmxprov::engine::progress::ProgressReporter;
use gmxprov::engine::store::JobRecord;

pub fn run(args: JobsArgs, config: &AppConfig) -> Result<()> {
    let engine = open_engine(config)?;
    match args.command {
        JobsCommands::List { job_type } => {
            let records = engine.store().jobs()?;
            let shown: Vec<_> = records
                .iter()
                .filter(|r| job_type.as_deref().is_none_or(|t| r.job_type == t))
                .collect();
            if shown.is_empty() {
                println!("No jobs recorded.");
            }
            for record in shown {
                println!("{}", summary_line(record));
            }
        }
        JobsCommands::Show { id } => {
            let record = engine.store().find_job(&id)?;
            let json = serde_json::to_string_pretty(&record)
                .map_err(|e| CliError::Other(e.into()))?;
            println!("{}", json);
        }
        JobsCommands::Process => {
            let progress = CliProgressHandler::new();
            let reporter = ProgressReporter::with_callback(progress.get_callback());
            let result = engine.process_pending(&reporter);
            progress.finish();
            let handles = result?;
            if handles.is_empty() {
                println!("No queued jobs.");
            }
            for handle in &handles {
                print_handle(handle);
            }
        }
    }
    Ok(())
}

fn summary_line(record: &JobRecord) -> String {
    format!(
        "{}  {:<18} {:<9} {}  {}",
        &record.id.to_string()[..8],
        record.job_type,
        record.status.to_string(),
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        record.description
    )
}
