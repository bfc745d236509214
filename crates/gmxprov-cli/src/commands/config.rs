use crate::cli::{ConfigArgs, ConfigCommands};
use crate::config::AppConfig;
use crate::error::{CliError, Result};

pub fn run(args: ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show => println!("{}", render(config)?),
    }
    Ok(())
}

fn render(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| CliError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::build_config;
    use crate::data::DataManager;
    use tempfile::tempdir;

    #[test]
    fn effective_configuration_renders_as_toml() {
        let base = tempdir().unwrap();
        let manager = DataManager::with_custom_path(base.path());
        let config = build_config(None, &["engine.mode=submit".to_string()], &manager).unwrap();
        let text = render(&config).unwrap();
        assert!(text.contains("[engine]"));
        assert!(text.contains("mode = \"submit\""));
        assert!(text.contains("[codes]"));
        assert!(text.contains("num-mpiprocs-per-machine = 1"));
        assert!(text.contains("enabled = true"));
    }
}
