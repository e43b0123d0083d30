//! Config command - inspect and create configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use voterpix_core::VoterpixConfig;

use super::{config_source, resolve_config, ConfigSource};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as JSON
    Show,

    /// Write a configuration file holding the defaults
    Init(InitArgs),

    /// Show which configuration file applies
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Where to write [default: --config, else the user config file]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: &ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommand::Show => show(config_path),
        ConfigCommand::Init(init) => init_file(init, config_path),
        ConfigCommand::Path => path(config_path),
    }
}

/// Per-user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voterpix")
        .join("config.json")
}

fn show(config_path: Option<&str>) -> anyhow::Result<()> {
    let (config, source) = resolve_config(config_path)?;
    eprintln!("{} Configuration from {}", style("ℹ").blue(), source);
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_file(args: &InitArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let target = args
        .output
        .clone()
        .or_else(|| config_path.map(PathBuf::from))
        .unwrap_or_else(default_config_path);

    if target.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            target.display()
        );
    }
    write_defaults(&target)?;

    println!(
        "{} Wrote default configuration to {}",
        style("✓").green(),
        target.display()
    );
    Ok(())
}

fn write_defaults(target: &Path) -> anyhow::Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    VoterpixConfig::default().save(target)?;
    Ok(())
}

fn path(config_path: Option<&str>) -> anyhow::Result<()> {
    let source = config_source(config_path);
    let file = match &source {
        ConfigSource::Explicit(path) | ConfigSource::UserFile(path) => path.clone(),
        ConfigSource::Defaults => default_config_path(),
    };

    println!("Configuration file: {}", file.display());
    if file.exists() {
        println!("Status: {}", style("in use").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!("Run 'voterpix config init' to write one; built-in defaults apply until then.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let source = config_source(Some("/etc/voterpix.json"));
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/etc/voterpix.json")));
        assert_eq!(source.path(), Some(&PathBuf::from("/etc/voterpix.json")));
    }

    #[test]
    fn test_write_defaults_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/config.json");
        write_defaults(&target).unwrap();

        let (config, source) = resolve_config(target.to_str()).unwrap();
        assert!(matches!(source, ConfigSource::Explicit(_)));
        assert_eq!(config.matching.density_threshold, 40);
    }
}
