//! CLI commands.

pub mod config;
pub mod extract;
pub mod inspect;

use std::fmt;
use std::path::PathBuf;

use tracing::debug;
use voterpix_core::VoterpixConfig;

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// File named with `-c/--config`.
    Explicit(PathBuf),
    /// The per-user config file.
    UserFile(PathBuf),
    /// Nothing on disk; built-in defaults.
    Defaults,
}

impl ConfigSource {
    /// File this source reads, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::UserFile(path) => Some(path),
            ConfigSource::Defaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(path) => write!(f, "{} (--config)", path.display()),
            ConfigSource::UserFile(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Decide which configuration applies: the file named on the command line,
/// else the per-user file when it exists, else built-in defaults.
pub fn config_source(config_path: Option<&str>) -> ConfigSource {
    if let Some(path) = config_path {
        return ConfigSource::Explicit(PathBuf::from(path));
    }
    let user_file = config::default_config_path();
    if user_file.exists() {
        ConfigSource::UserFile(user_file)
    } else {
        ConfigSource::Defaults
    }
}

/// Load the effective configuration and report where it came from.
pub fn resolve_config(config_path: Option<&str>) -> anyhow::Result<(VoterpixConfig, ConfigSource)> {
    let source = config_source(config_path);
    let config = match source.path() {
        Some(path) => {
            debug!("Using config file {}", path.display());
            VoterpixConfig::from_file(path)?
        }
        None => VoterpixConfig::default(),
    };
    Ok((config, source))
}
