//! Configuration loading utilities
//!
//! A config file is looked up in priority order:
//! 1. Explicit path (CLI flag or environment variable)
//! 2. Current working directory
//! 3. XDG config home (`$XDG_CONFIG_HOME/snowday/` or `~/.config/snowday/`)
//! 4. System config (`/etc/snowday/`)
//!
//! Values found in the file sit below CLI flags and environment variables;
//! merging is done by the binary that owns the config struct.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;

use crate::APP_NAME;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Describes where a configuration was loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Explicit path provided via CLI or env var
    Explicit(PathBuf),
    /// Found in current working directory
    CurrentDir(PathBuf),
    /// Found in XDG config home
    XdgConfig(PathBuf),
    /// Found in system config (/etc/snowday/)
    System(PathBuf),
    /// No config file found, using defaults
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p.as_path()),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Candidate locations for `filename`, highest priority first.
///
/// The explicit location from `env_var` is only included when the variable
/// is set; existence is not checked here.
pub fn config_search_paths(env_var: &str, filename: &str) -> Vec<ConfigSource> {
    let mut candidates = Vec::with_capacity(4);
    if let Ok(path) = env::var(env_var) {
        candidates.push(ConfigSource::Explicit(PathBuf::from(path)));
    }
    candidates.push(ConfigSource::CurrentDir(PathBuf::from(filename)));
    candidates.push(ConfigSource::XdgConfig(xdg_config_dir().join(filename)));
    candidates.push(ConfigSource::System(
        PathBuf::from("/etc").join(APP_NAME).join(filename),
    ));
    candidates
}

/// Find the first existing configuration file among the standard locations
///
/// # Arguments
/// * `env_var` - Environment variable to check for an explicit path
/// * `filename` - Config filename to search for (e.g. "snowday.toml")
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    config_search_paths(env_var, filename)
        .into_iter()
        .find(|candidate| candidate.path().is_some_and(Path::exists))
        .unwrap_or(ConfigSource::Defaults)
}

fn xdg_config_dir() -> PathBuf {
    match (env::var("XDG_CONFIG_HOME"), env::var("HOME")) {
        (Ok(xdg_config), _) => PathBuf::from(xdg_config).join(APP_NAME),
        (Err(_), Ok(home)) => PathBuf::from(home).join(".config").join(APP_NAME),
        // won't exist, keeps the search order intact
        _ => PathBuf::from(".config").join(APP_NAME),
    }
}

/// Load and parse a TOML configuration file
///
/// Returns `T::default()` when the source is [`ConfigSource::Defaults`].
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> Result<T, ConfigError> {
    let Some(path) = source.path() else {
        return Ok(T::default());
    };
    debug!("reading config from {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
