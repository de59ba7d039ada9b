//! Snowday Core Library
//!
//! Shared utilities for the snowday binaries:
//! - Configuration file discovery and loading (XDG-compliant)
//! - Log level resolution and the terminal log dispatcher

mod config;
mod logging;

pub use config::{config_search_paths, find_config_file, load_config, ConfigError, ConfigSource};
pub use logging::{parse_level, resolve_level, setup_logger};

/// Application name used for XDG paths
pub const APP_NAME: &str = "snowday";

/// Environment variable holding an explicit config file path
pub const CONFIG_ENV_VAR: &str = "SNOWDAY_CONFIG";

/// Config filename searched for in each location
pub const CONFIG_FILENAME: &str = "snowday.toml";
