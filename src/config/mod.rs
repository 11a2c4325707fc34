//! Configuration for motcode.
//!
//! This module defines the KDL schema for a single file:
//!
//! ## config.kdl - User preferences
//!
//! Located at `~/.config/motcode/config.kdl` (or
//! `$MOT_CONFIG_DIR/config.kdl` when the override is set).
//!
//! Contains:
//! - `server-url` - Base URL of the MOT Club backend
//! - `output-format` - "json" or "human"
//! - `default-menu` - Menu used for `mot add` without `--menu`
//!
//! ## Precedence
//!
//! For the server URL: CLI flag > `MOT_SERVER` env var > config.kdl >
//! built-in default. For preferences: CLI flag > config.kdl > defaults.
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

use std::fs;
use std::path::PathBuf;

use crate::{Error, Result};

pub use resolver::{
    DEFAULT_SERVER_URL, Overrides, Resolved, ResolvedSettings, SERVER_URL_ENV, ValueSource,
    resolve, resolve_with_env,
};
pub use schema::{MotConfig, OutputFormat};

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "MOT_CONFIG_DIR";

/// The directory holding config.kdl.
///
/// `$MOT_CONFIG_DIR` wins when set (tests rely on this for isolation),
/// otherwise the XDG config directory.
pub fn config_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join("motcode"))
        .ok_or_else(|| Error::Config("could not determine the config directory".to_string()))
}

/// Path of the configuration file.
pub fn config_path(explicit_dir: Option<PathBuf>) -> Result<PathBuf> {
    Ok(config_dir(explicit_dir)?.join("config.kdl"))
}

/// Load the configuration. A missing file is an empty config, not an
/// error; a file that does not parse is.
pub fn load_config(explicit_dir: Option<PathBuf>) -> Result<MotConfig> {
    let path = config_path(explicit_dir)?;
    if !path.exists() {
        return Ok(MotConfig::default());
    }

    let text = fs::read_to_string(&path)?;
    let doc = text
        .parse::<kdl::KdlDocument>()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(MotConfig::from_kdl(&doc))
}

/// Persist the configuration, creating the directory if needed.
/// Returns the written path.
pub fn save_config(explicit_dir: Option<PathBuf>, config: &MotConfig) -> Result<PathBuf> {
    config.validate().map_err(Error::Config)?;

    let path = config_path(explicit_dir)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, config.to_kdl().to_string())?;
    Ok(path)
}
