//! Unified precedence resolution for configuration.
//!
//! This module provides a single entry point for resolving the settings
//! a command runs with.
//!
//! ## Server URL precedence (highest to lowest)
//!
//! 1. `-s/--server` CLI flag
//! 2. `MOT_SERVER` environment variable
//! 3. config.kdl (`server-url`)
//! 4. Built-in default (`http://localhost:8080`)
//!
//! ## Preference precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. config.kdl
//! 3. Built-in defaults

use crate::config::schema::{MotConfig, OutputFormat};
use crate::models::MenuName;

/// Environment variable name for the backend base URL.
pub const SERVER_URL_ENV: &str = "MOT_SERVER";

/// Built-in backend base URL, matching the backend's dev setup.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    ConfigFile,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Server URL override from `-s/--server`
    pub server_url: Option<String>,
    /// Output format override from `-H/--human`
    pub output_format: Option<OutputFormat>,
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    /// Backend base URL
    pub server_url: Resolved<String>,
    /// Output format preference
    pub output_format: Resolved<OutputFormat>,
    /// Default menu for new level-1 codes, if configured
    pub default_menu: Option<Resolved<MenuName>>,
}

impl ResolvedSettings {
    /// Get the server URL value.
    pub fn server_url(&self) -> &str {
        &self.server_url.value
    }

    /// Whether human-readable output was requested.
    pub fn human(&self) -> bool {
        self.output_format.value == OutputFormat::Human
    }

    /// Get the default menu, if configured.
    pub fn default_menu(&self) -> Option<MenuName> {
        self.default_menu.as_ref().map(|r| r.value)
    }
}

/// Resolve settings with the full precedence chain, reading the
/// process environment.
pub fn resolve(config: &MotConfig, overrides: &Overrides) -> ResolvedSettings {
    let env_server = std::env::var(SERVER_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty());
    resolve_with_env(config, overrides, env_server)
}

/// Resolve settings against an explicit environment value (tests use
/// this to avoid touching the process environment).
pub fn resolve_with_env(
    config: &MotConfig,
    overrides: &Overrides,
    env_server: Option<String>,
) -> ResolvedSettings {
    let server_url = if let Some(ref url) = overrides.server_url {
        Resolved::new(url.clone(), ValueSource::CliFlag)
    } else if let Some(url) = env_server {
        Resolved::new(url, ValueSource::EnvVar(SERVER_URL_ENV.to_string()))
    } else if let Some(ref url) = config.server_url {
        Resolved::new(url.clone(), ValueSource::ConfigFile)
    } else {
        Resolved::new(DEFAULT_SERVER_URL.to_string(), ValueSource::Default)
    };

    let output_format = if let Some(ref format) = overrides.output_format {
        Resolved::new(format.clone(), ValueSource::CliFlag)
    } else if let Some(ref format) = config.output_format {
        Resolved::new(format.clone(), ValueSource::ConfigFile)
    } else {
        Resolved::new(OutputFormat::Json, ValueSource::Default)
    };

    let default_menu = config
        .default_menu
        .map(|menu| Resolved::new(menu, ValueSource::ConfigFile));

    ResolvedSettings {
        server_url,
        output_format,
        default_menu,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let settings = resolve_with_env(&MotConfig::default(), &Overrides::default(), None);
        assert_eq!(settings.server_url(), DEFAULT_SERVER_URL);
        assert_eq!(settings.server_url.source, ValueSource::Default);
        assert_eq!(settings.output_format.value, OutputFormat::Json);
        assert!(settings.default_menu().is_none());
    }

    #[test]
    fn test_config_file_beats_default() {
        let config = MotConfig {
            server_url: Some("https://club.example.org".to_string()),
            output_format: Some(OutputFormat::Human),
            default_menu: Some(MenuName::Library),
        };
        let settings = resolve_with_env(&config, &Overrides::default(), None);

        assert_eq!(settings.server_url(), "https://club.example.org");
        assert_eq!(settings.server_url.source, ValueSource::ConfigFile);
        assert!(settings.human());
        assert_eq!(settings.default_menu(), Some(MenuName::Library));
    }

    #[test]
    fn test_env_beats_config_file() {
        let config = MotConfig {
            server_url: Some("https://club.example.org".to_string()),
            ..Default::default()
        };
        let settings = resolve_with_env(
            &config,
            &Overrides::default(),
            Some("http://staging:8080".to_string()),
        );

        assert_eq!(settings.server_url(), "http://staging:8080");
        assert_eq!(
            settings.server_url.source,
            ValueSource::EnvVar(SERVER_URL_ENV.to_string())
        );
    }

    #[test]
    fn test_flag_beats_env_and_config() {
        let config = MotConfig {
            server_url: Some("https://club.example.org".to_string()),
            ..Default::default()
        };
        let overrides = Overrides {
            server_url: Some("http://flagged:1234".to_string()),
            output_format: Some(OutputFormat::Human),
        };
        let settings =
            resolve_with_env(&config, &overrides, Some("http://staging:8080".to_string()));

        assert_eq!(settings.server_url(), "http://flagged:1234");
        assert_eq!(settings.server_url.source, ValueSource::CliFlag);
        assert_eq!(settings.output_format.source, ValueSource::CliFlag);
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(format!("{}", ValueSource::CliFlag), "cli");
        assert_eq!(
            format!("{}", ValueSource::EnvVar("MOT_SERVER".to_string())),
            "env:MOT_SERVER"
        );
        assert_eq!(format!("{}", ValueSource::ConfigFile), "config");
        assert_eq!(format!("{}", ValueSource::Default), "default");
    }
}
