//! Persistent user settings.
//!
//! Settings live in `<config dir>/snapdiff/config.toml`. They are loaded once
//! by the binary and handed to the commands that need them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::{FilterOptions, OutputFormat};

/// Default seconds between watch cycles.
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 5;

/// Errors loading, saving or editing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Cannot write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Unknown configuration key: {key}. Valid keys: defaultFormat, defaultWatchInterval, defaultExcludes"
    )]
    UnknownKey { key: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// User-level defaults applied by the command-line front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Snapshot format used when none is given.
    pub default_format: OutputFormat,

    /// Exclude patterns used when none are given.
    pub default_excludes: Vec<String>,

    /// Seconds between watch cycles.
    pub default_watch_interval: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Json,
            default_excludes: ["*.tmp", "*.log", ".git/**", "bin/**", "obj/**"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_watch_interval: DEFAULT_WATCH_INTERVAL_SECS,
        }
    }
}

impl AppConfig {
    /// Platform config location, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("snapdiff").join("config.toml"))
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Update one setting from its textual form. Keys are case-insensitive
    /// and accept either `camelCase` or `snake_case`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        match key.replace(['_', '-'], "").to_lowercase().as_str() {
            "defaultformat" => {
                self.default_format = value
                    .parse()
                    .map_err(|_| invalid("format must be json, csv, or html"))?;
            }
            "defaultwatchinterval" => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.default_watch_interval = secs,
                _ => return Err(invalid("watch interval must be a positive integer")),
            },
            "defaultexcludes" => {
                self.default_excludes = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Fill in defaults the user did not override on the command line.
    pub fn apply_defaults(&self, options: &mut FilterOptions) {
        if options.exclude_patterns.is_empty() {
            options
                .exclude_patterns
                .extend(self.default_excludes.iter().cloned());
        }

        if options.format == OutputFormat::Json {
            options.format = self.default_format;
        }
    }

    /// Interval between watch cycles.
    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.default_watch_interval)
    }
}
