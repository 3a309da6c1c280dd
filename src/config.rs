//! Configuration management for routelog

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logging::{DispatcherSettings, FormatterConfig, Routes};

/// Application configuration
///
/// Read once at startup; the dispatcher built from it never changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory receiving one log file per run (`~` is expanded)
    #[serde(default = "default_output_directory")]
    pub output_directory: String,

    /// Target width of severity indicator + fill + origin label
    #[serde(default = "default_label_width")]
    pub label_width: usize,

    /// Character padding short origin labels
    #[serde(default = "default_blank")]
    pub fill_char: char,

    /// Width of the block between the origin label and the message
    #[serde(default = "default_separator_width")]
    pub separator_width: usize,

    #[serde(default = "default_blank")]
    pub separator_char: char,

    /// Surround the separator block with single spaces
    #[serde(default = "default_true")]
    pub pad_separator: bool,

    /// Destinations any call may reach at most
    #[serde(default = "default_ceiling")]
    pub ceiling: Routes,

    /// Destinations every call reaches (still bounded by `ceiling`)
    #[serde(default)]
    pub floor: Routes,

    /// Log creation and destruction of traced objects
    #[serde(default = "default_true")]
    pub display_object_lifetime: bool,

    /// Port for the HTTP server
    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_output_directory() -> String {
    "logs/".to_string()
}

fn default_label_width() -> usize {
    70
}

fn default_blank() -> char {
    ' '
}

fn default_separator_width() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_ceiling() -> Routes {
    Routes::ALL
}

fn default_server_port() -> u16 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            label_width: default_label_width(),
            fill_char: default_blank(),
            separator_width: default_separator_width(),
            separator_char: default_blank(),
            pad_separator: true,
            ceiling: default_ceiling(),
            floor: Routes::NONE,
            display_object_lifetime: true,
            server_port: default_server_port(),
        }
    }
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific file, or return default if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Output directory with `~` and environment variables expanded
    pub fn output_dir(&self) -> PathBuf {
        match shellexpand::full(&self.output_directory) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                tracing::warn!(
                    "Could not expand output directory '{}': {}",
                    self.output_directory,
                    e
                );
                PathBuf::from(&self.output_directory)
            }
        }
    }

    pub fn formatter_config(&self) -> FormatterConfig {
        FormatterConfig {
            label_width: self.label_width,
            fill_char: self.fill_char,
            separator_width: self.separator_width,
            separator_char: self.separator_char,
            pad_separator: self.pad_separator,
        }
    }

    /// Settings for the process's dispatcher
    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            output_dir: self.output_dir(),
            formatter: self.formatter_config(),
            ceiling: self.ceiling,
            floor: self.floor,
            display_object_lifetime: self.display_object_lifetime,
        }
    }
}

/// Get the base configuration directory (~/.routelog)
/// Falls back to ./.routelog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".routelog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".routelog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
