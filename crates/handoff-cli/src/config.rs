//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Environment variables
//! - Command-line arguments

use crate::cli::Cli;
use crate::error::{Error, Result};
use handoff_marshal::MarshalConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Marshaller settings sit at the top level of the file, next to the
/// `output` and `logging` sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Marshaller settings
    #[serde(flatten)]
    pub marshal: MarshalConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

/// Supported configuration file syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Toml,
    Json,
}

impl FileFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        let format = FileFormat::of(path);
        let parsed = match format {
            FileFormat::Yaml => serde_yaml::from_str(content).map_err(Error::from),
            FileFormat::Toml => toml::from_str(content).map_err(Error::from),
            FileFormat::Json => serde_json::from_str(content).map_err(Error::from),
        };

        parsed.map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "config parse failed");
            Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: format.name().to_string(),
            }
        })
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "loaded config");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "failed to load config");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for stem in [".handoff", "handoff"] {
            for ext in ["yaml", "toml", "json"] {
                paths.push(PathBuf::from(format!("{stem}.{ext}")));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let handoff_dir = config_dir.join("handoff");
            for ext in ["yaml", "toml", "json"] {
                paths.push(handoff_dir.join(format!("config.{ext}")));
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            for ext in ["yaml", "toml", "json"] {
                paths.push(home_dir.join(format!(".handoff.{ext}")));
            }
        }

        paths
    }

    /// Apply environment variables, then command-line flags
    pub fn resolve(mut self, cli: &Cli) -> Self {
        self.marshal = self.marshal.merge_with_env();

        if let Some(path) = &cli.library {
            self.marshal.library.path = Some(path.clone());
        }
        if cli.fail_on_error {
            self.marshal.fail_on_error = true;
        }
        self
    }

    /// Marshaller settings with a `scrape --concurrent` override applied
    pub fn with_concurrency(&self, workers: Option<usize>, timeout_secs: Option<u64>) -> MarshalConfig {
        let mut marshal = self.marshal.clone();
        if let Some(workers) = workers {
            marshal.concurrency.workers = workers;
        }
        if timeout_secs.is_some() {
            marshal.concurrency.timeout_secs = timeout_secs;
        }
        marshal
    }
}
