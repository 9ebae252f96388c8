//! Configuration loading.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML file: `--config`, `$DEALBOARD_CONFIG`, or `.dealboard/config.toml`
//! 3. Command-line flags (`--base-url` also reads `$DEALBOARD_BASE_URL`)
//!
//! A missing default file is not an error; a missing explicit file is.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::args::Cli;

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".dealboard/config.toml";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// How views are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Root URL of the API; resource paths are appended to it.
    pub base_url: String,
    /// Where the login token is stored. Defaults to the platform config dir.
    pub credentials_path: Option<PathBuf>,
    pub log_format: LogFormat,
    /// OTLP/gRPC collector endpoint. Spans are only exported when set.
    pub otlp_endpoint: Option<String>,
    /// Mark failed board branches instead of rendering them as empty.
    pub surface_branch_failures: bool,
    pub output_format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials_path: None,
            log_format: LogFormat::default(),
            otlp_endpoint: None,
            surface_branch_failures: false,
            output_format: OutputFormat::default(),
        }
    }
}

impl CliConfig {
    /// Loads the file at `path`, or the default file if `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let config: Self =
            toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides and re-validates.
    pub fn with_overrides(mut self, cli: &Cli) -> Result<Self, ConfigError> {
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(format) = cli.format {
            self.output_format = format;
        }
        if cli.show_branch_failures {
            self.surface_branch_failures = true;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::Invalid {
            message: format!("base_url '{}': {e}", self.base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                message: format!("base_url '{}' must use http or https", self.base_url),
            });
        }
        if let Some(endpoint) = &self.otlp_endpoint {
            Url::parse(endpoint).map_err(|e| ConfigError::Invalid {
                message: format!("otlp_endpoint '{endpoint}': {e}"),
            })?;
        }
        Ok(())
    }
}
