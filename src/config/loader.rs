//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{AgentConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub namespace: Option<String>,
    pub dry_run: bool,
    pub log_format: Option<LogFormat>,
}

impl Overrides {
    pub fn apply(self, config: &mut AgentConfig) {
        if let Some(base_url) = self.base_url {
            config.remote.base_url = base_url;
        }
        if let Some(token) = self.token {
            config.remote.token = token;
        }
        if let Some(namespace) = self.namespace {
            config.controller.namespace = Some(namespace);
        }
        if self.dry_run {
            config.controller.dry_run = true;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}

/// Parse a TOML file without semantic checks.
///
/// Callers that layer CLI overrides on top validate afterwards with
/// [`validated`].
pub fn read_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Run semantic validation, handing the config back on success.
pub fn validated(config: AgentConfig) -> Result<AgentConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AgentConfig, ConfigError> {
    validated(read_config(path)?)
}
