//! Version oracle configuration.
//!
//! Configuration comes from three layers, later overriding earlier:
//!
//! 1. Built-in defaults ([`OracleConfig::default`])
//! 2. An optional YAML file ([`OracleConfig::load`])
//! 3. `OPENFF_*` environment variables ([`OracleConfig::apply_env_overrides`])
//!
//! # Example
//!
//! ```
//! use openff_utilities::config::{OracleConfig, Strictness};
//!
//! let yaml = "strictness: strict\ntimeout_secs: 30\n";
//! let config = OracleConfig::from_yaml_str(yaml, "inline").unwrap();
//! assert_eq!(config.strictness, Strictness::Strict);
//! assert_eq!(config.preference, vec!["micromamba", "mamba", "conda"]);
//! ```

use std::env::VarError;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UtilitiesError};

/// Comma-separated tool preference list.
pub const ENV_PACKAGE_MANAGERS: &str = "OPENFF_PACKAGE_MANAGERS";
/// `auto`, `json` or `table`.
pub const ENV_LIST_FORMAT: &str = "OPENFF_CONDA_LIST_FORMAT";
/// Timeout in seconds for the listing command.
pub const ENV_LIST_TIMEOUT: &str = "OPENFF_CONDA_LIST_TIMEOUT";
/// `1`/`true` to make a missing package manager an error.
pub const ENV_LIST_STRICT: &str = "OPENFF_CONDA_LIST_STRICT";

/// Source name used in errors for environment overrides.
const ENV_SOURCE: &str = "environment";

/// Which listing format to request from the package manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatPreference {
    /// Structured output whenever the tool supports it.
    #[default]
    Auto,
    /// Always request structured output.
    Json,
    /// Always parse the plain-text table.
    Table,
}

impl FormatPreference {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(FormatPreference::Auto),
            "json" => Some(FormatPreference::Json),
            "table" => Some(FormatPreference::Table),
            _ => None,
        }
    }
}

/// How a missing package manager is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Warn and yield an empty version table.
    #[default]
    Lenient,
    /// Fail with [`UtilitiesError::CondaExecutableNotFound`].
    Strict,
}

/// Settings for discovering and invoking the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Candidate executables, most preferred first.
    pub preference: Vec<String>,
    /// Listing format to request.
    pub output_format: FormatPreference,
    /// Subprocess timeout; `None` blocks until the tool exits.
    pub timeout_secs: Option<u64>,
    /// Whether a missing package manager is an error.
    pub strictness: Strictness,
    /// Honour `PIXI_*`/`CONDA_*`/`MAMBA_EXE` shell variables before searching `PATH`.
    pub use_environment: bool,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            preference: vec![
                "micromamba".to_string(),
                "mamba".to_string(),
                "conda".to_string(),
            ],
            output_format: FormatPreference::Auto,
            timeout_secs: None,
            strictness: Strictness::Lenient,
            use_environment: true,
        }
    }
}

impl OracleConfig {
    /// Parse a YAML document. `source` names the document in errors.
    pub fn from_yaml_str(yaml: &str, source: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| UtilitiesError::Config {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Load a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content, &path.display().to_string())
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `OPENFF_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_overrides_with(|key| std::env::var(key))
    }

    /// Apply overrides with a custom env var lookup (for testing).
    pub fn apply_env_overrides_with<F>(&mut self, env_fn: F) -> Result<()>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        if let Ok(value) = env_fn(ENV_PACKAGE_MANAGERS) {
            let preference: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
            if !preference.is_empty() {
                self.preference = preference;
            }
        }

        if let Ok(value) = env_fn(ENV_LIST_FORMAT) {
            self.output_format = FormatPreference::parse(&value)
                .ok_or_else(|| invalid_env(ENV_LIST_FORMAT, &value))?;
        }

        if let Ok(value) = env_fn(ENV_LIST_TIMEOUT) {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid_env(ENV_LIST_TIMEOUT, &value))?;
            self.timeout_secs = (secs > 0).then_some(secs);
        }

        if let Ok(value) = env_fn(ENV_LIST_STRICT) {
            self.strictness = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Strictness::Strict,
                "0" | "false" | "no" | "" => Strictness::Lenient,
                _ => return Err(invalid_env(ENV_LIST_STRICT, &value)),
            };
        }

        Ok(())
    }

    /// Subprocess timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn invalid_env(key: &str, value: &str) -> UtilitiesError {
    UtilitiesError::Config {
        path: ENV_SOURCE.to_string(),
        message: format!("{}={:?} is not a valid value", key, value),
    }
}
