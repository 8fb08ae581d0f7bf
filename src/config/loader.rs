//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{GenerationConfig, PayrollConfig, PayrollPolicy, ServerConfig};

/// Loads and provides access to the engine configuration.
///
/// The configuration file has three optional sections; anything omitted
/// takes its documented default:
///
/// ```text
/// policy:
///   default_reporting_time: "09:00:00"
///   default_duty_hours: "8"
///   grace_minutes: 0
///   half_day_threshold: "0.5"
///   weekly_off_days: [Sun]
/// generation:
///   max_concurrency: 8
///   persistence_retries: 1
///   retry_backoff_ms: 200
/// server:
///   bind_address: "127.0.0.1:8080"
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll.yaml").unwrap();
/// println!("Grace minutes: {}", loader.policy().grace_minutes);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML or wrongly typed values (`ConfigParseError`)
    /// - A value is out of range (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Builds configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// Wraps an already constructed configuration after validating it.
    pub fn from_config(config: PayrollConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn parse(content: &str, path: &str) -> EngineResult<Self> {
        // An empty document deserializes to unit, not to an empty mapping.
        let config: PayrollConfig = if content.trim().is_empty() {
            PayrollConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: path.to_string(),
                message: e.to_string(),
            })?
        };

        Self::from_config(config)
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }

    /// Returns the payroll policy section.
    pub fn policy(&self) -> &PayrollPolicy {
        &self.config.policy
    }

    /// Returns the generation section.
    pub fn generation(&self) -> &GenerationConfig {
        &self.config.generation
    }

    /// Returns the server section.
    pub fn server(&self) -> &ServerConfig {
        &self.config.server
    }
}
