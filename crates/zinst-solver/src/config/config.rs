use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use zinst_version::ImplementationVersion;

use super::source::{ConfigLoader, ConfigSource, RawConfig};
use crate::error::ConfigError;

/// How much network traffic the solver may plan for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkLevel {
    /// Only implementations already in the store
    Offline,
    /// Prefer cached implementations
    Minimal,
    #[default]
    Full,
}

impl NetworkLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkLevel::Offline => "offline",
            NetworkLevel::Minimal => "minimal",
            NetworkLevel::Full => "full",
        }
    }
}

impl FromStr for NetworkLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "offline" => Ok(NetworkLevel::Offline),
            "minimal" => Ok(NetworkLevel::Minimal),
            "full" => Ok(NetworkLevel::Full),
            _ => Err(format!("Unknown network level: {}", s)),
        }
    }
}

impl fmt::Display for NetworkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_solver_version() -> ImplementationVersion {
    ImplementationVersion::parse(env!("CARGO_PKG_VERSION"))
        .unwrap_or_else(|_| ImplementationVersion::from_numbers(vec![0, 1]))
}

/// Settings that influence candidate ranking and suitability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SolverConfig {
    #[serde(default)]
    pub network_use: NetworkLevel,

    /// Rank testing releases like stable ones
    #[serde(default)]
    pub help_with_testing: bool,

    /// Feeds requiring a newer solver are ignored
    #[serde(default = "default_solver_version")]
    pub solver_version: ImplementationVersion,

    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            network_use: NetworkLevel::default(),
            help_with_testing: false,
            solver_version: default_solver_version(),
            sources: HashMap::new(),
        }
    }
}

impl SolverConfig {
    const KEYS: [&'static str; 3] = ["network-use", "help-with-testing", "solver-version"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network_use(mut self, network_use: NetworkLevel) -> Self {
        self.network_use = network_use;
        self.sources.insert("network-use".to_string(), ConfigSource::Command);
        self
    }

    pub fn with_help_with_testing(mut self, help_with_testing: bool) -> Self {
        self.help_with_testing = help_with_testing;
        self.sources.insert("help-with-testing".to_string(), ConfigSource::Command);
        self
    }

    pub fn with_solver_version(mut self, solver_version: ImplementationVersion) -> Self {
        self.solver_version = solver_version;
        self.sources.insert("solver-version".to_string(), ConfigSource::Command);
        self
    }

    /// Build configuration from all sources (defaults, file, env).
    ///
    /// Without an explicit file, `solver.json` in the config home is read if present.
    pub fn build<P: AsRef<Path>>(config_file: Option<P>, use_environment: bool) -> Result<Self, ConfigError> {
        let loader = ConfigLoader::new(use_environment);
        let mut config = Self::default();

        for key in Self::KEYS {
            config.sources.insert(key.to_string(), ConfigSource::Default);
        }

        let raw = match config_file {
            Some(path) => loader.load_config_file(path)?,
            None => loader.load_default_config()?,
        };
        config.merge_raw_config(raw, ConfigSource::File)?;

        if use_environment {
            config.apply_env_overrides(&loader)?;
        }

        log::debug!(
            "Solver configuration: network-use={}, help-with-testing={}, solver-version={}",
            config.network_use,
            config.help_with_testing,
            config.solver_version
        );

        Ok(config)
    }

    /// Where a value came from
    pub fn get_source(&self, key: &str) -> Option<&ConfigSource> {
        self.sources.get(key)
    }

    fn merge_raw_config(&mut self, raw: RawConfig, source: ConfigSource) -> Result<(), ConfigError> {
        for (key, value) in raw.values {
            self.merge_config_value(&key, value, source.clone())?;
        }
        Ok(())
    }

    fn merge_config_value(
        &mut self,
        key: &str,
        value: serde_json::Value,
        source: ConfigSource,
    ) -> Result<(), ConfigError> {
        let invalid = |value: &serde_json::Value| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "network-use" => {
                self.network_use = value
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| invalid(&value))?;
            }
            "help-with-testing" => {
                self.help_with_testing = value.as_bool().ok_or_else(|| invalid(&value))?;
            }
            "solver-version" => {
                self.solver_version = value
                    .as_str()
                    .and_then(|s| ImplementationVersion::parse(s).ok())
                    .ok_or_else(|| invalid(&value))?;
            }
            _ => {
                log::debug!("Ignoring unknown configuration key {}", key);
                return Ok(());
            }
        }
        self.sources.insert(key.to_string(), source);
        Ok(())
    }

    fn apply_env_overrides(&mut self, loader: &ConfigLoader) -> Result<(), ConfigError> {
        if let Some(network_use) = loader.get_env_config("network-use") {
            self.network_use = network_use.parse().map_err(|_| ConfigError::InvalidValue {
                key: ConfigLoader::env_var_name("network-use"),
                value: network_use.clone(),
            })?;
            self.sources.insert(
                "network-use".to_string(),
                ConfigSource::Environment(ConfigLoader::env_var_name("network-use")),
            );
        }

        if let Some(help_with_testing) = loader.get_env_bool("help-with-testing") {
            self.help_with_testing = help_with_testing;
            self.sources.insert(
                "help-with-testing".to_string(),
                ConfigSource::Environment(ConfigLoader::env_var_name("help-with-testing")),
            );
        }

        Ok(())
    }
}
