use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// File name of the configuration inside the config home
pub const CONFIG_FILE_NAME: &str = "solver.json";

/// Represents the source of a configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Default built-in value
    Default,
    /// From a configuration file
    File,
    /// From environment variable
    Environment(String),
    /// Programmatically set
    Command,
}

impl ConfigSource {
    pub fn as_str(&self) -> &str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment(var) => var,
            ConfigSource::Command => "command",
        }
    }
}

/// Raw configuration data as found in a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(flatten)]
    pub values: HashMap<String, serde_json::Value>,
}

/// Loads configuration from files and the environment
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Get a ZINST_* environment variable
    pub fn get_zinst_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.is_empty())
    }

    /// Get the configuration directory
    pub fn get_config_home(&self) -> PathBuf {
        if let Some(home) = self.get_zinst_env("ZINST_CONFIG_HOME") {
            return PathBuf::from(home);
        }

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "zinst") {
            proj_dirs.config_dir().to_path_buf()
        } else if let Some(base_dirs) = directories::BaseDirs::new() {
            base_dirs.home_dir().join(".zinst")
        } else {
            PathBuf::from(".zinst")
        }
    }

    /// Load configuration from a JSON file; a missing file yields no values
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<RawConfig, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(RawConfig::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(serde_json::from_str(&contents)?)
    }

    /// Load the configuration file from the config home
    pub fn load_default_config(&self) -> Result<RawConfig, ConfigError> {
        self.load_config_file(self.get_config_home().join(CONFIG_FILE_NAME))
    }

    /// Environment variable name for a key: "foo-bar" becomes "ZINST_FOO_BAR"
    pub fn env_var_name(key: &str) -> String {
        format!("ZINST_{}", key.replace('-', "_").to_uppercase())
    }

    /// Get a configuration value from its environment variable
    pub fn get_env_config(&self, key: &str) -> Option<String> {
        self.get_zinst_env(&Self::env_var_name(key))
    }

    /// Get boolean value from environment variable
    pub fn get_env_bool(&self, key: &str) -> Option<bool> {
        self.get_env_config(key)
            .map(|val| !matches!(val.to_lowercase().as_str(), "false" | "0" | "no"))
    }
}
