//! Configuration management for the pbx-confgen CLI.
//!
//! This module loads and saves the CLI configuration file. The file tunes
//! how endpoint templates are resolved and how resolved records are written.
//!
//! The configuration is stored in TOML format and can be loaded from a
//! specified file path or from the default location in the current directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use endpoint_config::{Canonicalizer, TemplateGraphResolver};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "pbx-confgen.toml";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the pbx-confgen CLI.
///
/// # Example TOML Configuration
///
/// ```toml
/// [resolver]
/// extra_repeatable_keys = ["allow"]
///
/// [output]
/// pretty = true
/// include_stats = false
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Template resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Output rendering settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist, cannot be read, or
    /// does not contain a valid configuration.
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        Ok(config)
    }

    /// Loads the configuration used by a command.
    ///
    /// An explicitly requested file must exist. Without one, the default file
    /// in the current directory is used when present, and the built-in
    /// defaults otherwise.
    pub fn load_for_command(path: Option<&str>) -> Result<Self, Error> {
        let config_path = get_config_path(path);
        if path.is_none() && !config_path.exists() {
            debug!("No configuration file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(&config_path)
    }

    /// Saves the configuration to a TOML file at the specified path.
    ///
    /// Parent directories are created when missing and an existing file is
    /// overwritten.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        debug!("Saving configuration to {:?}", path);

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize configuration: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write configuration file: {}", e)))?;

        info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Builds the template resolver described by this configuration.
    pub fn resolver(&self) -> TemplateGraphResolver {
        TemplateGraphResolver::with_canonicalizer(self.resolver.canonicalizer())
    }
}

/// Template resolution settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Option keys that may repeat within a section, on top of `set_var`
    /// and `match`.
    #[serde(default)]
    pub extra_repeatable_keys: Vec<String>,
}

impl ResolverConfig {
    pub fn canonicalizer(&self) -> Canonicalizer {
        Canonicalizer::new().with_extra_repeatable_keys(self.extra_repeatable_keys.iter().cloned())
    }
}

/// Output rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_pretty")]
    pub pretty: bool,

    /// Wrap the records with resolution counters.
    #[serde(default)]
    pub include_stats: bool,
}

impl OutputConfig {
    fn default_pretty() -> bool {
        true
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: OutputConfig::default_pretty(),
            include_stats: false,
        }
    }
}

/// Resolves the path to the configuration file.
///
/// - If `config_path` is `Some(path)`, returns that path as a `PathBuf`
/// - If `config_path` is `None`, returns `./pbx-confgen.toml` in the current directory
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}
